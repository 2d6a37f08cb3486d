//! Binary-level checks: help, startup failures, stream preamble.
use assert_cmd::prelude::*;
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};

#[test]
fn help_mentions_short_and_long_flags() {
    let out = Command::cargo_bin("pistatus")
        .expect("binary exists")
        .arg("--help")
        .output()
        .expect("run pistatus --help");
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    for flag in ["--interval", "-i", "--signal", "-s", "--widgets", "-w"] {
        assert!(text.contains(flag), "help missing {flag}\n{text}");
    }
}

#[test]
fn bad_widget_list_fails_before_any_output() {
    let out = Command::cargo_bin("pistatus")
        .expect("binary exists")
        .args(["--widgets", "cpu,weather"])
        .output()
        .expect("run pistatus");
    assert!(!out.status.success());
    assert!(out.stdout.is_empty(), "nothing may reach the bar");
    assert!(String::from_utf8_lossy(&out.stderr).contains("weather"));
}

#[test]
fn stream_starts_with_header_bracket_then_frame() {
    let mut child = Command::cargo_bin("pistatus")
        .expect("binary exists")
        .args(["--widgets", "vpn:pistatus-test0,clock:%Y", "-i", "0.2"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn pistatus");
    let stdout = child.stdout.take().expect("piped stdout");
    let mut lines = BufReader::new(stdout).lines();

    let header = lines.next().expect("header line").expect("utf8");
    let bracket = lines.next().expect("bracket line").expect("utf8");
    let first = lines.next().expect("first frame").expect("utf8");
    let second = lines.next().expect("second frame").expect("utf8");
    let _ = child.kill();
    let _ = child.wait();

    assert_eq!(header, r#"{"version":1}"#);
    assert_eq!(bracket, "[");
    for line in [first, second] {
        let body = line.strip_suffix(',').expect("trailing comma");
        let frame: serde_json::Value = serde_json::from_str(body).expect("valid JSON array");
        let frame = frame.as_array().expect("array");
        assert_eq!(frame.len(), 2);
        assert_eq!(frame[0]["full_text"], "VPN OFF");
        assert_eq!(frame[1]["full_text"].as_str().map(str::len), Some(4));
    }
}

#[cfg(target_os = "linux")]
#[test]
fn refresh_signal_forces_a_frame_between_ticks() {
    use std::time::{Duration, Instant};

    let mut child = Command::cargo_bin("pistatus")
        .expect("binary exists")
        .args(["--widgets", "vpn:pistatus-test0", "-i", "100"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn pistatus");
    let stdout = child.stdout.take().expect("piped stdout");
    let mut lines = BufReader::new(stdout).lines();

    // the handler is installed before the header is written
    assert_eq!(lines.next().expect("header").expect("utf8"), r#"{"version":1}"#);
    assert_eq!(lines.next().expect("bracket").expect("utf8"), "[");
    lines.next().expect("first frame").expect("utf8");

    let sent = Instant::now();
    let rc = unsafe { libc::kill(child.id() as i32, libc::SIGRTMIN() + 2) };
    assert_eq!(rc, 0, "kill failed");
    let second = lines.next().expect("second frame").expect("utf8");
    let elapsed = sent.elapsed();
    let _ = child.kill();
    let _ = child.wait();

    assert!(elapsed < Duration::from_secs(10), "signal frame took {elapsed:?}");
    let body = second.strip_suffix(',').expect("trailing comma");
    let frame: serde_json::Value = serde_json::from_str(body).expect("valid JSON array");
    assert_eq!(frame[0]["full_text"], "VPN OFF");
}
