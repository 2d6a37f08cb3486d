//! Startup configuration: arguments, environment knobs and the widget list.

use std::time::Duration;

use anyhow::{bail, Context};

use crate::widgets::clock::validate_format;
use crate::widgets::volume::PulseKind;

pub const DEFAULT_WIDGETS: &str = "backlight,net:wlp3s0,latency:1.1.1.1,alsa:Master,alsa:Mic,\
pulse:sinks,cpu,mem,vpn,battery,clock";
pub const DEFAULT_CLOCK_FORMAT: &str = "%d %b %H:%M";
pub const DEFAULT_VPN_IFACE: &str = "tun0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetSpec {
    Backlight,
    Net(String),
    Latency(String),
    Alsa(String),
    Pulse(PulseKind),
    Cpu,
    Mem,
    Vpn(String),
    Battery,
    Clock(String),
}

impl WidgetSpec {
    pub fn parse(entry: &str) -> anyhow::Result<Self> {
        let (kind, raw_arg) = match entry.split_once(':') {
            Some((k, a)) => (k.trim(), Some(a)),
            None => (entry.trim(), None),
        };
        let arg = raw_arg.map(str::trim).filter(|a| !a.is_empty());
        let required = |what: &str| -> anyhow::Result<String> {
            arg.map(str::to_string)
                .with_context(|| format!("widget {kind:?} needs {what}, e.g. {kind}:{what}"))
        };
        let spec = match kind {
            "backlight" => WidgetSpec::Backlight,
            "net" => WidgetSpec::Net(required("IFACE")?),
            "latency" => WidgetSpec::Latency(required("HOST")?),
            "alsa" => WidgetSpec::Alsa(required("CONTROL")?),
            "pulse" => match arg {
                Some("sinks") => WidgetSpec::Pulse(PulseKind::Sinks),
                Some("sources") => WidgetSpec::Pulse(PulseKind::Sources),
                _ => bail!("widget \"pulse\" needs sinks or sources"),
            },
            "cpu" => WidgetSpec::Cpu,
            "mem" => WidgetSpec::Mem,
            "vpn" => WidgetSpec::Vpn(arg.unwrap_or(DEFAULT_VPN_IFACE).to_string()),
            "battery" => WidgetSpec::Battery,
            "clock" => {
                // spaces are part of the format
                let fmt = raw_arg
                    .filter(|a| !a.trim().is_empty())
                    .unwrap_or(DEFAULT_CLOCK_FORMAT);
                validate_format(fmt)?;
                WidgetSpec::Clock(fmt.to_string())
            }
            other => bail!("unknown widget {other:?}"),
        };
        Ok(spec)
    }

    pub fn needs_latency(&self) -> bool {
        matches!(self, WidgetSpec::Latency(_))
    }
}

const WIDGET_KINDS: &[&str] = &[
    "backlight", "net", "latency", "alsa", "pulse", "cpu", "mem", "vpn", "battery", "clock",
];

fn starts_entry(piece: &str) -> bool {
    let kind = piece.split_once(':').map_or(piece, |(k, _)| k).trim();
    WIDGET_KINDS.contains(&kind)
}

/// Split on commas that begin a new `kind[:arg]` entry; any other comma
/// stays inside the previous entry's argument (`clock:%a, %d %b`).
pub fn split_widget_list(list: &str) -> Vec<String> {
    let mut entries: Vec<String> = Vec::new();
    for piece in list.split(',').filter(|p| !p.trim().is_empty()) {
        match entries.last_mut() {
            Some(last) if !starts_entry(piece) => {
                last.push(',');
                last.push_str(piece);
            }
            _ => entries.push(piece.to_string()),
        }
    }
    entries
}

/// Comma-separated `kind[:arg]` entries, in bar order.
pub fn parse_widget_list(list: &str) -> anyhow::Result<Vec<WidgetSpec>> {
    split_widget_list(list)
        .iter()
        .map(|e| WidgetSpec::parse(e))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub interval: Duration,
    /// Added to SIGRTMIN to get the refresh signal.
    pub signal_offset: i32,
    pub cpu_window: Duration,
    pub ping_period: Duration,
    pub ping_timeout: Duration,
    pub widgets: Vec<WidgetSpec>,
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--interval SECS|-i SECS] [--signal N|-s N] [--widgets LIST|-w LIST]\n\
         \n\
         Writes an i3bar JSON stream to stdout. Sending SIGRTMIN+N (default N=2)\n\
         forces an immediate refresh.\n\
         \n\
         LIST is comma-separated, in bar order. A comma inside a clock format is\n\
         kept unless it is followed by a widget name:\n\
         \x20 backlight, net:IFACE, latency:HOST, alsa:CONTROL, pulse:sinks|sources,\n\
         \x20 cpu, mem, vpn[:IFACE], battery, clock[:STRFTIME]\n\
         Default: {DEFAULT_WIDGETS}\n\
         \n\
         Environment: PISTATUS_INTERVAL_MS, PISTATUS_CPU_WINDOW_MS,\n\
         PISTATUS_PING_PERIOD_SECS, PISTATUS_PING_TIMEOUT_MS, RUST_LOG"
    )
}

/// What the command line asked for.
#[derive(Debug)]
pub enum Invocation {
    Help(String),
    Run(Config),
}

pub const MIN_INTERVAL: Duration = Duration::from_millis(1);
const MAX_INTERVAL_SECS: u64 = 86_400;

fn parse_interval_secs(v: &str) -> anyhow::Result<Duration> {
    let secs: f64 = v
        .parse()
        .with_context(|| format!("invalid interval {v:?}"))?;
    match Duration::try_from_secs_f64(secs) {
        Ok(d) if d >= MIN_INTERVAL && d.as_secs() <= MAX_INTERVAL_SECS => Ok(d),
        _ => bail!("interval must be between 1ms and {MAX_INTERVAL_SECS}s, got {v:?}"),
    }
}

/// Whether SIGRTMIN+`offset` is a valid realtime signal.
#[cfg(target_os = "linux")]
pub fn signal_offset_in_range(offset: i32) -> bool {
    offset >= 0
        && libc::SIGRTMIN()
            .checked_add(offset)
            .is_some_and(|signo| signo <= libc::SIGRTMAX())
}

#[cfg(not(target_os = "linux"))]
pub fn signal_offset_in_range(offset: i32) -> bool {
    offset >= 0
}

pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Invocation> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "pistatus".into());
    let mut interval: Option<String> = None;
    let mut signal: Option<String> = None;
    let mut widgets: Option<String> = None;

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Invocation::Help(usage(&prog))),
            "--interval" | "-i" => interval = it.next(),
            "--signal" | "-s" => signal = it.next(),
            "--widgets" | "-w" => widgets = it.next(),
            _ if arg.starts_with("--interval=") => {
                interval = arg.split_once('=').map(|(_, v)| v.to_string());
            }
            _ if arg.starts_with("--signal=") => {
                signal = arg.split_once('=').map(|(_, v)| v.to_string());
            }
            _ if arg.starts_with("--widgets=") => {
                widgets = arg.split_once('=').map(|(_, v)| v.to_string());
            }
            other => bail!("unexpected argument {other:?}\n{}", usage(&prog)),
        }
    }

    let interval = match interval {
        Some(v) => parse_interval_secs(&v)?,
        None => Duration::from_millis(env_u64("PISTATUS_INTERVAL_MS").unwrap_or(2_000).max(1)),
    };
    let signal_offset = match signal {
        Some(v) => v
            .parse::<i32>()
            .ok()
            .filter(|n| signal_offset_in_range(*n))
            .with_context(|| format!("invalid signal offset {v:?}"))?,
        None => 2,
    };
    let widgets = parse_widget_list(widgets.as_deref().unwrap_or(DEFAULT_WIDGETS))?;

    Ok(Invocation::Run(Config {
        interval,
        signal_offset,
        cpu_window: Duration::from_millis(env_u64("PISTATUS_CPU_WINDOW_MS").unwrap_or(2_000)),
        ping_period: Duration::from_secs(env_u64("PISTATUS_PING_PERIOD_SECS").unwrap_or(30)),
        ping_timeout: Duration::from_millis(env_u64("PISTATUS_PING_TIMEOUT_MS").unwrap_or(3_000)),
        widgets,
    }))
}
