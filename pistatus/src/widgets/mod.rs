//! Widgets: one display record per render cycle from current state.
//!
//! A widget may read metric slots and do cheap synchronous reads (clock,
//! memory counters, interface presence, short-lived helper commands). Slow
//! measurements belong in a sampler.

pub mod backlight;
pub mod battery;
pub mod clock;
pub mod cpu;
pub mod latency;
pub mod mem;
pub mod net;
pub mod volume;
pub mod vpn;

use std::process::Command;

use thiserror::Error;

use crate::config::WidgetSpec;
use crate::state::MetricStore;
use crate::types::WidgetRecord;

/// Per-cycle inputs shared by all widgets.
pub struct RenderContext<'a> {
    pub store: &'a MetricStore,
    /// Blink phase for this cycle.
    pub blink: bool,
}

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("{program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    Exit { program: String, status: String },
    #[error("cannot parse {what}")]
    Parse { what: &'static str },
    #[error("{0} not found")]
    Missing(String),
    #[error("bad time format {0:?}")]
    TimeFormat(String),
}

pub type WidgetResult = Result<WidgetRecord, WidgetError>;

pub trait Widget: Send {
    fn render(&mut self, ctx: &RenderContext<'_>) -> WidgetResult;
}

/// Run a helper command to completion and return its stdout.
pub fn run_command(program: &str, args: &[&str]) -> Result<String, WidgetError> {
    let out = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| WidgetError::Spawn {
            program: program.to_string(),
            source,
        })?;
    if !out.status.success() {
        return Err(WidgetError::Exit {
            program: program.to_string(),
            status: out.status.to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

/// First `NN%` in `s`, as the number before the percent sign.
pub(crate) fn first_percent(s: &str) -> Option<u32> {
    let idx = s.find('%')?;
    let digits: String = s[..idx]
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().ok()
}

/// Instantiate the configured widget.
pub fn build(spec: &WidgetSpec) -> Box<dyn Widget> {
    match spec {
        WidgetSpec::Backlight => Box::new(backlight::Backlight::new("🌞 ")),
        WidgetSpec::Net(iface) => Box::new(net::NetRate::new(iface, "")),
        WidgetSpec::Latency(host) => Box::new(latency::NetLatency::new(host, "🌏 ")),
        WidgetSpec::Alsa(control) => {
            let label = match control.as_str() {
                "Master" => "♪ ".to_string(),
                "Mic" | "Capture" => "🎤 ".to_string(),
                other => format!("{other} "),
            };
            Box::new(volume::AlsaVolume::new(control, &label))
        }
        WidgetSpec::Pulse(kind) => {
            let label = match kind {
                volume::PulseKind::Sinks => "♪PA",
                volume::PulseKind::Sources => "🎤PA",
            };
            Box::new(volume::PulseVolume::new(*kind, label))
        }
        WidgetSpec::Cpu => Box::new(cpu::Cpu),
        WidgetSpec::Mem => Box::new(mem::FreeMemory::new("RAM ")),
        WidgetSpec::Vpn(iface) => Box::new(vpn::Vpn::new(iface)),
        WidgetSpec::Battery => Box::new(battery::Battery),
        WidgetSpec::Clock(fmt) => Box::new(clock::Clock::new(fmt)),
    }
}
