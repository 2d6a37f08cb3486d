use crate::types::{WidgetRecord, WHITE};
use crate::widgets::{first_percent, run_command, RenderContext, Widget, WidgetError, WidgetResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeState {
    pub percent: u32,
    pub muted: bool,
}

impl VolumeState {
    fn text(&self, label: &str) -> String {
        if self.muted {
            format!("{label}muted")
        } else {
            format!("{label}{}%", self.percent)
        }
    }
}

/// `[bracketed]` fields of amixer output, in order.
fn bracketed(raw: &str) -> impl Iterator<Item = &str> {
    raw.split('[')
        .skip(1)
        .filter_map(|s| s.split_once(']').map(|(inner, _)| inner))
}

/// `amixer get CONTROL`: first `[NN%]` is the volume, first `[on|off]` the switch.
pub fn parse_amixer(raw: &str) -> Result<VolumeState, WidgetError> {
    let percent = bracketed(raw)
        .find_map(|f| f.strip_suffix('%').and_then(|n| n.parse().ok()))
        .ok_or(WidgetError::Parse {
            what: "amixer volume",
        })?;
    let muted = bracketed(raw).find(|f| *f == "on" || *f == "off") == Some("off");
    Ok(VolumeState { percent, muted })
}

/// `pactl list sinks|sources`: first `Volume:` line, muted if any `Mute: yes`.
pub fn parse_pactl(raw: &str) -> Result<VolumeState, WidgetError> {
    let percent = raw
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("Volume"))
        .and_then(first_percent)
        .ok_or(WidgetError::Parse {
            what: "pactl volume",
        })?;
    let muted = raw.lines().any(|l| l.trim() == "Mute: yes");
    Ok(VolumeState { percent, muted })
}

pub struct AlsaVolume {
    control: String,
    label: String,
}

impl AlsaVolume {
    pub fn new(control: &str, label: &str) -> Self {
        Self {
            control: control.to_string(),
            label: label.to_string(),
        }
    }
}

impl Widget for AlsaVolume {
    fn render(&mut self, _ctx: &RenderContext<'_>) -> WidgetResult {
        let raw = run_command("amixer", &["-c0", "get", &self.control])?;
        let state = parse_amixer(&raw)?;
        Ok(WidgetRecord::text(WHITE, state.text(&self.label)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseKind {
    Sinks,
    Sources,
}

impl PulseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PulseKind::Sinks => "sinks",
            PulseKind::Sources => "sources",
        }
    }
}

pub struct PulseVolume {
    kind: PulseKind,
    label: String,
}

impl PulseVolume {
    pub fn new(kind: PulseKind, label: &str) -> Self {
        Self {
            kind,
            label: format!("{label} "),
        }
    }
}

impl Widget for PulseVolume {
    fn render(&mut self, _ctx: &RenderContext<'_>) -> WidgetResult {
        let raw = run_command("pactl", &["list", self.kind.as_str()])?;
        let state = parse_pactl(&raw)?;
        Ok(WidgetRecord::text(WHITE, state.text(&self.label)))
    }
}
