use crate::types::{WidgetRecord, BLACK, GREEN, ORANGE, RED};
use crate::widgets::{run_command, RenderContext, Widget, WidgetError, WidgetResult};

const RED_MINS: u32 = 30;
const ORANGE_MINS: u32 = 60;

/// First battery reported by `acpi -b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatteryStatus {
    pub state: String,
    pub percent: u32,
    /// (hours, minutes) remaining or until charged.
    pub time: Option<(u32, u32)>,
}

fn parse_hms(token: &str) -> Option<(u32, u32)> {
    let mut it = token.split(':');
    let (h, m, s) = (it.next()?, it.next()?, it.next()?);
    if it.next().is_some() || [h, m, s].iter().any(|p| p.len() != 2) {
        return None;
    }
    s.parse::<u32>().ok()?;
    Some((h.parse().ok()?, m.parse().ok()?))
}

/// `Battery 0: Discharging, 19%, 01:08:26 remaining`
pub fn parse_acpi(raw: &str) -> Result<BatteryStatus, WidgetError> {
    let line = raw
        .lines()
        .find(|l| l.contains('%'))
        .ok_or(WidgetError::Parse { what: "acpi output" })?;
    let fields: Vec<&str> = line.split(',').collect();
    let (state, percent) = fields
        .windows(2)
        .find_map(|w| {
            let percent = w[1].trim().strip_suffix('%')?.parse::<u32>().ok()?;
            let state = w[0].split_whitespace().last()?;
            state
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_')
                .then(|| (state.to_string(), percent))
        })
        .ok_or(WidgetError::Parse { what: "acpi output" })?;
    let time = line.split_whitespace().find_map(|t| parse_hms(t.trim_end_matches(',')));
    Ok(BatteryStatus {
        state,
        percent,
        time,
    })
}

pub fn battery_record(b: &BatteryStatus, blink: bool) -> WidgetRecord {
    let Some((hours, mins)) = b.time else {
        let text = format!("🔋{}% {}", b.percent, b.state);
        return WidgetRecord::text(GREEN, text).with_background(BLACK);
    };
    let hours_text = if hours > 0 {
        format!("{hours}h")
    } else {
        String::new()
    };
    if b.state != "Discharging" {
        let text = format!("🔋{}%, {hours_text}{mins}m to full", b.percent);
        return WidgetRecord::text(GREEN, text).with_background(BLACK);
    }
    let mins_left = hours * 60 + mins;
    // low battery alternates black-on-red and red-on-black between cycles
    let (color, background) = if mins_left <= RED_MINS {
        if blink {
            (BLACK, RED)
        } else {
            (RED, BLACK)
        }
    } else if mins_left <= ORANGE_MINS {
        (ORANGE, BLACK)
    } else {
        (GREEN, BLACK)
    };
    let text = format!("🔋{}%, {hours_text}{mins}m on bat", b.percent);
    WidgetRecord::text(color, text).with_background(background)
}

pub struct Battery;

impl Widget for Battery {
    fn render(&mut self, ctx: &RenderContext<'_>) -> WidgetResult {
        let status = parse_acpi(&run_command("acpi", &["-b"])?)?;
        Ok(battery_record(&status, ctx.blink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_discharging_line() {
        let b = parse_acpi("Battery 0: Discharging, 19%, 01:08:26 remaining\n").unwrap();
        assert_eq!(
            b,
            BatteryStatus {
                state: "Discharging".into(),
                percent: 19,
                time: Some((1, 8)),
            }
        );
        let rec = battery_record(&b, false);
        assert_eq!(rec.full_text, "🔋19%, 1h8m on bat");
        assert_eq!(rec.color, GREEN);
    }

    #[test]
    fn parses_full_and_charging() {
        let full = parse_acpi("Battery 0: Full, 100%\n").unwrap();
        assert_eq!(full.time, None);
        assert_eq!(battery_record(&full, true).full_text, "🔋100% Full");

        let charging = parse_acpi("Battery 0: Charging, 80%, 00:25:00 until charged\n").unwrap();
        let rec = battery_record(&charging, true);
        assert_eq!(rec.full_text, "🔋80%, 25m to full");
        assert_eq!(rec.color, GREEN);
        assert_eq!(rec.background.as_deref(), Some(BLACK));
    }

    #[test]
    fn low_battery_blinks_with_phase() {
        let b = parse_acpi("Battery 0: Discharging, 7%, 00:20:00 remaining").unwrap();
        let on = battery_record(&b, true);
        let off = battery_record(&b, false);
        assert_eq!((on.color.as_str(), on.background.as_deref()), (BLACK, Some(RED)));
        assert_eq!((off.color.as_str(), off.background.as_deref()), (RED, Some(BLACK)));

        let b = parse_acpi("Battery 0: Discharging, 30%, 00:45:00 remaining").unwrap();
        assert_eq!(battery_record(&b, true).color, ORANGE);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(parse_acpi("No support for device type: power_supply\n").is_err());
        assert!(parse_acpi("").is_err());
    }
}
