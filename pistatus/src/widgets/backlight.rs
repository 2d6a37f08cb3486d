use crate::types::{WidgetRecord, WHITE};
use crate::widgets::{run_command, RenderContext, Widget, WidgetError, WidgetResult};

pub struct Backlight {
    label: String,
}

impl Backlight {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
        }
    }
}

/// `xbacklight -get` prints a float such as `37.500000`.
pub fn parse_xbacklight(raw: &str) -> Result<u32, WidgetError> {
    let v: f64 = raw
        .trim()
        .parse()
        .map_err(|_| WidgetError::Parse { what: "backlight" })?;
    if !v.is_finite() || v < 0.0 {
        return Err(WidgetError::Parse { what: "backlight" });
    }
    Ok(v.round() as u32)
}

impl Widget for Backlight {
    fn render(&mut self, _ctx: &RenderContext<'_>) -> WidgetResult {
        let percent = parse_xbacklight(&run_command("xbacklight", &["-get"])?)?;
        Ok(WidgetRecord::text(WHITE, format!("{}{percent}%", self.label)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_brightness() {
        assert_eq!(parse_xbacklight("37.500000\n").unwrap(), 38);
        assert_eq!(parse_xbacklight("100").unwrap(), 100);
        assert!(parse_xbacklight("No outputs have backlight property\n").is_err());
    }
}
