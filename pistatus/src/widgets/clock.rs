use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::Local;

use crate::types::{WidgetRecord, WHITE};
use crate::widgets::{RenderContext, Widget, WidgetError, WidgetResult};

pub struct Clock {
    format: String,
}

impl Clock {
    pub fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
        }
    }
}

/// Reject strftime strings chrono cannot render.
pub fn validate_format(format: &str) -> Result<(), WidgetError> {
    if StrftimeItems::new(format).any(|i| matches!(i, Item::Error)) {
        return Err(WidgetError::TimeFormat(format.to_string()));
    }
    Ok(())
}

impl Widget for Clock {
    fn render(&mut self, _ctx: &RenderContext<'_>) -> WidgetResult {
        let mut text = String::new();
        write!(text, "{}", Local::now().format(&self.format))
            .map_err(|_| WidgetError::TimeFormat(self.format.clone()))?;
        Ok(WidgetRecord::text(WHITE, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MetricStore;

    #[test]
    fn renders_local_time() {
        let store = MetricStore::new();
        let ctx = RenderContext {
            store: &store,
            blink: true,
        };
        let rec = Clock::new("%Y").render(&ctx).unwrap();
        assert_eq!(rec.full_text.len(), 4);
        assert!(rec.full_text.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn invalid_format_is_an_error_not_a_panic() {
        assert!(validate_format("%d %b %H:%M").is_ok());
        assert!(validate_format("%Q").is_err());

        let store = MetricStore::new();
        let ctx = RenderContext {
            store: &store,
            blink: true,
        };
        let err = Clock::new("%Q").render(&ctx).unwrap_err();
        assert!(matches!(err, WidgetError::TimeFormat(_)));
    }
}
