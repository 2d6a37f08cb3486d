//! Records written to the status bar as JSON.
//! Keep this module minimal and stable: it defines the wire format.

use serde::Serialize;

pub const WHITE: &str = "#ffffff";
pub const BLACK: &str = "#000000";
pub const RED: &str = "#ff0000";
pub const ORANGE: &str = "#ffaa00";
pub const GREEN: &str = "#00ff00";

/// Rendering mode understood by the bar. Always plain text here.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Markup {
    None,
}

/// One widget's output for one frame.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct WidgetRecord {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    // error records carry only full_text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_text: Option<String>,
    pub full_text: String,
    pub markup: Markup,
    pub separator: bool,
}

impl WidgetRecord {
    /// Plain record: same short/full text, no background.
    pub fn text(color: &str, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            color: color.to_string(),
            background: None,
            short_text: Some(text.clone()),
            full_text: text,
            markup: Markup::None,
            separator: true,
        }
    }

    pub fn with_background(mut self, background: &str) -> Self {
        self.background = Some(background.to_string());
        self
    }

    /// Fixed-shape record shown in place of a widget that failed.
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            color: RED.to_string(),
            background: None,
            short_text: None,
            full_text: format!("Error: {message}"),
            markup: Markup::None,
            separator: true,
        }
    }
}

/// All records of one render cycle, in configured widget order.
pub type Frame = Vec<WidgetRecord>;
