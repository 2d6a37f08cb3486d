//! Runs every widget once per frame behind a failure boundary.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::debug;

use crate::types::{Frame, WidgetRecord};
use crate::widgets::{RenderContext, Widget};

pub struct Renderer {
    widgets: Vec<Box<dyn Widget>>,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "widget panicked".to_string()
    }
}

impl Renderer {
    pub fn new(widgets: Vec<Box<dyn Widget>>) -> Self {
        Self { widgets }
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// One record per widget, in configured order. A failing or panicking
    /// widget yields an error record in its own position; the rest still run.
    pub fn render_frame(&mut self, ctx: &RenderContext<'_>) -> Frame {
        self.widgets
            .iter_mut()
            .enumerate()
            .map(|(i, w)| {
                match catch_unwind(AssertUnwindSafe(|| w.render(ctx))) {
                    Ok(Ok(rec)) => rec,
                    Ok(Err(e)) => {
                        debug!("widget {i} failed: {e}");
                        WidgetRecord::error(e)
                    }
                    Err(payload) => {
                        let msg = panic_message(payload.as_ref());
                        debug!("widget {i} panicked: {msg}");
                        WidgetRecord::error(msg)
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MetricStore;
    use crate::types::WHITE;
    use crate::widgets::{WidgetError, WidgetResult};

    struct Fixed(&'static str);

    impl Widget for Fixed {
        fn render(&mut self, _ctx: &RenderContext<'_>) -> WidgetResult {
            Ok(WidgetRecord::text(WHITE, self.0))
        }
    }

    struct Broken;

    impl Widget for Broken {
        fn render(&mut self, _ctx: &RenderContext<'_>) -> WidgetResult {
            Err(WidgetError::Missing("interface wlp3s0".into()))
        }
    }

    struct Panics;

    impl Widget for Panics {
        fn render(&mut self, _ctx: &RenderContext<'_>) -> WidgetResult {
            panic!("index out of range")
        }
    }

    /// Counts how often it ran, to show every frame retries every widget.
    struct Counting(u32);

    impl Widget for Counting {
        fn render(&mut self, _ctx: &RenderContext<'_>) -> WidgetResult {
            self.0 += 1;
            Ok(WidgetRecord::text(WHITE, self.0.to_string()))
        }
    }

    fn texts(frame: &Frame) -> Vec<&str> {
        frame.iter().map(|r| r.full_text.as_str()).collect()
    }

    #[test]
    fn failures_stay_in_their_slot() {
        let store = MetricStore::new();
        let ctx = RenderContext {
            store: &store,
            blink: false,
        };
        let mut r = Renderer::new(vec![
            Box::new(Fixed("a")),
            Box::new(Broken),
            Box::new(Fixed("b")),
            Box::new(Panics),
            Box::new(Fixed("c")),
        ]);
        let frame = r.render_frame(&ctx);
        assert_eq!(frame.len(), r.len());
        assert_eq!(
            texts(&frame),
            vec![
                "a",
                "Error: interface wlp3s0 not found",
                "b",
                "Error: index out of range",
                "c"
            ]
        );
        assert_eq!(frame[1], WidgetRecord::error("interface wlp3s0 not found"));
    }

    #[test]
    fn every_frame_reevaluates_every_widget() {
        let store = MetricStore::new();
        let ctx = RenderContext {
            store: &store,
            blink: false,
        };
        let mut r = Renderer::new(vec![Box::new(Broken), Box::new(Counting(0))]);
        r.render_frame(&ctx);
        let frame = r.render_frame(&ctx);
        assert_eq!(texts(&frame)[1], "2");
    }

    #[test]
    fn empty_bar_renders_empty_frame() {
        let store = MetricStore::new();
        let ctx = RenderContext {
            store: &store,
            blink: false,
        };
        let mut r = Renderer::new(Vec::new());
        assert!(r.is_empty());
        assert!(r.render_frame(&ctx).is_empty());
    }
}
