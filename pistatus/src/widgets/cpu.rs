use crate::types::{WidgetRecord, RED, WHITE};
use crate::widgets::{RenderContext, Widget, WidgetResult};

/// Latest value of the CPU sampler.
pub struct Cpu;

pub fn cpu_record(percent: Option<u8>) -> WidgetRecord {
    match percent {
        Some(p) => {
            let color = if p < 90 { WHITE } else { RED };
            WidgetRecord::text(color, format!("CPU {p}%"))
        }
        None => WidgetRecord::text(WHITE, "CPU ?"),
    }
}

impl Widget for Cpu {
    fn render(&mut self, ctx: &RenderContext<'_>) -> WidgetResult {
        Ok(cpu_record(ctx.store.cpu.latest().map(|s| s.value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MetricStore;

    #[test]
    fn before_first_sample_shows_placeholder() {
        let store = MetricStore::new();
        let ctx = RenderContext {
            store: &store,
            blink: false,
        };
        let rec = Cpu.render(&ctx).unwrap();
        assert_eq!(rec.full_text, "CPU ?");

        store.cpu.publish(93);
        let rec = Cpu.render(&ctx).unwrap();
        assert_eq!(rec.full_text, "CPU 93%");
        assert_eq!(rec.color, RED);
    }
}
