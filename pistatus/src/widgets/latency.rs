use crate::types::{WidgetRecord, WHITE};
use crate::widgets::{RenderContext, Widget, WidgetResult};

/// Last known round trip to `host`. The first render registers the host
/// with the latency sampler.
pub struct NetLatency {
    host: String,
    label: String,
}

impl NetLatency {
    pub fn new(host: &str, label: &str) -> Self {
        Self {
            host: host.to_string(),
            label: label.to_string(),
        }
    }
}

impl Widget for NetLatency {
    fn render(&mut self, ctx: &RenderContext<'_>) -> WidgetResult {
        ctx.store.ping_targets.add(&self.host);
        let status = ctx.store.latency_of(&self.host);
        Ok(WidgetRecord::text(WHITE, format!("{}{status}", self.label)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Latency, LatencyMap, MetricStore};

    #[test]
    fn registers_host_and_shows_status() {
        let store = MetricStore::new();
        let ctx = RenderContext {
            store: &store,
            blink: false,
        };
        let mut w = NetLatency::new("1.1.1.1", "🌏 ");
        assert_eq!(w.render(&ctx).unwrap().full_text, "🌏 ?");
        assert_eq!(store.ping_targets.snapshot(), vec!["1.1.1.1"]);

        let mut map = LatencyMap::new();
        map.insert("1.1.1.1".into(), Latency::Reachable("11.8 ms".into()));
        store.latency.publish(map);
        assert_eq!(w.render(&ctx).unwrap().full_text, "🌏 11.8 ms");
        assert_eq!(store.ping_targets.snapshot().len(), 1);
    }
}
