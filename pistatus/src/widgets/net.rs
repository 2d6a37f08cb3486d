use std::time::Instant;

use sysinfo::Networks;

use crate::types::{WidgetRecord, WHITE};
use crate::widgets::{RenderContext, Widget, WidgetError, WidgetResult};

/// Cumulative interface counters at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSample {
    pub up: u64,
    pub down: u64,
    pub at: Instant,
}

/// Throughput in KiB/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rate {
    pub up: f64,
    pub down: f64,
}

impl Rate {
    pub const ZERO: Rate = Rate { up: 0.0, down: 0.0 };

    /// Rate between two samples; counter resets count as zero traffic.
    pub fn between(prev: &RateSample, now: &RateSample) -> Rate {
        let dt = now.at.saturating_duration_since(prev.at).as_secs_f64();
        if dt <= 0.0 {
            return Rate::ZERO;
        }
        let per_sec = |delta: u64| delta as f64 / 1024.0 / dt;
        Rate {
            up: per_sec(now.up.saturating_sub(prev.up)),
            down: per_sec(now.down.saturating_sub(prev.down)),
        }
    }
}

/// Keeps the previous sample and diffs each cycle. The first cycle has no
/// previous sample and reports zero.
#[derive(Debug, Default)]
pub struct RateTracker {
    prev: Option<RateSample>,
}

impl RateTracker {
    pub fn update(&mut self, now: RateSample) -> Rate {
        let rate = self
            .prev
            .map(|p| Rate::between(&p, &now))
            .unwrap_or(Rate::ZERO);
        self.prev = Some(now);
        rate
    }
}

/// `1234567` -> `1,234,567`
pub fn group_thousands(v: u64) -> String {
    let digits = v.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn rate_text(label: &str, rate: Rate) -> String {
    let prefix = if label.is_empty() {
        String::new()
    } else {
        format!("{label} ")
    };
    format!(
        "{prefix}↓{} ↑{} KiB/s",
        group_thousands(rate.down.round() as u64),
        group_thousands(rate.up.round() as u64)
    )
}

pub struct NetRate {
    iface: String,
    label: String,
    nets: Networks,
    tracker: RateTracker,
}

impl NetRate {
    pub fn new(iface: &str, label: &str) -> Self {
        Self {
            iface: iface.to_string(),
            label: label.to_string(),
            nets: Networks::new_with_refreshed_list(),
            tracker: RateTracker::default(),
        }
    }

    fn read_counters(&mut self) -> Result<RateSample, WidgetError> {
        self.nets.refresh(true);
        let data = self
            .nets
            .list()
            .get(&self.iface)
            .ok_or_else(|| WidgetError::Missing(format!("interface {}", self.iface)))?;
        Ok(RateSample {
            up: data.total_transmitted(),
            down: data.total_received(),
            at: Instant::now(),
        })
    }
}

impl Widget for NetRate {
    fn render(&mut self, _ctx: &RenderContext<'_>) -> WidgetResult {
        let sample = self.read_counters()?;
        let rate = self.tracker.update(sample);
        Ok(WidgetRecord::text(WHITE, rate_text(&self.label, rate)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn one_mib_in_one_second_is_1024_kib_per_sec() {
        let t0 = Instant::now();
        let a = RateSample {
            up: 1000,
            down: 2000,
            at: t0,
        };
        let b = RateSample {
            up: 1000 + 1_048_576,
            down: 2000,
            at: t0 + Duration::from_secs(1),
        };
        let r = Rate::between(&a, &b);
        assert!((r.up - 1024.0).abs() < 1e-9);
        assert!(r.down.abs() < 1e-9);
    }

    #[test]
    fn first_update_has_no_rate() {
        let t0 = Instant::now();
        let mut tracker = RateTracker::default();
        let first = tracker.update(RateSample {
            up: 5_000_000,
            down: 9_000_000,
            at: t0,
        });
        assert_eq!(first, Rate::ZERO);

        let second = tracker.update(RateSample {
            up: 5_000_000,
            down: 9_000_000 + 2048,
            at: t0 + Duration::from_secs(2),
        });
        assert!((second.down - 1.0).abs() < 1e-9);
        assert_eq!(second.up, 0.0);
    }

    #[test]
    fn counter_reset_and_zero_elapsed_are_not_negative() {
        let t0 = Instant::now();
        let a = RateSample {
            up: 10_000,
            down: 10_000,
            at: t0,
        };
        let reset = RateSample {
            up: 10,
            down: 10,
            at: t0 + Duration::from_secs(1),
        };
        assert_eq!(Rate::between(&a, &reset), Rate::ZERO);
        assert_eq!(Rate::between(&a, &a), Rate::ZERO);
    }

    #[test]
    fn text_groups_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
        let r = Rate {
            up: 1024.0,
            down: 12345.4,
        };
        assert_eq!(rate_text("", r), "↓12,345 ↑1,024 KiB/s");
        assert_eq!(rate_text("wifi", r), "wifi ↓12,345 ↑1,024 KiB/s");
    }
}
