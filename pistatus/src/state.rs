//! Shared feeder state: metric slots written by samplers and read by widgets.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

/// One published measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<T> {
    pub value: T,
    pub updated_at: Instant,
}

/// Single-writer, many-reader holder for the latest sample.
///
/// Writers build a complete `Sample` and swap the `Arc`; readers clone the
/// `Arc` and never hold the lock while formatting. A reader therefore sees
/// either the previous or the new sample, never a mix.
pub struct MetricSlot<T> {
    inner: RwLock<Option<Arc<Sample<T>>>>,
}

impl<T> MetricSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    pub fn publish(&self, value: T) {
        let sample = Arc::new(Sample {
            value,
            updated_at: Instant::now(),
        });
        // a poisoned lock still guards a whole Arc, so keep going
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(sample);
    }

    /// `None` until the owning sampler has published once.
    pub fn latest(&self) -> Option<Arc<Sample<T>>> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.clone()
    }
}

impl<T> Default for MetricSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of probing one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Latency {
    /// Round-trip time as reported by ping, e.g. `12.3 ms`.
    Reachable(String),
    Unreachable,
}

/// Display state of a host in the latency map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LatencyStatus {
    /// Not pinged yet.
    Unknown,
    Unreachable,
    Reachable(String),
}

impl fmt::Display for LatencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatencyStatus::Unknown => f.write_str("?"),
            LatencyStatus::Unreachable => f.write_str("∞"),
            LatencyStatus::Reachable(t) => f.write_str(t),
        }
    }
}

pub type LatencyMap = HashMap<String, Latency>;

/// Append-only set of hosts the latency sampler walks.
///
/// Widgets add hosts while the sampler may be mid-pass; the sampler iterates
/// over a snapshot, so a new host simply shows up on the next pass.
#[derive(Default)]
pub struct PingTargets {
    hosts: Mutex<Vec<String>>,
}

impl PingTargets {
    /// Returns true when the host was not known before.
    pub fn add(&self, host: &str) -> bool {
        let mut hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        if hosts.iter().any(|h| h == host) {
            return false;
        }
        hosts.push(host.to_string());
        true
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.hosts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Every slot shared between samplers and widgets.
#[derive(Default)]
pub struct MetricStore {
    /// Busy CPU percent, 0..=100.
    pub cpu: Arc<MetricSlot<u8>>,
    pub latency: Arc<MetricSlot<LatencyMap>>,
    pub ping_targets: Arc<PingTargets>,
}

impl MetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latency lookup for display; never fails.
    pub fn latency_of(&self, host: &str) -> LatencyStatus {
        let Some(sample) = self.latency.latest() else {
            return LatencyStatus::Unknown;
        };
        match sample.value.get(host) {
            None => LatencyStatus::Unknown,
            Some(Latency::Unreachable) => LatencyStatus::Unreachable,
            Some(Latency::Reachable(t)) => LatencyStatus::Reachable(t.clone()),
        }
    }
}

/// Blink phase, advanced once per render cycle by the scheduler.
pub struct ToggleState {
    on: AtomicBool,
}

impl ToggleState {
    pub fn new(initial: bool) -> Self {
        Self {
            on: AtomicBool::new(initial),
        }
    }

    /// Flip and return the new phase.
    pub fn flip(&self) -> bool {
        !self.on.fetch_xor(true, Ordering::AcqRel)
    }

    pub fn get(&self) -> bool {
        self.on.load(Ordering::Acquire)
    }
}
