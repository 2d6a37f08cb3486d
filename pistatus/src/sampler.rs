//! Background samplers: each owns one slot, measures at its own pace and
//! publishes whole values, so the render path only ever reads the latest one.

use std::future::Future;
use std::process::Stdio;
use std::sync::Arc;

use sysinfo::{CpuRefreshKind, RefreshKind, System, MINIMUM_CPU_UPDATE_INTERVAL};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

use crate::state::{Latency, LatencyMap, MetricSlot, MetricStore};

/// One external measurement. May take seconds.
pub trait Probe: Send + 'static {
    type Output: Send + Sync + 'static;

    fn name(&self) -> &'static str;

    fn measure(&mut self) -> impl Future<Output = anyhow::Result<Self::Output>> + Send;
}

/// Measure under `limit`, publish on success, keep the last value otherwise.
pub async fn sample_once<P: Probe>(probe: &mut P, slot: &MetricSlot<P::Output>, limit: Duration) {
    match timeout(limit, probe.measure()).await {
        Ok(Ok(v)) => slot.publish(v),
        Ok(Err(e)) => warn!("{} sampler failed: {e:#}", probe.name()),
        Err(_) => warn!("{} sampler timed out after {limit:?}", probe.name()),
    }
}

pub fn spawn_sampler<P: Probe>(
    mut probe: P,
    slot: Arc<MetricSlot<P::Output>>,
    period: Duration,
    limit: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            sample_once(&mut probe, &slot, limit).await;
            sleep(period).await;
        }
    })
}

/// Busy CPU percent averaged over a window (sysinfo needs two refreshes).
pub struct CpuProbe {
    sys: System,
    window: Duration,
}

impl CpuProbe {
    pub fn new(window: Duration) -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing().with_cpu_usage()),
        );
        Self { sys, window }
    }
}

impl Probe for CpuProbe {
    type Output = u8;

    fn name(&self) -> &'static str {
        "cpu"
    }

    async fn measure(&mut self) -> anyhow::Result<u8> {
        self.sys.refresh_cpu_usage();
        sleep(self.window.max(MINIMUM_CPU_UPDATE_INTERVAL)).await;
        self.sys.refresh_cpu_usage();
        let busy = self.sys.global_cpu_usage();
        if !busy.is_finite() {
            anyhow::bail!("cpu usage not available");
        }
        Ok(busy.clamp(0.0, 100.0).round() as u8)
    }
}

// 1s pause after each window: a new value lands roughly every render tick
pub fn spawn_cpu_sampler(store: &MetricStore, window: Duration) -> JoinHandle<()> {
    let limit = window + Duration::from_secs(5);
    spawn_sampler(
        CpuProbe::new(window),
        store.cpu.clone(),
        Duration::from_secs(1),
        limit,
    )
}

/// Reachability check for one host.
pub trait Pinger: Send + Sync + 'static {
    fn ping(&self, host: &str) -> impl Future<Output = Latency> + Send;
}

/// `ping -c 1 -W 1 HOST`, bounded by `limit`.
pub struct SystemPinger {
    pub limit: Duration,
}

impl Pinger for SystemPinger {
    async fn ping(&self, host: &str) -> Latency {
        let mut cmd = Command::new("ping");
        cmd.args(["-c", "1", "-W", "1", host])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        match timeout(self.limit, cmd.output()).await {
            Ok(Ok(out)) => parse_ping_time(&String::from_utf8_lossy(&out.stdout))
                .map(Latency::Reachable)
                .unwrap_or(Latency::Unreachable),
            Ok(Err(e)) => {
                warn!("ping {host}: {e}");
                Latency::Unreachable
            }
            Err(_) => {
                debug!("ping {host}: timed out");
                Latency::Unreachable
            }
        }
    }
}

/// Extract `12.3 ms` from a ping reply line containing `time=12.3 ms`.
pub fn parse_ping_time(raw: &str) -> Option<String> {
    let start = raw.find("time=")? + "time=".len();
    let rest = &raw[start..];
    let mut parts = rest.split_whitespace();
    let value = parts.next()?;
    let unit = parts.next()?;
    value.parse::<f64>().ok()?;
    if unit.is_empty() || !unit.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(format!("{value} {unit}"))
}

/// Ping every currently known target once. Results are published host by
/// host as fresh copies of the map.
pub async fn latency_pass<P: Pinger>(store: &MetricStore, pinger: &P) {
    for host in store.ping_targets.snapshot() {
        let result = pinger.ping(&host).await;
        let mut map: LatencyMap = store
            .latency
            .latest()
            .map(|s| s.value.clone())
            .unwrap_or_default();
        map.insert(host, result);
        store.latency.publish(map);
    }
}

// 30s between passes: latency changes slowly and ping is not free
pub fn spawn_latency_sampler<P: Pinger>(
    store: Arc<MetricStore>,
    pinger: P,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            latency_pass(&store, &pinger).await;
            sleep(period).await;
        }
    })
}
