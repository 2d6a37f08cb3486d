//! Render scheduling: a ticker and a realtime signal both post render
//! requests to one queue; a single consumer renders and writes frames, so
//! two renders never overlap and frames never interleave.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use tokio::signal::unix::Signal;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{Config, WidgetSpec, MIN_INTERVAL};
use crate::render::Renderer;
use crate::sampler::{spawn_cpu_sampler, spawn_latency_sampler, SystemPinger};
use crate::state::{MetricStore, ToggleState};
use crate::stream::StreamWriter;
use crate::widgets::{self, RenderContext};

/// Pending render requests beyond this are dropped (signals only).
pub const QUEUE_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Tick,
    Signal,
}

pub struct Scheduler<W: Write> {
    store: Arc<MetricStore>,
    toggle: ToggleState,
    renderer: Renderer,
    writer: StreamWriter<W>,
    cycles: u64,
}

impl<W: Write> Scheduler<W> {
    pub fn new(store: Arc<MetricStore>, renderer: Renderer, writer: StreamWriter<W>) -> Self {
        Self {
            store,
            toggle: ToggleState::new(true),
            renderer,
            writer,
            cycles: 0,
        }
    }

    /// Flip the blink phase, render every widget, append the frame.
    /// Only a failing output stream is an error.
    pub fn do_render(&mut self, trigger: Trigger) -> io::Result<()> {
        let blink = self.toggle.flip();
        debug!(?trigger, cycle = self.cycles, "render");
        let ctx = RenderContext {
            store: &self.store,
            blink,
        };
        let frame = self.renderer.render_frame(&ctx);
        self.writer.write_frame(&frame)?;
        self.cycles += 1;
        Ok(())
    }

    pub fn blink(&self) -> bool {
        self.toggle.get()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn into_writer(self) -> W {
        self.writer.into_inner()
    }

    /// Serve requests until every sender is gone or the stream breaks.
    pub fn run(mut self, mut rx: mpsc::Receiver<Trigger>) -> io::Result<Self> {
        while let Some(trigger) = rx.blocking_recv() {
            self.do_render(trigger)?;
        }
        Ok(self)
    }
}

impl<W: Write + Send + 'static> Scheduler<W> {
    /// Run the consumer on its own blocking thread; widgets may shell out.
    pub fn spawn(self, rx: mpsc::Receiver<Trigger>) -> JoinHandle<io::Result<Self>> {
        tokio::task::spawn_blocking(move || self.run(rx))
    }
}

/// Post a `Tick` every `period`, starting immediately.
pub fn spawn_ticker(tx: mpsc::Sender<Trigger>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period.max(MIN_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if tx.send(Trigger::Tick).await.is_err() {
                break;
            }
        }
    })
}

/// Install the handler for SIGRTMIN+`offset`.
#[cfg(target_os = "linux")]
pub fn refresh_signal(offset: i32) -> anyhow::Result<Signal> {
    use tokio::signal::unix::{signal, SignalKind};

    let signo = match libc::SIGRTMIN().checked_add(offset) {
        Some(n) if offset >= 0 && n <= libc::SIGRTMAX() => n,
        _ => anyhow::bail!("SIGRTMIN+{offset} is not a realtime signal"),
    };
    signal(SignalKind::from_raw(signo))
        .with_context(|| format!("cannot install handler for SIGRTMIN+{offset}"))
}

#[cfg(not(target_os = "linux"))]
pub fn refresh_signal(offset: i32) -> anyhow::Result<Signal> {
    anyhow::bail!("SIGRTMIN+{offset}: realtime signals need Linux")
}

/// Forward each delivery of `sig` as a `Signal` request. Never waits on the
/// consumer: a full queue already guarantees a fresh frame is coming.
pub fn spawn_signal_listener(mut sig: Signal, tx: mpsc::Sender<Trigger>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while sig.recv().await.is_some() {
            match tx.try_send(Trigger::Signal) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => warn!("render queue full, dropping refresh signal"),
                Err(TrySendError::Closed(_)) => break,
            }
        }
    })
}

/// Start the samplers the configured widgets read from.
pub fn spawn_samplers(config: &Config, store: &Arc<MetricStore>) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();
    if config.widgets.contains(&WidgetSpec::Cpu) {
        handles.push(spawn_cpu_sampler(store, config.cpu_window));
    }
    if config.widgets.iter().any(WidgetSpec::needs_latency) {
        handles.push(spawn_latency_sampler(
            store.clone(),
            SystemPinger {
                limit: config.ping_timeout,
            },
            config.ping_period,
        ));
    }
    handles
}

/// Every task the feeder owns besides the render consumer.
pub struct Tasks {
    pub samplers: Vec<JoinHandle<()>>,
    pub ticker: JoinHandle<()>,
    pub signal: JoinHandle<()>,
}

impl Tasks {
    pub fn abort_all(&self) {
        self.ticker.abort();
        self.signal.abort();
        for s in &self.samplers {
            s.abort();
        }
    }
}

/// Run the feeder until the output stream fails. Startup failures
/// (signal handler, header write) return before any frame is written.
pub async fn run<W: Write + Send + 'static>(
    config: &Config,
    store: Arc<MetricStore>,
    out: W,
) -> anyhow::Result<()> {
    let sig = refresh_signal(config.signal_offset)?;
    let writer = StreamWriter::begin(out).context("writing protocol header")?;
    let renderer = Renderer::new(config.widgets.iter().map(widgets::build).collect());
    info!(
        widgets = renderer.len(),
        interval_ms = config.interval.as_millis() as u64,
        "feeding status bar"
    );

    let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
    let tasks = Tasks {
        samplers: spawn_samplers(config, &store),
        ticker: spawn_ticker(tx.clone(), config.interval),
        signal: spawn_signal_listener(sig, tx),
    };

    let consumer = Scheduler::new(store, renderer, writer).spawn(rx).await;
    tasks.abort_all();
    match consumer {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(e).context("writing frame"),
        Err(e) => Err(anyhow!("render thread failed: {e}")),
    }
}
