//! pistatus entry point: parse args, install logging, feed stdout.

use std::env;
use std::io;
use std::sync::Arc;

use pistatus::config::{parse_args, Invocation};
use pistatus::scheduler;
use pistatus::state::MetricStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the bar protocol; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = match parse_args(env::args())? {
        Invocation::Help(text) => {
            println!("{text}");
            return Ok(());
        }
        Invocation::Run(config) => config,
    };

    scheduler::run(&config, Arc::new(MetricStore::new()), io::stdout()).await
}
