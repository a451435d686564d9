//! a live cpu usage bar for the terminal.
//!
//! the aggregate cpu line of `/proc/stat` is sampled every 250ms. each sample is compared to
//! the last one, and the share of that time the cpus spent busy is drawn as a vertical bar.

use {
    self::{estimator::Utilization, sentinel::Sentinel, source::ProcStatFile},
    std::io,
    tokio::sync::watch,
    tracing::info,
};

pub use self::config::Config;

pub mod config;
pub mod estimator;
pub mod meter;
pub mod sentinel;
pub mod source;
/// kernel statistics facilities.
///
/// this file provides tools to interact with `/proc/stat`.
pub mod stat;
pub mod window;

pub struct App<S = ProcStatFile> {
    sentinel: Sentinel<S>,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
    #[error("cpu sampler failed: {0}")]
    Sampler(#[from] tokio::task::JoinError),
}

/// === impl App ===

impl App {
    /// initializes a new application.
    pub fn new(config: &Config) -> Self {
        Self::with_source(ProcStatFile::at(config.stat_file.clone()))
    }
}

impl<S> App<S>
where
    S: source::StatsSource + Send + 'static,
{
    /// initializes a new application, reading statistics from the given source.
    pub fn with_source(source: S) -> Self {
        Self {
            sentinel: Sentinel::new(source),
        }
    }

    /// runs the application, until the user quits.
    pub async fn run(self) -> Result<(), Error> {
        let Self { sentinel } = self;

        let (tx, rx) = watch::channel(Utilization::ZERO);
        let sampler = tokio::spawn(sentinel::sample(sentinel, tx));
        info!(period = ?sentinel::PERIOD, "sampling cpu statistics");

        let shown = window::show(rx).await;

        // the receiver is gone now, so the sampler stops at its next tick.
        sampler.await?;
        shown
    }
}
