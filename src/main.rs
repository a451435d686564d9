//! a live cpu usage bar for the terminal.
//!
//! run with: `cpubar --log-file cpubar.log`, and `RUST_LOG=debug` for per-sample logs.

use {
    anyhow::{Context, Result},
    clap::Parser,
    cpubar::{App, Config},
    std::{fs::File, path::Path, sync::Mutex},
    tracing_subscriber::EnvFilter,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    if let Some(path) = &config.log_file {
        init_logging(path)?;
    }

    tracing::info!("cpubar v{} starting", env!("CARGO_PKG_VERSION"));

    App::new(&config).run().await?;

    tracing::info!("cpubar exiting");
    Ok(())
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("could not create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
