use {clap::Parser, std::path::PathBuf};

/// a live cpu usage bar for the terminal.
///
/// press `q`, `esc`, or `ctrl-c` to quit.
#[derive(Clone, Debug, Parser)]
#[command(version, about)]
pub struct Config {
    /// the kernel statistics table to sample.
    #[arg(long, value_name = "PATH", default_value = "/proc/stat")]
    pub stat_file: PathBuf,

    /// write logs to this file. `RUST_LOG` controls verbosity (default: info).
    ///
    /// the terminal is taken over by the bar, so nothing is logged without this.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
