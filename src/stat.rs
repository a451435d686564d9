use {
    crate::source::StatsSource,
    std::{io, ops::Not, str::FromStr},
    tracing::{debug, trace},
};

pub use self::{
    cpu_time::{CounterField, CpuTime},
    user_hz::UserHz,
};

mod cpu_time;
mod user_hz;


/// the label of the aggregate cpu line, including its padding.
const LABEL_WIDTH: usize = 4;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum EntryParseError {
    #[error("statistics are empty")]
    MissingLine,
    #[error("unrecognized entry kind: {kind}")]
    UnrecognizedEntry { kind: String },
    #[error("invalid time value: {0}")]
    UserHzParse(<UserHz as FromStr>::Err),
    #[error("expected 10 cpu times, found {found}")]
    ColumnCount { found: usize },
    #[error("cpu times overflow when summed")]
    Overflow,
}

#[derive(Debug, thiserror::Error)]
pub enum StatReadError {
    #[error("could not read statistics: {0}")]
    Io(#[from] io::Error),
    #[error("could not parse statistics: {0}")]
    Entry(#[from] EntryParseError),
}

/// reads a snapshot of the system's aggregate cpu time.
///
/// returns `None` if the statistics could not be read or parsed. this is not an error: the
/// caller simply has no sample this time around.
pub fn read(stats: &impl StatsSource) -> Option<CpuTime> {
    match try_read(stats) {
        Ok(time) => {
            trace!(%time, "read cpu statistics");
            Some(time)
        }
        Err(error) => {
            debug!(%error, "skipping cpu sample");
            None
        }
    }
}

/// reads a snapshot of the system's aggregate cpu time, reporting why it failed.
pub fn try_read(stats: &impl StatsSource) -> Result<CpuTime, StatReadError> {
    let contents = stats.read()?;
    parse(&contents).map_err(StatReadError::Entry)
}

/// parses the first line of the given statistics table.
///
/// all other lines are ignored.
pub fn parse(contents: &str) -> Result<CpuTime, EntryParseError> {
    contents
        .lines()
        .next()
        .ok_or(EntryParseError::MissingLine)?
        .parse()
}

// === impl CpuTime ===

impl FromStr for CpuTime {
    type Err = EntryParseError;
    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        let (kind, times) = split_label(entry)?;

        if kind.trim_end() != "cpu" {
            return Err(EntryParseError::UnrecognizedEntry {
                kind: kind.trim_end().to_owned(),
            });
        }

        times
            .split_whitespace()
            .map(str::parse::<UserHz>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(EntryParseError::UserHzParse)
            .and_then(CpuTime::try_from)
            .and_then(|time| match time.totals() {
                Some(_) => Ok(time),
                None => Err(EntryParseError::Overflow),
            })
    }
}

/// splits an entry into its fixed-width label, and the remainder.
fn split_label(entry: &str) -> Result<(&str, &str), EntryParseError> {
    let unrecognized = || EntryParseError::UnrecognizedEntry {
        kind: entry.split_whitespace().next().unwrap_or_default().to_owned(),
    };

    if entry.trim().is_empty() {
        return Err(EntryParseError::MissingLine);
    }

    let (kind, times) = entry
        .is_char_boundary(LABEL_WIDTH)
        .then(|| entry.split_at(LABEL_WIDTH))
        .ok_or_else(unrecognized)?;

    // the label must be separated from the times.
    if kind.ends_with(char::is_whitespace).not() {
        return Err(unrecognized());
    }

    Ok((kind, times))
}
