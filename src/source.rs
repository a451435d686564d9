use std::{
    cell::RefCell,
    collections::VecDeque,
    fs, io,
    path::{Path, PathBuf},
};

/// a source of kernel statistics.
pub trait StatsSource {
    /// returns the full contents of the statistics table.
    ///
    /// this is read in one shot, a partial read is an error.
    fn read(&self) -> io::Result<String>;
}

/// stats backed by `/proc/stat`, or a file in the same format.
#[derive(Clone, Debug)]
pub struct ProcStatFile {
    path: PathBuf,
}

/// a mock stat source.
#[derive(Debug, Default)]
#[allow(dead_code, reason = "this is a testing utility.")]
pub struct MockStatFile {
    stats: RefCell<VecDeque<String>>,
}

// === impl ProcStatFile ===

impl ProcStatFile {
    pub const STAT: &str = "/proc/stat";

    /// returns a source backed by the file at the given path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ProcStatFile {
    fn default() -> Self {
        Self::at(Self::STAT)
    }
}

impl StatsSource for ProcStatFile {
    fn read(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }
}

// === impl MockStatFile ===

impl MockStatFile {
    /// returns a source that will yield each of the given tables, in order.
    pub fn new<I>(stats: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let stats = stats.into_iter().map(Into::into).collect();
        Self {
            stats: RefCell::new(stats),
        }
    }

    /// queues another table to be read.
    pub fn push(&self, stat: impl Into<String>) {
        let Self { stats } = self;
        stats.borrow_mut().push_back(stat.into());
    }
}

impl StatsSource for MockStatFile {
    fn read(&self) -> io::Result<String> {
        let Self { stats } = self;

        stats
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "mock stats are empty"))
    }
}
