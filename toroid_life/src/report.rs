// report.rs - Per-generation timings and their textual reports

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Elapsed evolve time of every advanced generation, in order. Append-only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRecord {
    durations: Vec<Duration>,
}

impl GenerationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, elapsed: Duration) {
        self.durations.push(elapsed);
    }

    pub fn durations(&self) -> &[Duration] {
        &self.durations
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn total(&self) -> Duration {
        self.durations.iter().sum()
    }
}

/// One `N ms` line per generation followed by the total.
pub fn write_summary<W: Write>(record: &GenerationRecord, mut out: W) -> io::Result<()> {
    for d in record.durations() {
        writeln!(out, "{} ms", d.as_millis())?;
    }
    writeln!(out, "The simulation took in total {} ms", record.total().as_millis())
}

/// Appends the record to `path`, one `N ms` line per generation and a blank separator line.
pub fn append_record(record: &GenerationRecord, path: impl AsRef<Path>) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for d in record.durations() {
        writeln!(file, "{} ms", d.as_millis())?;
    }
    writeln!(file)
}
