//! Samples and the aligned series they are collected into.

use chrono::NaiveDateTime;

/// X-axis label of a sample.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeLabel {
    /// Header parsed into a datetime.
    At(NaiveDateTime),
    /// Header text that did not match the expected layout.
    Raw(String),
    /// Ordinal position, used when the log has no headers at all.
    Index(usize),
}

impl std::fmt::Display for TimeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeLabel::At(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            TimeLabel::Raw(text) => f.write_str(text),
            TimeLabel::Index(i) => write!(f, "{}", i),
        }
    }
}

/// One observation ready for plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub time: TimeLabel,
    /// CPU as reported by crictl (fractional cores).
    pub cpu: f64,
    /// Memory in MB.
    pub mem_mb: f64,
}

/// Which value of a sample to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cpu,
    Memory,
}

/// Time labels, CPU values and memory values as parallel sequences.
///
/// Samples can only be appended whole, so the three sequences always have the
/// same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    times: Vec<TimeLabel>,
    cpu: Vec<f64>,
    mem_mb: Vec<f64>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: Sample) {
        self.times.push(sample.time);
        self.cpu.push(sample.cpu);
        self.mem_mb.push(sample.mem_mb);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[TimeLabel] {
        &self.times
    }

    pub fn cpu(&self) -> &[f64] {
        &self.cpu
    }

    pub fn mem_mb(&self) -> &[f64] {
        &self.mem_mb
    }

    pub fn values(&self, metric: Metric) -> &[f64] {
        match metric {
            Metric::Cpu => &self.cpu,
            Metric::Memory => &self.mem_mb,
        }
    }

    /// Returns sample `index` as an owned [`Sample`].
    pub fn get(&self, index: usize) -> Option<Sample> {
        Some(Sample {
            time: self.times.get(index)?.clone(),
            cpu: *self.cpu.get(index)?,
            mem_mb: *self.mem_mb.get(index)?,
        })
    }
}

impl FromIterator<Sample> for Series {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        let mut series = Series::new();
        for sample in iter {
            series.push(sample);
        }
        series
    }
}
