//! Strict two-line record parser.
//!
//! Every record is a header followed by exactly one stats row:
//!
//! ```text
//! Timestamp: Thu Aug 28 07:07:37 AM UTC 2025
//! 3f1c2a9b8d7e  flask-bgcolor  0.51  20.18MB  167.9kB  12
//! ```
//!
//! Column 2 is CPU and column 3 is memory. A record with any bad field is
//! dropped as a whole.

use tracing::{debug, warn};

use super::parse_cpu;
use crate::memory::normalize_mb;
use crate::model::{Sample, Series, TimeLabel};
use crate::timestamp::{TimestampParseError, ZoneRule, parse_header_time, strip_header};

const CPU_COLUMN: usize = 2;
const MEM_COLUMN: usize = 3;

/// Reason a record was skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    /// First line of the pair is not a `Timestamp:` header.
    MissingHeader,
    /// Header text is not a valid `date` string.
    Timestamp(TimestampParseError),
    /// File ended after the header.
    MissingStats,
    /// Stats row is too short.
    MissingField { column: usize, found: usize },
    /// CPU column is not a number.
    InvalidCpu(String),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::MissingHeader => write!(f, "expected a 'Timestamp:' line"),
            RecordError::Timestamp(e) => write!(f, "{}", e),
            RecordError::MissingStats => write!(f, "stats line missing at end of file"),
            RecordError::MissingField { column, found } => {
                write!(f, "column {} missing, row has {} fields", column, found)
            }
            RecordError::InvalidCpu(token) => write!(f, "invalid CPU value '{}'", token),
        }
    }
}

impl std::error::Error for RecordError {}

impl From<TimestampParseError> for RecordError {
    fn from(e: TimestampParseError) -> Self {
        RecordError::Timestamp(e)
    }
}

/// Parses one header/stats pair.
pub fn parse_record(header: &str, stats: Option<&str>) -> Result<Sample, RecordError> {
    let text = strip_header(header).ok_or(RecordError::MissingHeader)?;
    let time = parse_header_time(text, ZoneRule::AnyAbbreviation)?;

    let stats = stats.ok_or(RecordError::MissingStats)?;
    let fields: Vec<&str> = stats.split_whitespace().collect();
    let field = |column: usize| {
        fields.get(column).copied().ok_or(RecordError::MissingField {
            column,
            found: fields.len(),
        })
    };

    let cpu_token = field(CPU_COLUMN)?;
    let cpu = parse_cpu(cpu_token).ok_or_else(|| RecordError::InvalidCpu(cpu_token.to_string()))?;
    let mem_mb = normalize_mb(field(MEM_COLUMN)?);

    Ok(Sample {
        time: TimeLabel::At(time),
        cpu,
        mem_mb,
    })
}

/// Parses a log laid out as consecutive header/stats pairs.
///
/// Invalid pairs are logged and skipped.
pub fn parse_strict<S: AsRef<str>>(lines: &[S]) -> Series {
    let mut series = Series::new();
    let mut skipped = 0usize;

    for (index, pair) in lines.chunks(2).enumerate() {
        let header = pair[0].as_ref();
        let stats = pair.get(1).map(AsRef::as_ref);
        match parse_record(header, stats) {
            Ok(sample) => series.push(sample),
            Err(e) => {
                skipped += 1;
                warn!("Skipping invalid record {} (line {}): {}", index + 1, index * 2 + 1, e);
            }
        }
    }

    debug!("Strict parse: {} records, {} skipped", series.len(), skipped);
    series
}
