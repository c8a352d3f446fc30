//! Parsers turning log lines into a [`Series`](crate::model::Series).
//!
//! - [`strict`]: exactly two lines per record, one container.
//! - [`aggregate`]: any number of rows per header, summed per header for the
//!   containers selected by a name filter.

pub mod aggregate;
pub mod layout;
pub mod strict;

pub use aggregate::{Aggregation, Aggregator, NameFilter, RowStats, aggregate};
pub use layout::{ColumnLayout, DEFAULT_LAYOUTS, Usage, locate_usage};
pub use strict::{RecordError, parse_record, parse_strict};

/// Parses a CPU column.
pub(crate) fn parse_cpu(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}
