//! Column layouts for locating CPU and memory in a stats row.
//!
//! `crictl stats` output is not a stable schema: some builds add a POD column
//! before CPU, others pad or reorder. Layouts are best-effort guesses tried
//! in order; the first one that yields both values wins.

use super::parse_cpu;
use crate::memory::{MemoryQuantity, normalize_mb};

/// First column that may hold a metric (0 is the container id, 1 the name).
const FIRST_METRIC_COLUMN: usize = 2;

/// CPU and memory read from one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Usage {
    pub cpu: f64,
    pub mem_mb: f64,
}

/// One way of finding the CPU and memory columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLayout {
    /// `ID NAME CPU MEM ...`: both columns must parse.
    FixedColumns,
    /// First numeric column from index 2 is CPU, the next column is memory.
    ScanForward,
}

/// Layouts in the order they are tried.
pub const DEFAULT_LAYOUTS: &[ColumnLayout] = &[ColumnLayout::FixedColumns, ColumnLayout::ScanForward];

impl ColumnLayout {
    /// Tries to read CPU and memory from `tokens`.
    pub fn locate(self, tokens: &[&str]) -> Option<Usage> {
        match self {
            ColumnLayout::FixedColumns => {
                let cpu = parse_cpu(tokens.get(FIRST_METRIC_COLUMN)?)?;
                let mem = MemoryQuantity::parse(tokens.get(FIRST_METRIC_COLUMN + 1)?).ok()?;
                Some(Usage {
                    cpu,
                    mem_mb: mem.to_mb(),
                })
            }
            ColumnLayout::ScanForward => {
                let (index, cpu) = tokens
                    .iter()
                    .enumerate()
                    .skip(FIRST_METRIC_COLUMN)
                    .find_map(|(i, t)| parse_cpu(t).map(|cpu| (i, cpu)))?;
                let mem_mb = normalize_mb(tokens.get(index + 1)?);
                Some(Usage { cpu, mem_mb })
            }
        }
    }
}

/// Runs `layouts` in order and returns the first match.
pub fn locate_usage(layouts: &[ColumnLayout], tokens: &[&str]) -> Option<Usage> {
    layouts.iter().find_map(|layout| layout.locate(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str) -> Vec<&str> {
        line.split_whitespace().collect()
    }

    #[test]
    fn test_fixed_columns() {
        let row = tokens("3f1c2a9b8d7e flask-bgcolor 0.51 20.18MB 167.9kB 12");
        let usage = ColumnLayout::FixedColumns.locate(&row).unwrap();
        assert_eq!(usage.cpu, 0.51);
        assert!((usage.mem_mb - 20.18).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_columns_rejects_bad_memory() {
        let row = tokens("3f1c flask 0.51 N/A 1kB");
        assert_eq!(ColumnLayout::FixedColumns.locate(&row), None);
        // Scanning still accepts the row, with memory degraded to zero.
        let usage = ColumnLayout::ScanForward.locate(&row).unwrap();
        assert_eq!(usage, Usage { cpu: 0.51, mem_mb: 0.0 });
    }

    #[test]
    fn test_scan_skips_pod_column() {
        let row = tokens("3f1c2a9b8d7e flask-bgcolor flask-pod-7d9f 1.5 1GB 4kB 3");
        assert_eq!(ColumnLayout::FixedColumns.locate(&row), None);
        let usage = locate_usage(DEFAULT_LAYOUTS, &row).unwrap();
        assert_eq!(usage, Usage { cpu: 1.5, mem_mb: 1024.0 });
    }

    #[test]
    fn test_scan_needs_following_column() {
        let row = tokens("3f1c flask pod 0.25");
        assert_eq!(locate_usage(DEFAULT_LAYOUTS, &row), None);
    }

    #[test]
    fn test_no_numeric_column() {
        let row = tokens("CONTAINER NAME CPU % MEM DISK INODES");
        assert_eq!(locate_usage(DEFAULT_LAYOUTS, &row), None);
    }

    #[test]
    fn test_empty_layout_list() {
        let row = tokens("id name 2 3MB");
        assert_eq!(locate_usage(&[], &row), None);
    }
}
