//! Aggregating parser for logs with several replicas per header.
//!
//! Each `Timestamp:` header opens a bucket. Stats rows that pass the name
//! filter are summed into the open bucket, so a deployment with three
//! replicas yields one sample per header with the total CPU and memory.
//!
//! Headers that do not parse keep their raw text as the label. A log without
//! any header yields one sample per matching row, labelled `0, 1, 2, ...`.

use tracing::{debug, trace};

use super::layout::{ColumnLayout, DEFAULT_LAYOUTS, Usage, locate_usage};
use crate::model::{Sample, Series, TimeLabel};
use crate::timestamp::{ZoneRule, parse_header_time, strip_header};

/// Rows shorter than this are never stats rows.
const MIN_ROW_TOKENS: usize = 4;

/// Case-insensitive substring filter on container names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFilter {
    needle: String,
}

impl NameFilter {
    pub fn new(pattern: &str) -> Self {
        Self {
            needle: pattern.to_lowercase(),
        }
    }

    /// Checks the NAME column first, then the whole row.
    pub fn matches(&self, tokens: &[&str], line: &str) -> bool {
        tokens
            .get(1)
            .is_some_and(|name| name.to_lowercase().contains(&self.needle))
            || line.to_lowercase().contains(&self.needle)
    }
}

/// Row counters, reported after parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowStats {
    pub headers: usize,
    pub unparsed_headers: usize,
    pub matched_rows: usize,
    pub filtered_rows: usize,
    pub unreadable_rows: usize,
}

#[derive(Debug)]
struct Bucket {
    label: TimeLabel,
    cpu: f64,
    mem_mb: f64,
    count: usize,
}

impl Bucket {
    fn open(label: TimeLabel) -> Self {
        Self {
            label,
            cpu: 0.0,
            mem_mb: 0.0,
            count: 0,
        }
    }

    fn add(&mut self, usage: Usage) {
        self.cpu += usage.cpu;
        self.mem_mb += usage.mem_mb;
        self.count += 1;
    }

    fn into_sample(self) -> Option<Sample> {
        (self.count > 0).then_some(Sample {
            time: self.label,
            cpu: self.cpu,
            mem_mb: self.mem_mb,
        })
    }
}

/// Result of an aggregating parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub series: Series,
    /// Whether any `Timestamp:` header was seen.
    pub timestamped: bool,
    pub stats: RowStats,
}

/// Line-by-line accumulator.
///
/// Feed every line with [`feed`](Self::feed), then call
/// [`finish`](Self::finish) to flush the last bucket.
#[derive(Debug)]
pub struct Aggregator {
    filter: NameFilter,
    layouts: &'static [ColumnLayout],
    open: Option<Bucket>,
    seen_header: bool,
    series: Series,
    stats: RowStats,
}

impl Aggregator {
    pub fn new(filter: NameFilter) -> Self {
        Self {
            filter,
            layouts: DEFAULT_LAYOUTS,
            open: None,
            seen_header: false,
            series: Series::new(),
            stats: RowStats::default(),
        }
    }

    /// Replaces the column layouts tried on each row.
    pub fn with_layouts(mut self, layouts: &'static [ColumnLayout]) -> Self {
        self.layouts = layouts;
        self
    }

    /// Number of samples materialized so far.
    pub fn samples(&self) -> usize {
        self.series.len()
    }

    pub fn feed(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        if let Some(text) = strip_header(line) {
            self.open_header_bucket(text);
            return;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < MIN_ROW_TOKENS {
            trace!("Ignoring short line: {}", line);
            return;
        }

        if !self.filter.matches(&tokens, line) {
            self.stats.filtered_rows += 1;
            return;
        }

        let Some(usage) = locate_usage(self.layouts, &tokens) else {
            self.stats.unreadable_rows += 1;
            debug!("No CPU/memory columns found: {}", line);
            return;
        };

        if !self.seen_header {
            // Without headers every matching row is its own sample.
            self.close_bucket();
            self.open = Some(Bucket::open(TimeLabel::Index(self.series.len())));
        }

        if let Some(bucket) = self.open.as_mut() {
            bucket.add(usage);
            self.stats.matched_rows += 1;
        }
    }

    /// Flushes the open bucket and returns everything collected.
    pub fn finish(mut self) -> Aggregation {
        self.close_bucket();
        Aggregation {
            series: self.series,
            timestamped: self.seen_header,
            stats: self.stats,
        }
    }

    fn open_header_bucket(&mut self, text: &str) {
        self.close_bucket();
        self.seen_header = true;
        self.stats.headers += 1;

        let label = match parse_header_time(text, ZoneRule::UtcOnly) {
            Ok(time) => TimeLabel::At(time),
            Err(e) => {
                self.stats.unparsed_headers += 1;
                debug!("{}; keeping raw label", e);
                TimeLabel::Raw(text.to_string())
            }
        };
        self.open = Some(Bucket::open(label));
    }

    fn close_bucket(&mut self) {
        if let Some(sample) = self.open.take().and_then(Bucket::into_sample) {
            self.series.push(sample);
        }
    }
}

/// Folds `lines` through an [`Aggregator`].
pub fn aggregate<S: AsRef<str>>(lines: &[S], filter: &NameFilter) -> Aggregation {
    lines
        .iter()
        .fold(Aggregator::new(filter.clone()), |mut acc, line| {
            acc.feed(line.as_ref());
            acc
        })
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flask() -> NameFilter {
        NameFilter::new("flask-bgcolor")
    }

    #[test]
    fn test_sums_rows_under_one_header() {
        let lines = [
            "Timestamp: Thu Aug 28 07:07:37 AM UTC 2025",
            "CONTAINER NAME CPU % MEM DISK INODES",
            "aaa111 flask-bgcolor 0.5 100MB 12kB 4",
            "bbb222 flask-bgcolor 1.5 50MB 12kB 4",
        ];

        let result = aggregate(&lines, &flask());
        assert!(result.timestamped);
        assert_eq!(result.series.len(), 1);
        assert_eq!(result.series.cpu(), &[2.0]);
        assert_eq!(result.series.mem_mb(), &[150.0]);
        assert_eq!(result.stats.matched_rows, 2);
        assert_eq!(result.stats.filtered_rows, 1);
    }

    #[test]
    fn test_rows_without_headers_are_indexed() {
        let lines = [
            "aaa flask-bgcolor 0.1 10MB",
            "bbb flask-bgcolor 0.2 20MB",
            "",
            "ccc flask-bgcolor 0.3 30MB",
        ];

        let result = aggregate(&lines, &flask());
        assert!(!result.timestamped);
        assert_eq!(
            result.series.times(),
            &[TimeLabel::Index(0), TimeLabel::Index(1), TimeLabel::Index(2)]
        );
        assert_eq!(result.series.cpu(), &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let lines = [
            "Timestamp: Thu Aug 28 07:07:37 AM UTC 2025",
            "aaa Flask-BgColor 0.75 10MB 1kB 1",
        ];

        let result = aggregate(&lines, &flask());
        assert_eq!(result.series.cpu(), &[0.75]);

        let tokens = ["aaa", "Flask-BgColor", "0.75", "10MB"];
        assert!(flask().matches(&tokens, "aaa Flask-BgColor 0.75 10MB"));
        assert!(NameFilter::new("FLASK").matches(&tokens, ""));
    }

    #[test]
    fn test_filter_falls_back_to_whole_line() {
        let tokens = ["aaa", "web", "pod-flask-bgcolor-1", "0.2", "5MB"];
        let line = tokens.join(" ");
        assert!(flask().matches(&tokens, &line));
        assert!(!NameFilter::new("redis").matches(&tokens, &line));
    }

    #[test]
    fn test_other_containers_are_ignored() {
        let lines = [
            "Timestamp: Thu Aug 28 07:07:37 AM UTC 2025",
            "aaa flask-bgcolor 0.5 10MB",
            "bbb redis 3.0 500MB",
        ];

        let result = aggregate(&lines, &flask());
        assert_eq!(result.series.cpu(), &[0.5]);
        assert_eq!(result.series.mem_mb(), &[10.0]);
    }

    #[test]
    fn test_empty_buckets_are_dropped() {
        let lines = [
            "Timestamp: Thu Aug 28 07:07:37 AM UTC 2025",
            "bbb redis 3.0 500MB",
            "Timestamp: Thu Aug 28 07:07:47 AM UTC 2025",
            "aaa flask-bgcolor 0.5 10MB",
            "Timestamp: Thu Aug 28 07:07:57 AM UTC 2025",
        ];

        let result = aggregate(&lines, &flask());
        assert_eq!(result.stats.headers, 3);
        assert_eq!(result.series.len(), 1);
        assert_eq!(result.series.times()[0].to_string(), "2025-08-28 07:07:47");
    }

    #[test]
    fn test_unparsed_header_keeps_raw_label() {
        let lines = [
            "Timestamp: 2025-08-28T07:07:37Z",
            "aaa flask-bgcolor 0.5 10MB",
            "Timestamp: Thu Aug 28 07:07:47 AM CEST 2025",
            "aaa flask-bgcolor 0.6 11MB",
        ];

        let result = aggregate(&lines, &flask());
        assert_eq!(result.stats.unparsed_headers, 2);
        assert_eq!(
            result.series.times(),
            &[
                TimeLabel::Raw("2025-08-28T07:07:37Z".to_string()),
                TimeLabel::Raw("Thu Aug 28 07:07:47 AM CEST 2025".to_string()),
            ]
        );
    }

    #[test]
    fn test_rows_before_first_header() {
        let lines = [
            "aaa flask-bgcolor 0.1 10MB",
            "bbb flask-bgcolor 0.2 20MB",
            "Timestamp: Thu Aug 28 07:07:37 AM UTC 2025",
            "aaa flask-bgcolor 0.3 30MB",
            "bbb flask-bgcolor 0.4 40MB",
        ];

        let result = aggregate(&lines, &flask());
        assert_eq!(result.series.len(), 3);
        assert_eq!(result.series.times()[0], TimeLabel::Index(0));
        assert_eq!(result.series.times()[1], TimeLabel::Index(1));
        assert!(matches!(result.series.times()[2], TimeLabel::At(_)));
        assert!((result.series.cpu()[2] - 0.7).abs() < 1e-9);
        assert_eq!(result.series.mem_mb()[2], 70.0);
    }

    #[test]
    fn test_unreadable_rows_are_skipped() {
        let lines = [
            "Timestamp: Thu Aug 28 07:07:37 AM UTC 2025",
            "aaa flask-bgcolor n/a n/a",
            "aaa flask",
            "aaa flask-bgcolor 0.5 10MB",
        ];

        let result = aggregate(&lines, &flask());
        assert_eq!(result.stats.unreadable_rows, 1);
        assert_eq!(result.series.cpu(), &[0.5]);
    }

    #[test]
    fn test_scan_layout_only() {
        static SCAN: &[ColumnLayout] = &[ColumnLayout::ScanForward];
        let mut acc = Aggregator::new(flask()).with_layouts(SCAN);
        acc.feed("Timestamp: Thu Aug 28 07:07:37 AM UTC 2025");
        acc.feed("aaa flask-bgcolor pod-x 0.5 2GB");
        assert_eq!(acc.samples(), 0);

        let result = acc.finish();
        assert_eq!(result.series.mem_mb(), &[2048.0]);
    }

    #[test]
    fn test_no_matching_rows() {
        let lines = ["Timestamp: Thu Aug 28 07:07:37 AM UTC 2025", "bbb redis 3.0 500MB"];
        assert!(aggregate(&lines, &flask()).series.is_empty());
    }
}
