//! Read, parse and render pipelines behind the two binaries.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::model::{Metric, Series};
use crate::parser::{Aggregation, NameFilter, aggregate, parse_strict};
use crate::reader::{LoadError, read_lines};
use crate::render::{CPU_COLOR, ChartSpec, MEMORY_COLOR, RenderError, render_chart};

/// Exit status for every fatal error.
pub const EXIT_FAILURE: i32 = 1;

/// Number of samples echoed after parsing.
const PREVIEW_SAMPLES: usize = 3;

/// Fatal errors of a run.
#[derive(Debug)]
pub enum RunError {
    /// Log file missing or unreadable.
    Load(LoadError),
    /// Parsing finished without a single sample.
    Empty { hint: &'static str },
    /// A chart could not be written.
    Render(RenderError),
}

impl RunError {
    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Load(e) => write!(f, "{}", e),
            RunError::Empty { hint } => write!(f, "No data parsed. {}", hint),
            RunError::Render(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Load(e) => Some(e),
            RunError::Empty { .. } => None,
            RunError::Render(e) => Some(e),
        }
    }
}

impl From<LoadError> for RunError {
    fn from(e: LoadError) -> Self {
        RunError::Load(e)
    }
}

impl From<RenderError> for RunError {
    fn from(e: RenderError) -> Self {
        RunError::Render(e)
    }
}

/// Exit status for a command-line parse error.
///
/// `--help` and `--version` exit with 0, every real error with [`EXIT_FAILURE`].
pub fn cli_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() { EXIT_FAILURE } else { 0 }
}

/// Parses command-line arguments, exiting with [`cli_exit_code`] on failure.
pub fn parse_args<P: clap::Parser>() -> P {
    P::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        std::process::exit(cli_exit_code(&e));
    })
}

/// Loads a strict two-line log.
pub fn load_strict(path: &Path) -> Result<Series, RunError> {
    let lines = read_lines(path)?;
    let series = parse_strict(&lines);
    if series.is_empty() {
        return Err(RunError::Empty {
            hint: "Check your log format.",
        });
    }
    info!("Parsed entries: {}", series.len());
    Ok(series)
}

/// Loads an aggregating log, keeping rows accepted by `filter`.
pub fn load_aggregate(path: &Path, filter: &NameFilter) -> Result<Aggregation, RunError> {
    let lines = read_lines(path)?;
    let result = aggregate(&lines, filter);
    let stats = &result.stats;
    info!(
        "Scanned {} lines: {} headers ({} unparsed), {} matching rows, {} filtered, {} unreadable",
        lines.len(),
        stats.headers,
        stats.unparsed_headers,
        stats.matched_rows,
        stats.filtered_rows,
        stats.unreadable_rows
    );
    if result.series.is_empty() {
        return Err(RunError::Empty {
            hint: "Check your log content or filters.",
        });
    }
    info!("Aggregated samples: {}", result.series.len());
    Ok(result)
}

/// Logs the first few samples.
pub fn log_preview(series: &Series) {
    for sample in (0..series.len().min(PREVIEW_SAMPLES)).filter_map(|i| series.get(i)) {
        info!(
            "  Time: {}, CPU: {}, Mem: {:.2} MB",
            sample.time, sample.cpu, sample.mem_mb
        );
    }
}

/// Charts written by `ctrplot`.
pub fn strict_charts() -> Vec<ChartSpec> {
    vec![
        ChartSpec {
            file_name: "cpu_plot1.png",
            metric: Metric::Cpu,
            title: "Container CPU Usage Over Time".to_string(),
            x_desc: "Time".to_string(),
            y_desc: "CPU Usage (cores)".to_string(),
            legend: "CPU Usage (cores)".to_string(),
            color: CPU_COLOR,
        },
        ChartSpec {
            file_name: "memory_plot1.png",
            metric: Metric::Memory,
            title: "Container Memory Usage Over Time".to_string(),
            x_desc: "Time".to_string(),
            y_desc: "Memory Usage (MB)".to_string(),
            legend: "Memory Usage (MB)".to_string(),
            color: MEMORY_COLOR,
        },
    ]
}

/// Charts written by `ctrplot-agg`.
pub fn aggregate_charts(filter: &str, timestamped: bool) -> Vec<ChartSpec> {
    let x_desc = if timestamped { "Time" } else { "Sample #" };
    vec![
        ChartSpec {
            file_name: "cpu_total1.png",
            metric: Metric::Cpu,
            title: "Aggregated Container CPU Over Time".to_string(),
            x_desc: x_desc.to_string(),
            y_desc: "CPU (crictl units)".to_string(),
            legend: format!("Total CPU ({})", filter),
            color: CPU_COLOR,
        },
        ChartSpec {
            file_name: "mem_total1.png",
            metric: Metric::Memory,
            title: "Aggregated Container Memory Over Time".to_string(),
            x_desc: x_desc.to_string(),
            y_desc: "Memory (MB)".to_string(),
            legend: format!("Total Memory MB ({})", filter),
            color: MEMORY_COLOR,
        },
    ]
}

/// Writes every chart into `out_dir`, creating it if needed.
pub fn render_charts(
    series: &Series,
    charts: &[ChartSpec],
    out_dir: &Path,
) -> Result<Vec<PathBuf>, RunError> {
    fs::create_dir_all(out_dir).map_err(|e| RenderError {
        path: out_dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut written = Vec::with_capacity(charts.len());
    for spec in charts {
        let path = out_dir.join(spec.file_name);
        render_chart(&path, spec, series)?;
        info!("Saved {}", path.display());
        written.push(path);
    }
    Ok(written)
}
