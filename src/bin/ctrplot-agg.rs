//! ctrplot-agg - aggregated CPU and memory charts across container replicas.
//!
//! Every `Timestamp:` header starts a new sample; stats rows below it whose
//! container name contains NAME_FILTER (case-insensitive) are summed.
//! Logs without headers get one sample per matching row.
//!
//! Usage:
//!   ctrplot-agg                          # default log, filter "flask-bgcolor"
//!   ctrplot-agg run.log                  # custom log, default filter
//!   ctrplot-agg run.log nginx -o charts  # custom log and filter, output dir

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use ctrplot::app::{self, RunError};
use ctrplot::logging::init_logging;
use ctrplot::parser::NameFilter;

/// Log file read when none is given.
const DEFAULT_LOG_FILE: &str = "benchmark_containerd_1756888754.log";

/// Container name filter used when none is given.
const DEFAULT_NAME_FILTER: &str = "flask-bgcolor";

/// Plot total CPU and memory of matching containers per timestamp.
#[derive(Parser)]
#[command(
    name = "ctrplot-agg",
    about = "Aggregated container CPU/memory charts from crictl stats logs",
    version
)]
struct Args {
    /// Log file with `Timestamp:` headers and crictl stats rows.
    #[arg(value_name = "LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Case-insensitive substring of the container names to sum.
    #[arg(value_name = "NAME_FILTER", default_value = DEFAULT_NAME_FILTER)]
    name_filter: String,

    /// Directory the PNG charts are written to.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

fn run(args: &Args) -> Result<(), RunError> {
    debug!(
        "Config: log={}, filter={}, output={}",
        args.log_file.display(),
        args.name_filter,
        args.output_dir.display()
    );

    let filter = NameFilter::new(&args.name_filter);
    let result = app::load_aggregate(&args.log_file, &filter)?;
    app::log_preview(&result.series);

    let charts = app::aggregate_charts(&args.name_filter, result.timestamped);
    app::render_charts(&result.series, &charts, &args.output_dir)?;
    Ok(())
}

fn main() {
    let args: Args = app::parse_args();
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
