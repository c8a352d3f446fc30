//! ctrplot - CPU and memory charts from a strict crictl stats log.
//!
//! The log alternates a `Timestamp:` header and a single stats row:
//!
//! ```text
//! Timestamp: Thu Aug 28 07:07:37 AM UTC 2025
//! 3f1c2a9b8d7e  flask-bgcolor  0.51  20.18MB  167.9kB  12
//! ```
//!
//! Usage:
//!   ctrplot                  # read the default benchmark log
//!   ctrplot run.log          # read run.log
//!   ctrplot run.log -o out   # write cpu_plot1.png / memory_plot1.png into out/

use std::path::PathBuf;

use clap::Parser;

use ctrplot::app::{self, RunError};
use ctrplot::logging::init_logging;

/// Log file read when none is given.
const DEFAULT_LOG_FILE: &str = "benchmark_containerd_1756807937.log";

/// Plot container CPU and memory usage from a two-line-per-record log.
#[derive(Parser)]
#[command(name = "ctrplot", about = "Container CPU/memory charts from crictl stats logs", version)]
struct Args {
    /// Log file with alternating `Timestamp:` and stats lines.
    #[arg(value_name = "LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

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
    let series = app::load_strict(&args.log_file)?;
    app::log_preview(&series);
    app::render_charts(&series, &app::strict_charts(), &args.output_dir)?;
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
