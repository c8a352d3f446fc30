//! ctrplot - charts of container CPU and memory usage from crictl stats logs.
//!
//! The library holds the pipeline shared by the two binaries:
//! - `ctrplot` - strict two-line records, one container
//! - `ctrplot-agg` - several replicas per timestamp, summed by name filter
//!
//! Each run reads the whole log, parses it into a [`model::Series`] and writes
//! a CPU chart and a memory chart as PNG files.

pub mod app;
pub mod logging;
pub mod memory;
pub mod model;
pub mod parser;
pub mod reader;
pub mod render;
pub mod timestamp;
