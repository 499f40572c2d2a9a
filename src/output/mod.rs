//! Report writers
//!
//! Everything here consumes the walker's node stream or the finished
//! aggregates; nothing feeds back into the traversal.
//!
//! # Module Structure
//!
//! - `config` - Output configuration types
//! - `utils` - Shared helpers (tree guides, timestamps, CSV quoting)
//! - `tree` - Streaming text tree formatter
//! - `csv` - CSV export of the measurement record
//! - `summary` - Configuration and outlier summary
//! - `histogram` - Text histograms per measure
//! - `json` - JSON report
//! - `pipe` - Per-file records for piping

mod config;
mod csv;
mod histogram;
mod json;
mod pipe;
mod summary;
mod tree;
mod utils;

pub use config::{DEFAULT_NAME_WIDTH, OutputConfig};
pub use csv::write_csv;
pub use histogram::{HistogramOptions, render_histograms};
pub use json::Report;
pub use pipe::PipeWriter;
pub use summary::{SummaryWriter, Tolerance};
pub use tree::TreeFormatter;
pub use utils::format_timestamp;
