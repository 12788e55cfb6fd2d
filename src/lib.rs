//! Normalizes judicial-asset token extracts into a typed table, derives
//! per-row metrics and computes the dashboard indicators.

pub mod config;
pub mod error;
pub mod indicators;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod schema;
pub mod source;

pub use config::{AppConfig, PipelineOptions};
pub use error::PipelineError;
pub use indicators::{compute_indicators, Indicators};
pub use output::DashboardPayload;
pub use pipeline::{run_from_source, run_pipeline, Clock, FixedClock, SystemClock};
