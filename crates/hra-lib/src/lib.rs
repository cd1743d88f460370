pub mod error;
pub mod interpret;
pub mod io;
pub mod metrics;
pub mod pipeline;
pub mod plot;
pub mod signal;
pub mod smoothing;

pub use error::ParseError;
pub use metrics::*;
pub use pipeline::{analyze, analyze_with_config, AnalysisConfig, AnalysisReport};
pub use signal::*;
