use std::path::PathBuf;
use thiserror::Error;

/// Reasons a heart-rate CSV cannot be turned into a series.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("CSV input is empty")]
    EmptyInput,
    #[error(
        "Could not find heart rate column. Expected column names like \"heart_rate\", \"hr\", \"bpm\", or \"rate\""
    )]
    MissingHeartRateColumn,
    #[error("No valid heart rate data found in CSV")]
    NoValidRows,
    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
