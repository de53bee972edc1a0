//! Errors raised while loading input or configuring a run.

use std::{
    fmt::{self, Display},
    io,
    path::PathBuf,
};

use thiserror::Error;
use tokio::task::JoinError;

/// An error that occurred while preparing or running a simulation.
///
/// Every variant is fatal for the run. All of them are raised before any server state exists,
/// except [SimError::Replay] which can only come from the parallel driver.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SimError {
    /// The input file could not be opened.
    #[error("Unable to read input file {}: {source}", .path.display())]
    InputAccess {
        /// The path that was requested.
        path: PathBuf,
        /// What went wrong.
        #[source]
        source: io::Error,
    },

    /// The input could be opened, but reading it failed part way through.
    #[error("Unable to read input: {0}")]
    InputRead(#[from] csv::Error),

    /// A row had the right number of fields but a numeric field could not be parsed.
    #[error("Row {row}: {field} {value:?} is not a non-negative integer")]
    RowParse {
        /// 1-based row number in the input.
        row: usize,
        /// Which field was bad.
        field: Field,
        /// The raw field text.
        value: String,
    },

    /// The requested run configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A server replay task failed to complete.
    #[error("Server replay task failed: {0}")]
    Replay(#[from] JoinError),
}

/// The numeric fields of an input row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The first column.
    Timestamp,
    /// The third column.
    ServiceDuration,
}

impl Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Timestamp => "timestamp",
            Field::ServiceDuration => "process time",
        })
    }
}

/// Result of loading or configuring a simulation.
pub type SimResult<T> = std::result::Result<T, SimError>;
