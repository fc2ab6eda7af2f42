//! CLI error types and conversions

use crate::fetcher::FetchError;
use crate::output::OutputError;
use crate::session::SessionError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Session error
    #[error("session error: {0}")]
    SessionError(#[from] SessionError),

    /// Fetch error
    #[error("fetch error: {0}")]
    FetchError(#[from] FetchError),

    /// Output error
    #[error("output error: {0}")]
    OutputError(#[from] OutputError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// One or more profiles failed or were cut short
    #[error("{failed} of {total} profile(s) did not complete")]
    RunIncomplete {
        /// Profiles that errored or were truncated
        failed: usize,
        /// Profiles attempted
        total: usize,
    },
}
