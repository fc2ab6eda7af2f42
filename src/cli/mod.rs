//! CLI command implementations

pub mod analyze;
pub mod error;
pub mod login;

pub use analyze::{AnalyzeArgs, Cli, Commands};
pub use error::CliError;
pub use login::LoginArgs;
