//! Login command implementation

use clap::Parser;
use tracing::info;

use crate::session::SessionManager;

use super::{analyze::Cli, CliError};

/// Arguments for the login command
#[derive(Parser, Debug)]
pub struct LoginArgs {}

impl LoginArgs {
    /// Establish a session now and persist its artifact for later runs.
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let username = cli.login_user.as_deref().ok_or_else(|| {
            CliError::InvalidArgument(
                "login requires a username (--login-user or INSTA_USERNAME)".to_string(),
            )
        })?;
        if cli.login_password.is_none() {
            let manager = SessionManager::new(&cli.session_dir);
            if !manager.artifact_path(username).exists() {
                return Err(CliError::InvalidArgument(
                    "login requires a password (--login-password or INSTA_PASSWORD)".to_string(),
                ));
            }
        }

        let manager = SessionManager::new(&cli.session_dir);
        let session = manager
            .acquire(Some(username), cli.login_password.as_deref())
            .await?;

        if session.is_authenticated() {
            info!(username, "session ready and persisted");
            println!(
                "Session for {username} is ready: {}",
                manager.artifact_path(username).display()
            );
            Ok(())
        } else {
            Err(CliError::InvalidArgument(
                "could not establish an authenticated session".to_string(),
            ))
        }
    }
}
