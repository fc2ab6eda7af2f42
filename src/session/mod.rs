//! Session acquisition and persistence.
//!
//! A [`SessionManager`] owns the on-disk session artifacts. Acquiring a
//! session for a username loads the persisted artifact when one exists
//! (zero network calls), performs a fresh login when credentials are
//! supplied, and otherwise falls back to an anonymous session limited to
//! public data. Artifacts are schema-versioned JSON, written atomically and
//! guarded by an advisory file lock so concurrent runs cannot corrupt them.

use chrono::Utc;
use fd_lock::RwLock;
use reqwest::header::SET_COOKIE;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::USER_AGENT;

/// Current session artifact schema version.
const SCHEMA_VERSION: &str = "1.0.0";

/// Maximum allowed artifact size; anything bigger is treated as corrupt.
const MAX_ARTIFACT_SIZE: u64 = 1024 * 1024;

/// Default platform origin used for login calls.
const DEFAULT_BASE_URL: &str = "https://www.instagram.com";

/// Session subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Filesystem failure while reading or writing an artifact
    #[error("session io error: {0}")]
    Io(String),

    /// Artifact could not be parsed
    #[error("corrupt session artifact: {0}")]
    Corrupt(String),

    /// Artifact was written by an incompatible version
    #[error("session schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch {
        /// Version this build writes
        expected: String,
        /// Version found on disk
        found: String,
    },

    /// Artifact exceeds the size cap
    #[error("session artifact too large: {size} bytes (max {max})")]
    ArtifactTooLarge {
        /// Observed size
        size: u64,
        /// Allowed maximum
        max: u64,
    },

    /// Could not obtain the advisory lock
    #[error("session lock error: {0}")]
    Lock(String),

    /// Transport failure during login
    #[error("network error during login: {0}")]
    Network(String),

    /// The platform rejected the credentials or challenged the login.
    /// Terminal: credential errors are never retried automatically.
    #[error("login failed for {username}: {reason}")]
    LoginFailed {
        /// Username that attempted to log in
        username: String,
        /// Platform-provided reason
        reason: String,
    },
}

/// Persisted session state, keyed by the authenticating username.
///
/// The token blob is opaque to the rest of the pipeline; only the HTTP
/// client interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionArtifact {
    schema_version: String,
    username: String,
    user_agent: String,
    csrf_token: String,
    session_token: String,
    created_at: i64,
    updated_at: i64,
}

/// An authenticated or anonymous handle to the platform.
#[derive(Debug, Clone)]
pub struct Session {
    /// Authenticated username, `None` for anonymous sessions
    pub username: Option<String>,
    /// Stable user-agent attached to every request
    pub user_agent: String,
    /// CSRF token, present for authenticated sessions
    pub csrf_token: Option<String>,
    /// Opaque session token, present for authenticated sessions
    pub session_token: Option<String>,
}

impl Session {
    /// Anonymous session capable only of public-data access.
    pub fn anonymous() -> Self {
        Self {
            username: None,
            user_agent: USER_AGENT.to_string(),
            csrf_token: None,
            session_token: None,
        }
    }

    /// Whether this session carries platform credentials.
    pub fn is_authenticated(&self) -> bool {
        self.session_token.is_some()
    }

    fn from_artifact(artifact: SessionArtifact) -> Self {
        Self {
            username: Some(artifact.username),
            user_agent: artifact.user_agent,
            csrf_token: Some(artifact.csrf_token),
            session_token: Some(artifact.session_token),
        }
    }
}

/// Shape of the platform's login response.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    authenticated: bool,
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
}

/// Owns session artifacts under one directory and hands out sessions.
pub struct SessionManager {
    session_dir: PathBuf,
    base_url: String,
}

impl SessionManager {
    /// Create a manager storing artifacts under `session_dir`.
    pub fn new<P: Into<PathBuf>>(session_dir: P) -> Self {
        Self {
            session_dir: session_dir.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the platform origin (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Path of the artifact for `username`.
    pub fn artifact_path(&self, username: &str) -> PathBuf {
        self.session_dir.join(format!("session-{username}.json"))
    }

    /// Obtain a session.
    ///
    /// Precedence: persisted artifact (no network) → fresh login when a
    /// password is supplied → anonymous. Login failures are terminal here;
    /// any retrying is the caller's decision.
    pub async fn acquire(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Session, SessionError> {
        let Some(username) = username else {
            debug!("no username configured, using anonymous session");
            return Ok(Session::anonymous());
        };

        let path = self.artifact_path(username);
        if path.exists() {
            let artifact = load_artifact(&path)?;
            info!(username, "loaded persisted session artifact");
            return Ok(Session::from_artifact(artifact));
        }

        if let Some(password) = password {
            info!(username, "no persisted session, logging in");
            let artifact = self.login(username, password).await?;
            save_artifact(&artifact, &path)?;
            info!(username, path = %path.display(), "session artifact saved");
            return Ok(Session::from_artifact(artifact));
        }

        warn!(
            username,
            "username configured but no session artifact and no password, using anonymous session"
        );
        Ok(Session::anonymous())
    }

    /// Perform the platform login call and assemble a fresh artifact.
    async fn login(&self, username: &str, password: &str) -> Result<SessionArtifact, SessionError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()
            .map_err(|e| SessionError::Network(e.to_string()))?;

        // Initial GET to pick up the CSRF cookie the login endpoint demands
        let bootstrap = client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .map_err(|e| SessionError::Network(e.to_string()))?;
        let csrf_token = cookie_value(bootstrap.headers(), "csrftoken").unwrap_or_default();

        let response = client
            .post(format!("{}/api/v1/web/accounts/login/ajax/", self.base_url))
            .header("X-CSRFToken", &csrf_token)
            .form(&[
                ("username", username),
                ("enc_password", &format!("#PWD_BROWSER:0:0:{password}")),
            ])
            .send()
            .await
            .map_err(|e| SessionError::Network(e.to_string()))?;

        let status = response.status();
        let session_token = cookie_value(response.headers(), "sessionid");
        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| SessionError::Corrupt(format!("login response: {e}")))?;

        if !status.is_success() || !body.authenticated {
            let reason = body
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("status {} ({})", status.as_u16(), body.status));
            return Err(SessionError::LoginFailed {
                username: username.to_string(),
                reason,
            });
        }

        let session_token = session_token.ok_or_else(|| SessionError::LoginFailed {
            username: username.to_string(),
            reason: "platform did not issue a session cookie".to_string(),
        })?;

        let now = Utc::now().timestamp_millis();
        Ok(SessionArtifact {
            schema_version: SCHEMA_VERSION.to_string(),
            username: username.to_string(),
            user_agent: USER_AGENT.to_string(),
            csrf_token,
            session_token,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Pull a named cookie value out of Set-Cookie headers. Headers that are
/// not valid cookie pairs are skipped, not treated as the end of the scan.
fn cookie_value(headers: &reqwest::header::HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(SET_COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        let Some(pair) = raw.split(';').next() else { continue };
        let Some((key, value)) = pair.split_once('=') else { continue };
        if key.trim() == name && !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}

/// Load and validate an artifact from disk under a shared advisory lock.
fn load_artifact(path: &Path) -> Result<SessionArtifact, SessionError> {
    let lock_file = open_lock_file(path)?;
    let lock = RwLock::new(lock_file);
    let _guard = lock
        .read()
        .map_err(|e| SessionError::Lock(e.to_string()))?;

    let metadata = std::fs::metadata(path).map_err(|e| SessionError::Io(e.to_string()))?;
    if metadata.len() > MAX_ARTIFACT_SIZE {
        return Err(SessionError::ArtifactTooLarge {
            size: metadata.len(),
            max: MAX_ARTIFACT_SIZE,
        });
    }

    let raw = std::fs::read_to_string(path).map_err(|e| SessionError::Io(e.to_string()))?;
    let artifact: SessionArtifact =
        serde_json::from_str(&raw).map_err(|e| SessionError::Corrupt(e.to_string()))?;

    if artifact.schema_version != SCHEMA_VERSION {
        return Err(SessionError::SchemaVersionMismatch {
            expected: SCHEMA_VERSION.to_string(),
            found: artifact.schema_version,
        });
    }
    Ok(artifact)
}

/// Atomically write an artifact: temp file in the same directory, fsync,
/// rename over the target, all under an exclusive advisory lock.
fn save_artifact(artifact: &SessionArtifact, path: &Path) -> Result<(), SessionError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| SessionError::Io(e.to_string()))?;
    }

    let json = serde_json::to_string_pretty(artifact)
        .map_err(|e| SessionError::Corrupt(e.to_string()))?;

    let lock_file = open_lock_file(path)?;
    let mut lock = RwLock::new(lock_file);
    let _guard = lock
        .write()
        .map_err(|e| SessionError::Lock(e.to_string()))?;

    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(parent_dir)
        .map_err(|e| SessionError::Io(format!("temp file: {e}")))?;
    temp.write_all(json.as_bytes())
        .map_err(|e| SessionError::Io(format!("temp write: {e}")))?;
    temp.flush()
        .map_err(|e| SessionError::Io(format!("temp flush: {e}")))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| SessionError::Io(format!("temp sync: {e}")))?;
    temp.persist(path)
        .map_err(|e| SessionError::Io(format!("persist: {e}")))?;

    if let Some(parent) = path.parent() {
        if let Ok(dir) = std::fs::File::open(parent) {
            let _ = dir.sync_all();
        }
    }
    Ok(())
}

fn open_lock_file(path: &Path) -> Result<std::fs::File, SessionError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| SessionError::Io(e.to_string()))?;
    }
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path.with_extension("lock"))
        .map_err(|e| SessionError::Lock(e.to_string()))
}
