//! Resilient fetch pipeline: error taxonomy, source trait, retry and pacing.

use crate::{PostRecord, ProfileMeta};
use async_trait::async_trait;

/// HTTP client against the platform's JSON endpoints
pub mod http;
/// Per-unit pacing and throttle hard-stop control
pub mod pacing;
/// Fetch orchestration for one profile
pub mod profile;
/// Generic exponential-backoff wrapper
pub mod retry;

/// Fetch pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure (timeout, connection refused, DNS)
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status from the platform
    #[error("platform error {status}: {message}")]
    Platform {
        /// HTTP status code
        status: u16,
        /// Response body or status text
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("parse error: {0}")]
    Parse(String),

    /// The platform issued a recognized throttle message; hard stop
    #[error("throttled by platform: {0}")]
    Throttled(String),

    /// The target profile exists but the session may not read it
    #[error("access denied for @{username}: private profile not followed by viewer")]
    AccessDenied {
        /// Target username
        username: String,
    },

    /// The target profile does not exist
    #[error("profile @{0} not found")]
    NotFound(String),

    /// Retry budget exhausted; carries the last underlying failure
    #[error("retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Total invocations performed (`max_retries + 1`)
        attempts: u32,
        /// Last underlying failure
        #[source]
        source: Box<FetchError>,
    },
}

impl FetchError {
    /// Whether the retry wrapper may spend a retry on this failure.
    ///
    /// Throttle, access, not-found and parse failures are terminal; only
    /// transport errors and 429/5xx platform responses are worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Platform { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Parse(_)
            | Self::Throttled(_)
            | Self::AccessDenied { .. }
            | Self::NotFound(_)
            | Self::RetriesExhausted { .. } => false,
        }
    }

    /// Whether this failure (directly or inside a [`Self::RetriesExhausted`])
    /// is the platform's throttle signal.
    pub fn is_throttle(&self) -> bool {
        match self {
            Self::Throttled(_) => true,
            Self::RetriesExhausted { source, .. } => source.is_throttle(),
            _ => false,
        }
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// One page of posts from the platform feed.
#[derive(Debug, Clone)]
pub struct PostPage {
    /// Posts in platform order
    pub posts: Vec<PostRecord>,
    /// Cursor for the next page, `None` when exhausted
    pub next_cursor: Option<String>,
}

/// One page of follower / following usernames.
#[derive(Debug, Clone)]
pub struct FollowPage {
    /// Usernames in platform order
    pub usernames: Vec<String>,
    /// Cursor for the next page, `None` when exhausted
    pub next_cursor: Option<String>,
}

/// Read access to the remote platform, one endpoint per method.
///
/// [`http::PlatformHttpClient`] is the production implementation; tests
/// substitute scripted sources to exercise the orchestration without a
/// network.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetch profile metadata for a username.
    async fn profile_meta(&self, username: &str) -> FetchResult<ProfileMeta>;

    /// Fetch one page of the user's post feed.
    async fn posts_page(&self, user_id: &str, cursor: Option<&str>) -> FetchResult<PostPage>;

    /// Fetch one page of the user's followers. Requires an authenticated
    /// session on the real platform.
    async fn followers_page(&self, user_id: &str, cursor: Option<&str>) -> FetchResult<FollowPage>;

    /// Fetch one page of the accounts the user follows.
    async fn following_page(&self, user_id: &str, cursor: Option<&str>) -> FetchResult<FollowPage>;
}
