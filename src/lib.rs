//! # gramscope
//!
//! A rate-limit-friendly scraper for public social-media profile data with
//! engagement analytics and structured exports.
//!
//! The core of the crate is a resilient fetch pipeline: a strictly sequential
//! series of network calls to a throttling-prone platform, wrapped in
//! exponential backoff and deliberate pacing, that yields a consistent
//! on-disk dataset even when a run is cut short.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gramscope::fetcher::http::PlatformHttpClient;
//! use gramscope::fetcher::profile::ProfileFetcher;
//! use gramscope::session::SessionManager;
//! use gramscope::FetchLimits;
//!
//! # async fn example() -> anyhow::Result<()> {
//! // Anonymous session (public data only)
//! let manager = SessionManager::new(".gramscope");
//! let session = manager.acquire(None, None).await?;
//!
//! let source = PlatformHttpClient::new(&session)?;
//! let fetcher = ProfileFetcher::new(source);
//! let dataset = fetcher
//!     .fetch_profile("some_creator", &FetchLimits::default())
//!     .await?;
//!
//! println!("fetched {} posts", dataset.posts.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`session`] - Session acquisition and persisted artifact reuse
//! - [`fetcher`] - Retry wrapper, pacing controller, and fetch orchestration
//! - [`analytics`] - Derived engagement metrics over a fetched dataset
//! - [`classify`] - Profile categorization (remote AI with heuristic fallback)
//! - [`output`] - CSV / JSON / JSONL export writers
//! - [`cli`] - Command-line interface
//!
//! ## Resilience model
//!
//! Every network call goes through [`fetcher::retry::with_backoff`]. A
//! recognized throttle message from the platform is terminal for the whole
//! run: the pipeline stops immediately and returns whatever it has, marked
//! [`CollectionStatus::Truncated`]. Partial datasets are a valid outcome,
//! not an error.

#![warn(missing_docs)]
#![warn(clippy::all)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Derived engagement metrics
pub mod analytics;
/// CLI command implementations
pub mod cli;
/// Profile categorization (AI + heuristic fallback)
pub mod classify;
/// Shared pipeline constants
pub mod config;
/// Resilient fetch pipeline
pub mod fetcher;
/// Run metrics and optional Prometheus exporter
pub mod metrics;
/// Export writers
pub mod output;
/// Human-readable terminal report
pub mod report;
/// Session acquisition and persistence
pub mod session;
/// Graceful shutdown coordination
pub mod shutdown;

/// Content type of a fetched post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    /// Single image post
    Photo,
    /// Video or reel
    Video,
    /// Multi-media carousel
    Carousel,
    /// Anything the platform did not label recognizably
    Unknown,
}

impl ContentKind {
    /// Human-friendly label used in reports and exports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Photo => "Photo",
            Self::Video => "Video/Reel",
            Self::Carousel => "Carousel",
            Self::Unknown => "Unknown",
        }
    }

    /// Map the platform's numeric media type onto a content kind.
    pub fn from_media_type(media_type: u8) -> Self {
        match media_type {
            1 => Self::Photo,
            2 => Self::Video,
            8 => Self::Carousel,
            _ => Self::Unknown,
        }
    }
}

/// One fetched post, enriched with caption-derived fields.
///
/// Posts are kept in the exact order the platform returned them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    /// 1-based position in the fetch order
    pub index: u32,
    /// Platform shortcode identifying the post
    pub shortcode: String,
    /// Publication timestamp
    pub taken_at: DateTime<Utc>,
    /// Like count at fetch time
    pub likes: u64,
    /// Comment count at fetch time
    pub comments: u64,
    /// Content type
    pub content: ContentKind,
    /// View count, present for videos only
    pub video_views: Option<u64>,
    /// Full caption text (empty string if absent)
    pub caption: String,
    /// Lowercased hashtags extracted from the caption, without `#`
    pub hashtags: Vec<String>,
    /// Lowercased @-mentions extracted from the caption
    pub mentions: Vec<String>,
    /// Whether the caption carries a brand-collaboration marker
    pub is_brand_collab: bool,
}

impl PostRecord {
    /// Combined likes + comments, the basis of per-post engagement rate.
    pub fn engagement(&self) -> u64 {
        self.likes + self.comments
    }
}

/// Profile-level metadata as returned by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileMeta {
    /// Platform-internal numeric user id, used for paged endpoints
    pub user_id: String,
    /// Handle without the leading `@`
    pub username: String,
    /// Display name
    pub full_name: String,
    /// Biography text
    pub biography: String,
    /// Follower count
    pub followers: u64,
    /// Following count
    pub following: u64,
    /// Lifetime post count
    pub media_count: u64,
    /// Whether the account is private
    pub is_private: bool,
    /// Whether the account is verified
    pub is_verified: bool,
    /// Whether the current session follows this account
    pub followed_by_viewer: bool,
}

impl ProfileMeta {
    /// Whether the current session may read this profile's posts.
    pub fn viewer_has_access(&self) -> bool {
        !self.is_private || self.followed_by_viewer
    }
}

/// Why a collection run stopped before reaching its configured limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TruncationReason {
    /// The platform issued a recognized throttle message
    Throttled,
    /// Retry budget exhausted on a post page
    RetriesExhausted,
    /// Operator requested shutdown (Ctrl+C)
    ShutdownRequested,
}

impl TruncationReason {
    /// Short diagnostic phrase for reports and logs.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Throttled => "platform throttling detected",
            Self::RetriesExhausted => "retry budget exhausted",
            Self::ShutdownRequested => "shutdown requested",
        }
    }
}

/// Outcome of a collection run for one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionStatus {
    /// Every requested unit was fetched
    Complete,
    /// The run stopped early; the dataset holds everything gathered so far
    Truncated(TruncationReason),
}

impl CollectionStatus {
    /// Whether the run fetched everything it was asked for.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Whether this outcome should fail the run from an operator's point of
    /// view. Throttle and shutdown truncations keep their partial dataset
    /// and count as success; only an exhausted retry budget is a failure.
    pub fn is_hard_failure(&self) -> bool {
        matches!(self, Self::Truncated(TruncationReason::RetriesExhausted))
    }
}

/// Bounds on how much data one profile run may pull.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FetchLimits {
    /// Maximum number of posts to fetch
    pub max_posts: u32,
    /// Safety cap on followers and following entries each
    pub max_follow: u32,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            max_posts: config::DEFAULT_MAX_POSTS,
            max_follow: config::DEFAULT_MAX_FOLLOW,
        }
    }
}

/// Everything gathered for one profile in one run.
///
/// Handed to the analytics aggregator and the exporters as-is; posts stay in
/// platform order and may be truncated if the run hit a hard stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDataset {
    /// Profile metadata
    pub meta: ProfileMeta,
    /// Fetched posts, platform order
    pub posts: Vec<PostRecord>,
    /// Follower usernames (empty without an authenticated session)
    pub followers: Vec<String>,
    /// Following usernames (empty without an authenticated session)
    pub following: Vec<String>,
    /// Whether the run completed or was cut short, and why
    pub status: CollectionStatus,
    /// Approximate number of network requests issued
    pub requests_made: u64,
    /// Post-page fetches that failed after exhausting their retry budget
    pub pages_failed: u32,
    /// When the run finished
    pub fetched_at: DateTime<Utc>,
}
