//! Pipeline configuration constants

use std::time::Duration;

/// Default maximum number of retries for a failed fetch call.
/// 3 retries with exponential backoff recovers from transient network issues
/// without hammering a platform that is already pushing back.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);

/// Hard cap on any single backoff sleep. Unreachable with the CLI-bounded
/// retry range and default base delay; guards pathological configurations.
pub const MAX_BACKOFF: Duration = Duration::from_secs(300);

/// Short pause applied after every fetched post.
/// 2 seconds keeps the request cadence well under the platform's
/// abuse-detection thresholds for anonymous sessions.
pub const DEFAULT_SHORT_DELAY: Duration = Duration::from_secs(2);

/// Long pause applied every [`DEFAULT_LONG_BREAK_EVERY`] posts,
/// 3x the short delay as in the original cadence.
pub const DEFAULT_LONG_DELAY: Duration = Duration::from_secs(6);

/// Number of posts between long breaks.
pub const DEFAULT_LONG_BREAK_EVERY: u32 = 20;

/// Default number of posts fetched per profile.
pub const DEFAULT_MAX_POSTS: u32 = 30;

/// Default safety cap on followers / following entries fetched.
pub const DEFAULT_MAX_FOLLOW: u32 = 500;

/// Number of posts requested per feed page.
pub const POSTS_PAGE_SIZE: u32 = 12;

/// Number of entries requested per followers / following page.
pub const FOLLOW_PAGE_SIZE: u32 = 50;

/// Flush the posts CSV writer every N records.
pub const CSV_FLUSH_INTERVAL: u64 = 100;

/// Browser user-agent attached to every session so request identity stays
/// consistent across runs.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Calculate the exponential backoff delay before retry `attempt` (1-based):
/// `base * 2^(attempt-1)`, capped at [`MAX_BACKOFF`].
pub fn calculate_backoff(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.saturating_mul(factor).min(MAX_BACKOFF)
}
