//! Fetch orchestration for one profile.
//!
//! Drives the sequence metadata → paced post loop → follower/following
//! lists, with every network call wrapped in the retry/backoff layer and
//! the pacing controller consulted after each post. A recognized throttle
//! signal ends the run immediately; whatever was gathered so far is
//! returned as a valid, truncated dataset.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::fetcher::pacing::{PacingConfig, PacingController};
use crate::fetcher::retry::{with_backoff, RetryPolicy};
use crate::fetcher::{FetchError, FetchResult, ProfileSource};
use crate::metrics::RunMetrics;
use crate::shutdown::StopSignal;
use crate::{CollectionStatus, FetchLimits, ProfileDataset, TruncationReason};

/// Callback invoked after each collected post: `(collected, target)`.
pub type PostProgressFn = Box<dyn Fn(u32, u32) + Send + Sync>;

/// Orchestrates the strictly sequential fetch pipeline for one profile at a
/// time. All calls go through one logical thread of control; nothing here
/// runs concurrently by construction.
pub struct ProfileFetcher<S: ProfileSource> {
    source: S,
    retry: RetryPolicy,
    pacing: PacingConfig,
    fetch_follow_lists: bool,
    stop: Option<StopSignal>,
    on_post: Option<PostProgressFn>,
}

impl<S: ProfileSource> ProfileFetcher<S> {
    /// Create a fetcher over `source` with default retry and pacing.
    pub fn new(source: S) -> Self {
        Self {
            source,
            retry: RetryPolicy::default(),
            pacing: PacingConfig::default(),
            fetch_follow_lists: false,
            stop: None,
            on_post: None,
        }
    }

    /// Set the retry policy for every network call.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the pacing configuration for the post loop.
    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }

    /// Enable follower/following collection (needs an authenticated session
    /// on the real platform).
    pub fn with_follow_lists(mut self, enabled: bool) -> Self {
        self.fetch_follow_lists = enabled;
        self
    }

    /// Attach a stop signal polled between units.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Attach a per-post progress callback.
    pub fn with_post_progress(mut self, on_post: PostProgressFn) -> Self {
        self.on_post = Some(on_post);
        self
    }

    /// Borrow the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    fn stop_requested(&self) -> bool {
        self.stop.as_ref().is_some_and(StopSignal::is_triggered)
    }

    /// Fetch everything `limits` allows for `username`.
    ///
    /// Profile-level failures (unknown profile, private profile without
    /// access, metadata retry exhaustion) are errors. Once the post loop has
    /// started, hard stops degrade to a truncated dataset instead.
    pub async fn fetch_profile(
        &self,
        username: &str,
        limits: &FetchLimits,
    ) -> FetchResult<ProfileDataset> {
        info!(username, max_posts = limits.max_posts, "starting profile fetch");

        let source = &self.source;
        let meta = with_backoff(&self.retry, "profile_meta", || {
            source.profile_meta(username)
        })
        .await?;
        let mut requests_made: u64 = 1;

        if !meta.viewer_has_access() {
            return Err(FetchError::AccessDenied {
                username: meta.username,
            });
        }

        info!(
            username = %meta.username,
            followers = meta.followers,
            media_count = meta.media_count,
            "profile loaded"
        );

        let mut pacing = PacingController::new(self.pacing);
        let mut posts = Vec::new();
        let mut status = CollectionStatus::Complete;
        let mut pages_failed: u32 = 0;
        let mut cursor: Option<String> = None;

        'feed: while (posts.len() as u32) < limits.max_posts {
            if self.stop_requested() {
                warn!("shutdown requested, stopping post collection");
                status = CollectionStatus::Truncated(TruncationReason::ShutdownRequested);
                break;
            }

            let user_id = meta.user_id.as_str();
            let cursor_ref = cursor.as_deref();
            let page = with_backoff(&self.retry, "posts_page", || {
                source.posts_page(user_id, cursor_ref)
            })
            .await;
            requests_made += 1;

            let page = match page {
                Ok(page) => page,
                Err(err) => {
                    pages_failed += 1;
                    if pacing.observe_failure(&err) {
                        RunMetrics::record_throttle();
                        warn!(error = %err, "throttle signal, hard stop with partial dataset");
                        status = CollectionStatus::Truncated(TruncationReason::Throttled);
                    } else {
                        warn!(error = %err, "post page failed, stopping with partial dataset");
                        status = CollectionStatus::Truncated(TruncationReason::RetriesExhausted);
                    }
                    break;
                }
            };

            if page.posts.is_empty() {
                debug!("feed exhausted by platform");
                break;
            }

            for mut post in page.posts {
                post.index = posts.len() as u32 + 1;
                posts.push(post);
                RunMetrics::record_posts(1);
                if let Some(on_post) = &self.on_post {
                    on_post(posts.len() as u32, limits.max_posts);
                }
                if posts.len() as u32 >= limits.max_posts {
                    break 'feed;
                }

                pacing.pace().await;

                if self.stop_requested() {
                    warn!("shutdown requested, stopping post collection");
                    status = CollectionStatus::Truncated(TruncationReason::ShutdownRequested);
                    break 'feed;
                }
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        let mut followers = Vec::new();
        let mut following = Vec::new();
        let hard_stopped = pacing.is_stopped()
            || matches!(
                status,
                CollectionStatus::Truncated(TruncationReason::ShutdownRequested)
            );

        if self.fetch_follow_lists && !hard_stopped {
            let (list, calls, err) = self
                .collect_follow_list(&meta.user_id, limits.max_follow, Direction::Followers)
                .await;
            followers = list;
            requests_made += calls;
            if let Some(err) = check_follow_error(err, &mut pacing, &mut status) {
                warn!(error = %err, "follower collection ended early");
            }
        }
        if self.fetch_follow_lists && !pacing.is_stopped() && !hard_stopped {
            let (list, calls, err) = self
                .collect_follow_list(&meta.user_id, limits.max_follow, Direction::Following)
                .await;
            following = list;
            requests_made += calls;
            if let Some(err) = check_follow_error(err, &mut pacing, &mut status) {
                warn!(error = %err, "following collection ended early");
            }
        }

        info!(
            username = %meta.username,
            posts = posts.len(),
            followers = followers.len(),
            following = following.len(),
            complete = status.is_complete(),
            "profile fetch finished"
        );

        Ok(ProfileDataset {
            meta,
            posts,
            followers,
            following,
            status,
            requests_made,
            pages_failed,
            fetched_at: Utc::now(),
        })
    }

    /// Page through one follow direction up to `cap` entries. Returns the
    /// entries gathered, the number of settled calls, and the error that
    /// ended the loop early, if any.
    async fn collect_follow_list(
        &self,
        user_id: &str,
        cap: u32,
        direction: Direction,
    ) -> (Vec<String>, u64, Option<FetchError>) {
        let mut entries: Vec<String> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut calls: u64 = 0;

        loop {
            let cursor_ref = cursor.as_deref();
            let source = &self.source;
            let page = match direction {
                Direction::Followers => {
                    with_backoff(&self.retry, "followers_page", || {
                        source.followers_page(user_id, cursor_ref)
                    })
                    .await
                }
                Direction::Following => {
                    with_backoff(&self.retry, "following_page", || {
                        source.following_page(user_id, cursor_ref)
                    })
                    .await
                }
            };
            calls += 1;

            let page = match page {
                Ok(page) => page,
                Err(err) => return (entries, calls, Some(err)),
            };
            if page.usernames.is_empty() {
                return (entries, calls, None);
            }

            for username in page.usernames {
                entries.push(username);
                if entries.len() as u32 >= cap {
                    debug!(?direction, cap, "follow cap reached");
                    return (entries, calls, None);
                }
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => return (entries, calls, None),
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Followers,
    Following,
}

/// Fold a follow-list error into the run status: throttles hard-stop the
/// run, anything else is logged and tolerated.
fn check_follow_error(
    err: Option<FetchError>,
    pacing: &mut PacingController,
    status: &mut CollectionStatus,
) -> Option<FetchError> {
    let err = err?;
    if pacing.observe_failure(&err) && status.is_complete() {
        RunMetrics::record_throttle();
        *status = CollectionStatus::Truncated(TruncationReason::Throttled);
    }
    Some(err)
}
