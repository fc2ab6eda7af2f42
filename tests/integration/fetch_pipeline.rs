//! Integration tests for retry behavior and follow-list collection

use async_trait::async_trait;
use chrono::Utc;
use gramscope::fetcher::pacing::PacingConfig;
use gramscope::fetcher::profile::ProfileFetcher;
use gramscope::fetcher::retry::RetryPolicy;
use gramscope::fetcher::{FetchError, FetchResult, FollowPage, PostPage, ProfileSource};
use gramscope::{
    CollectionStatus, ContentKind, FetchLimits, PostRecord, ProfileMeta, TruncationReason,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

fn meta() -> ProfileMeta {
    ProfileMeta {
        user_id: "9".into(),
        username: "steady".into(),
        full_name: "Steady".into(),
        biography: String::new(),
        followers: 200,
        following: 20,
        media_count: 40,
        is_private: false,
        is_verified: false,
        followed_by_viewer: false,
    }
}

fn post(n: u32) -> PostRecord {
    PostRecord {
        index: 0,
        shortcode: format!("s{n}"),
        taken_at: Utc::now(),
        likes: 5,
        comments: 1,
        content: ContentKind::Photo,
        video_views: None,
        caption: String::new(),
        hashtags: vec![],
        mentions: vec![],
        is_brand_collab: false,
    }
}

fn fast_pacing() -> PacingConfig {
    PacingConfig {
        short_delay: Duration::from_millis(1),
        long_delay: Duration::from_millis(2),
        long_break_every: 20,
    }
}

/// First `flaky_failures` calls to the first page fail with transient
/// network errors, then a single page of posts succeeds.
struct FlakySource {
    flaky_failures: u32,
    page_attempts: AtomicU32,
}

#[async_trait]
impl ProfileSource for FlakySource {
    async fn profile_meta(&self, _: &str) -> FetchResult<ProfileMeta> {
        Ok(meta())
    }

    async fn posts_page(&self, _: &str, _: Option<&str>) -> FetchResult<PostPage> {
        let attempt = self.page_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.flaky_failures {
            return Err(FetchError::Network("connection reset".into()));
        }
        Ok(PostPage {
            posts: vec![post(1), post(2)],
            next_cursor: None,
        })
    }

    async fn followers_page(&self, _: &str, _: Option<&str>) -> FetchResult<FollowPage> {
        unreachable!()
    }

    async fn following_page(&self, _: &str, _: Option<&str>) -> FetchResult<FollowPage> {
        unreachable!()
    }
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_are_retried_through() {
    let fetcher = ProfileFetcher::new(FlakySource {
        flaky_failures: 2,
        page_attempts: AtomicU32::new(0),
    })
    .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(10)))
    .with_pacing(fast_pacing());

    let dataset = fetcher
        .fetch_profile("steady", &FetchLimits::default())
        .await
        .unwrap();

    assert_eq!(dataset.posts.len(), 2);
    assert!(dataset.status.is_complete());
    assert_eq!(dataset.pages_failed, 0);
    // Two failed attempts plus the success.
    assert_eq!(fetcher.source().page_attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_truncate_but_keep_nothing_lost() {
    let fetcher = ProfileFetcher::new(FlakySource {
        flaky_failures: u32::MAX,
        page_attempts: AtomicU32::new(0),
    })
    .with_retry_policy(RetryPolicy::new(2, Duration::from_millis(10)))
    .with_pacing(fast_pacing());

    let dataset = fetcher
        .fetch_profile("steady", &FetchLimits::default())
        .await
        .unwrap();

    assert!(dataset.posts.is_empty());
    assert_eq!(
        dataset.status,
        CollectionStatus::Truncated(TruncationReason::RetriesExhausted)
    );
    assert_eq!(dataset.pages_failed, 1);
    // max_retries + 1 invocations.
    assert_eq!(fetcher.source().page_attempts.load(Ordering::SeqCst), 3);
}

/// Serves paged follow lists and a single post page.
struct FollowSource {
    follower_count: u32,
    page_size: u32,
}

#[async_trait]
impl ProfileSource for FollowSource {
    async fn profile_meta(&self, _: &str) -> FetchResult<ProfileMeta> {
        Ok(meta())
    }

    async fn posts_page(&self, _: &str, _: Option<&str>) -> FetchResult<PostPage> {
        Ok(PostPage {
            posts: vec![post(1)],
            next_cursor: None,
        })
    }

    async fn followers_page(&self, _: &str, cursor: Option<&str>) -> FetchResult<FollowPage> {
        let start: u32 = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
        let end = (start + self.page_size).min(self.follower_count);
        let usernames = (start..end).map(|i| format!("fan{i}")).collect();
        let next_cursor = (end < self.follower_count).then(|| end.to_string());
        Ok(FollowPage {
            usernames,
            next_cursor,
        })
    }

    async fn following_page(&self, _: &str, _: Option<&str>) -> FetchResult<FollowPage> {
        Ok(FollowPage {
            usernames: vec!["mutual".to_string()],
            next_cursor: None,
        })
    }
}

#[tokio::test(start_paused = true)]
async fn test_follow_lists_respect_the_cap() {
    let fetcher = ProfileFetcher::new(FollowSource {
        follower_count: 500,
        page_size: 50,
    })
    .with_pacing(fast_pacing())
    .with_follow_lists(true);

    let dataset = fetcher
        .fetch_profile(
            "steady",
            &FetchLimits {
                max_posts: 5,
                max_follow: 120,
            },
        )
        .await
        .unwrap();

    assert_eq!(dataset.followers.len(), 120);
    assert_eq!(dataset.following, vec!["mutual".to_string()]);
    assert!(dataset.status.is_complete());
}

#[tokio::test(start_paused = true)]
async fn test_follow_lists_skipped_when_disabled() {
    let fetcher = ProfileFetcher::new(FollowSource {
        follower_count: 10,
        page_size: 5,
    })
    .with_pacing(fast_pacing());

    let dataset = fetcher
        .fetch_profile("steady", &FetchLimits::default())
        .await
        .unwrap();

    assert!(dataset.followers.is_empty());
    assert!(dataset.following.is_empty());
}
