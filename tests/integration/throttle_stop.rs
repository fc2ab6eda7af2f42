//! Integration tests for the throttle hard-stop behavior

use async_trait::async_trait;
use chrono::Utc;
use gramscope::fetcher::pacing::{PacingConfig, THROTTLE_SIGNAL};
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
        user_id: "100".into(),
        username: "busy_account".into(),
        full_name: "Busy Account".into(),
        biography: String::new(),
        followers: 5000,
        following: 100,
        media_count: 500,
        is_private: false,
        is_verified: false,
        followed_by_viewer: false,
    }
}

fn post(n: u32) -> PostRecord {
    PostRecord {
        index: 0,
        shortcode: format!("post{n}"),
        taken_at: Utc::now(),
        likes: 10,
        comments: 1,
        content: ContentKind::Photo,
        video_views: None,
        caption: String::new(),
        hashtags: vec![],
        mentions: vec![],
        is_brand_collab: false,
    }
}

/// One post per page; the page fetch for unit `throttle_at` fails with the
/// platform throttle signal.
struct ThrottlingSource {
    throttle_at: u32,
    page_calls: AtomicU32,
}

#[async_trait]
impl ProfileSource for ThrottlingSource {
    async fn profile_meta(&self, _username: &str) -> FetchResult<ProfileMeta> {
        Ok(meta())
    }

    async fn posts_page(&self, _user_id: &str, _cursor: Option<&str>) -> FetchResult<PostPage> {
        let call = self.page_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.throttle_at {
            return Err(FetchError::Throttled(THROTTLE_SIGNAL.to_string()));
        }
        Ok(PostPage {
            posts: vec![post(call)],
            next_cursor: Some(format!("cursor{call}")),
        })
    }

    async fn followers_page(&self, _: &str, _: Option<&str>) -> FetchResult<FollowPage> {
        panic!("follow lists must not be fetched after a throttle hard stop");
    }

    async fn following_page(&self, _: &str, _: Option<&str>) -> FetchResult<FollowPage> {
        panic!("follow lists must not be fetched after a throttle hard stop");
    }
}

fn fast_pacing() -> PacingConfig {
    PacingConfig {
        short_delay: Duration::from_millis(1),
        long_delay: Duration::from_millis(2),
        long_break_every: 20,
    }
}

#[tokio::test(start_paused = true)]
async fn test_throttle_at_unit_seven_keeps_first_six_posts() {
    let source = ThrottlingSource {
        throttle_at: 7,
        page_calls: AtomicU32::new(0),
    };
    let fetcher = ProfileFetcher::new(source)
        .with_pacing(fast_pacing())
        .with_follow_lists(true);

    let dataset = fetcher
        .fetch_profile(
            "busy_account",
            &FetchLimits {
                max_posts: 50,
                max_follow: 100,
            },
        )
        .await
        .expect("partial dataset is a valid result");

    assert_eq!(dataset.posts.len(), 6);
    assert_eq!(
        dataset.status,
        CollectionStatus::Truncated(TruncationReason::Throttled)
    );
    // No further page calls after the throttle signal.
    assert_eq!(fetcher_calls(&fetcher), 7);
    assert!(dataset.followers.is_empty());
    assert!(dataset.following.is_empty());
    assert_eq!(dataset.pages_failed, 1);
}

fn fetcher_calls(fetcher: &ProfileFetcher<ThrottlingSource>) -> u32 {
    fetcher.source().page_calls.load(Ordering::SeqCst)
}

#[tokio::test(start_paused = true)]
async fn test_throttle_is_not_retried() {
    let source = ThrottlingSource {
        throttle_at: 1,
        page_calls: AtomicU32::new(0),
    };
    // A generous retry budget must not be spent on a throttle signal.
    let fetcher = ProfileFetcher::new(source)
        .with_retry_policy(RetryPolicy::new(5, Duration::from_millis(10)))
        .with_pacing(fast_pacing());

    let dataset = fetcher
        .fetch_profile("busy_account", &FetchLimits::default())
        .await
        .unwrap();

    assert!(dataset.posts.is_empty());
    assert_eq!(
        dataset.status,
        CollectionStatus::Truncated(TruncationReason::Throttled)
    );
    assert_eq!(fetcher_calls(&fetcher), 1);
}
