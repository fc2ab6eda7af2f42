//! Integration tests for private-profile access control

use async_trait::async_trait;
use chrono::Utc;
use gramscope::fetcher::pacing::PacingConfig;
use gramscope::fetcher::profile::ProfileFetcher;
use gramscope::fetcher::{FetchError, FetchResult, FollowPage, PostPage, ProfileSource};
use gramscope::{ContentKind, FetchLimits, PostRecord, ProfileMeta};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

struct GatedSource {
    is_private: bool,
    followed_by_viewer: bool,
    post_calls: AtomicU32,
}

#[async_trait]
impl ProfileSource for GatedSource {
    async fn profile_meta(&self, username: &str) -> FetchResult<ProfileMeta> {
        Ok(ProfileMeta {
            user_id: "55".into(),
            username: username.to_string(),
            full_name: "Gated".into(),
            biography: String::new(),
            followers: 10,
            following: 10,
            media_count: 3,
            is_private: self.is_private,
            is_verified: false,
            followed_by_viewer: self.followed_by_viewer,
        })
    }

    async fn posts_page(&self, _: &str, _: Option<&str>) -> FetchResult<PostPage> {
        self.post_calls.fetch_add(1, Ordering::SeqCst);
        Ok(PostPage {
            posts: vec![PostRecord {
                index: 0,
                shortcode: "only".into(),
                taken_at: Utc::now(),
                likes: 3,
                comments: 0,
                content: ContentKind::Photo,
                video_views: None,
                caption: String::new(),
                hashtags: vec![],
                mentions: vec![],
                is_brand_collab: false,
            }],
            next_cursor: None,
        })
    }

    async fn followers_page(&self, _: &str, _: Option<&str>) -> FetchResult<FollowPage> {
        Ok(FollowPage {
            usernames: vec![],
            next_cursor: None,
        })
    }

    async fn following_page(&self, _: &str, _: Option<&str>) -> FetchResult<FollowPage> {
        Ok(FollowPage {
            usernames: vec![],
            next_cursor: None,
        })
    }
}

fn fetcher(source: GatedSource) -> ProfileFetcher<GatedSource> {
    ProfileFetcher::new(source).with_pacing(PacingConfig {
        short_delay: Duration::from_millis(1),
        long_delay: Duration::from_millis(1),
        long_break_every: 20,
    })
}

#[tokio::test(start_paused = true)]
async fn test_private_unfollowed_profile_is_denied_before_posts() {
    let fetcher = fetcher(GatedSource {
        is_private: true,
        followed_by_viewer: false,
        post_calls: AtomicU32::new(0),
    });

    let err = fetcher
        .fetch_profile("locked", &FetchLimits::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::AccessDenied { username } if username == "locked"));
    assert_eq!(fetcher.source().post_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_private_followed_profile_is_fetched() {
    let fetcher = fetcher(GatedSource {
        is_private: true,
        followed_by_viewer: true,
        post_calls: AtomicU32::new(0),
    });

    let dataset = fetcher
        .fetch_profile("friend", &FetchLimits::default())
        .await
        .unwrap();

    assert_eq!(dataset.posts.len(), 1);
    assert!(dataset.status.is_complete());
}

#[tokio::test(start_paused = true)]
async fn test_public_profile_is_fetched() {
    let fetcher = fetcher(GatedSource {
        is_private: false,
        followed_by_viewer: false,
        post_calls: AtomicU32::new(0),
    });

    let dataset = fetcher
        .fetch_profile("open", &FetchLimits::default())
        .await
        .unwrap();

    assert_eq!(dataset.posts.len(), 1);
    assert_eq!(fetcher.source().post_calls.load(Ordering::SeqCst), 1);
}
