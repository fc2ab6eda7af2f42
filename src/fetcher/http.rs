//! HTTP client for the platform's JSON endpoints.
//!
//! One thin client handles every endpoint: build the request with the
//! session's identity attached, classify the response onto the
//! [`FetchError`] taxonomy, and deserialize. Retry and pacing live above
//! this layer; this module never sleeps.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::analytics::text;
use crate::config::{FOLLOW_PAGE_SIZE, POSTS_PAGE_SIZE};
use crate::fetcher::pacing::ThrottleMatcher;
use crate::fetcher::{FetchError, FetchResult, FollowPage, PostPage, ProfileSource};
use crate::metrics::RunMetrics;
use crate::session::Session;
use crate::{ContentKind, PostRecord, ProfileMeta};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

const DEFAULT_BASE_URL: &str = "https://www.instagram.com";

/// App id the platform's web client sends with profile requests.
const WEB_APP_ID: &str = "936619743392459";

/// Production [`ProfileSource`] over the platform's web JSON API.
pub struct PlatformHttpClient {
    client: Client,
    base_url: String,
    cookie_header: Option<String>,
    matcher: ThrottleMatcher,
}

impl PlatformHttpClient {
    /// Build a client carrying the session's identity.
    pub fn new(session: &Session) -> FetchResult<Self> {
        let client = Client::builder()
            .user_agent(session.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let cookie_header = match (&session.session_token, &session.csrf_token) {
            (Some(sid), Some(csrf)) => Some(format!("sessionid={sid}; csrftoken={csrf}")),
            (Some(sid), None) => Some(format!("sessionid={sid}")),
            _ => None,
        };

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie_header,
            matcher: ThrottleMatcher::default(),
        })
    }

    /// Override the platform origin (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Execute one GET and decode the JSON body.
    ///
    /// Classification: transport failures are retryable `Network` errors;
    /// a non-2xx body matching the throttle phrase is terminal `Throttled`;
    /// remaining non-2xx become `Platform { status }`. Successful bodies are
    /// never matched against the throttle phrase, so captions and bios that
    /// happen to contain it stay plain data.
    async fn get_json<T: DeserializeOwned>(
        &self,
        op: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> FetchResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(op, url = %url, "platform GET");
        RunMetrics::record_request(op);

        let mut request = self
            .client
            .get(&url)
            .query(params)
            .header("X-IG-App-ID", WEB_APP_ID);
        if let Some(cookie) = &self.cookie_header {
            request = request.header(reqwest::header::COOKIE, cookie.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(&self.matcher, status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Parse(format!("{op}: {e}")))
    }
}

/// Map a non-2xx response onto the error taxonomy.
fn classify_failure(matcher: &ThrottleMatcher, status: u16, body: &str) -> FetchError {
    if matcher.matches(body) {
        FetchError::Throttled(truncate_body(body))
    } else {
        FetchError::Platform {
            status,
            message: truncate_body(body),
        }
    }
}

/// Keep error bodies log-sized.
fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= 300 {
        return trimmed.to_string();
    }
    let mut end = 300;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}

#[async_trait]
impl ProfileSource for PlatformHttpClient {
    async fn profile_meta(&self, username: &str) -> FetchResult<ProfileMeta> {
        let response: WebProfileResponse = self
            .get_json(
                "profile_meta",
                "/api/v1/users/web_profile_info/",
                &[("username", username.to_string())],
            )
            .await
            .map_err(|e| match e {
                FetchError::Platform { status: 404, .. } => {
                    FetchError::NotFound(username.to_string())
                }
                other => other,
            })?;

        let user = response
            .data
            .user
            .ok_or_else(|| FetchError::NotFound(username.to_string()))?;

        Ok(ProfileMeta {
            user_id: user.id,
            username: user.username,
            full_name: user.full_name.unwrap_or_default(),
            biography: user.biography.unwrap_or_default(),
            followers: user.edge_followed_by.count,
            following: user.edge_follow.count,
            media_count: user.edge_owner_to_timeline_media.count,
            is_private: user.is_private,
            is_verified: user.is_verified,
            followed_by_viewer: user.followed_by_viewer,
        })
    }

    async fn posts_page(&self, user_id: &str, cursor: Option<&str>) -> FetchResult<PostPage> {
        let mut params = vec![("count", POSTS_PAGE_SIZE.to_string())];
        if let Some(cursor) = cursor {
            params.push(("max_id", cursor.to_string()));
        }
        let response: FeedResponse = self
            .get_json("posts_page", &format!("/api/v1/feed/user/{user_id}/"), &params)
            .await?;

        let posts = response.items.into_iter().map(post_from_item).collect();
        let next_cursor = response
            .more_available
            .then_some(response.next_max_id)
            .flatten();
        Ok(PostPage { posts, next_cursor })
    }

    async fn followers_page(&self, user_id: &str, cursor: Option<&str>) -> FetchResult<FollowPage> {
        self.follow_page("followers_page", user_id, "followers", cursor)
            .await
    }

    async fn following_page(&self, user_id: &str, cursor: Option<&str>) -> FetchResult<FollowPage> {
        self.follow_page("following_page", user_id, "following", cursor)
            .await
    }
}

impl PlatformHttpClient {
    async fn follow_page(
        &self,
        op: &'static str,
        user_id: &str,
        direction: &str,
        cursor: Option<&str>,
    ) -> FetchResult<FollowPage> {
        let mut params = vec![("count", FOLLOW_PAGE_SIZE.to_string())];
        if let Some(cursor) = cursor {
            params.push(("max_id", cursor.to_string()));
        }
        let response: FriendshipResponse = self
            .get_json(
                op,
                &format!("/api/v1/friendships/{user_id}/{direction}/"),
                &params,
            )
            .await?;

        Ok(FollowPage {
            usernames: response.users.into_iter().map(|u| u.username).collect(),
            next_cursor: response.next_max_id,
        })
    }
}

/// Build an enriched [`PostRecord`] from one feed item. The fetch index is
/// assigned by the orchestrator as posts are appended.
fn post_from_item(item: FeedItem) -> PostRecord {
    let caption = item.caption.map(|c| c.text).unwrap_or_default();
    let content = ContentKind::from_media_type(item.media_type);
    let taken_at = DateTime::<Utc>::from_timestamp(item.taken_at, 0).unwrap_or_else(Utc::now);

    PostRecord {
        index: 0,
        shortcode: item.code,
        taken_at,
        likes: item.like_count,
        comments: item.comment_count,
        content,
        video_views: (content == ContentKind::Video)
            .then_some(item.play_count)
            .flatten(),
        hashtags: text::extract_hashtags(&caption),
        mentions: text::extract_mentions(&caption),
        is_brand_collab: text::is_brand_collab(&caption),
        caption,
    }
}

// ---- wire types ----

#[derive(Debug, Deserialize)]
struct WebProfileResponse {
    data: WebProfileData,
}

#[derive(Debug, Deserialize)]
struct WebProfileData {
    user: Option<WebProfileUser>,
}

#[derive(Debug, Deserialize)]
struct WebProfileUser {
    id: String,
    username: String,
    full_name: Option<String>,
    biography: Option<String>,
    edge_followed_by: EdgeCount,
    edge_follow: EdgeCount,
    edge_owner_to_timeline_media: EdgeCount,
    #[serde(default)]
    is_private: bool,
    #[serde(default)]
    is_verified: bool,
    #[serde(default)]
    followed_by_viewer: bool,
}

#[derive(Debug, Deserialize)]
struct EdgeCount {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    items: Vec<FeedItem>,
    #[serde(default)]
    more_available: bool,
    #[serde(default)]
    next_max_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    code: String,
    taken_at: i64,
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    comment_count: u64,
    media_type: u8,
    #[serde(default)]
    play_count: Option<u64>,
    #[serde(default)]
    caption: Option<FeedCaption>,
}

#[derive(Debug, Deserialize)]
struct FeedCaption {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct FriendshipResponse {
    #[serde(default)]
    users: Vec<FriendshipUser>,
    #[serde(default)]
    next_max_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FriendshipUser {
    username: String,
}
