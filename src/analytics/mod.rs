//! Engagement analytics over a fetched dataset.
//!
//! Consumes a [`ProfileDataset`] exactly as the fetcher produced it and
//! derives profile-level statistics, top-hashtag/mention tables, the
//! content-type distribution, and a per-post engagement-rate timeline.
//! All ratios guard against zero followers, zero posts, and profiles
//! without videos.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{ContentKind, ProfileDataset};

/// Caption parsing helpers
pub mod text;

/// Number of entries kept in the top-hashtag and top-mention tables.
const TOP_N: usize = 20;

/// Engagement rate threshold multiplier for the "viral video" share:
/// a video counts as viral when its ER exceeds 3x the average video ER.
const VIRAL_MULTIPLIER: f64 = 3.0;

/// Profile-level derived metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileStats {
    /// Mean likes per fetched post
    pub avg_likes: f64,
    /// Mean comments per fetched post
    pub avg_comments: f64,
    /// Mean view count across fetched videos (0 when no videos)
    pub avg_video_views: f64,
    /// Mean per-post engagement rate, percent of followers
    pub engagement_rate: f64,
    /// Share of fetched videos whose ER exceeds 3x the video average
    pub viral_video_pct: f64,
    /// Posting cadence derived from the fetched date range
    pub posts_per_week: f64,
    /// Number of fetched posts carrying a brand-collab marker
    pub brand_collabs: u32,
}

/// One point on the engagement-rate timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErPoint {
    /// Post publication date
    pub date: DateTime<Utc>,
    /// 1-based fetch index of the post
    pub post_index: u32,
    /// Engagement rate, percent of followers
    pub er_percent: f64,
}

/// Full analytics output for one profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementReport {
    /// Profile-level metrics
    pub stats: ProfileStats,
    /// Hashtag frequency table, most frequent first, capped at 20
    pub top_hashtags: Vec<(String, u64)>,
    /// Mention frequency table, most frequent first, capped at 20
    pub top_mentions: Vec<(String, u64)>,
    /// Content-type shares in percent of fetched posts
    pub content_distribution: Vec<(ContentKind, f64)>,
    /// Per-post engagement rate ordered by publication date
    pub er_timeline: Vec<ErPoint>,
}

/// Compute the full engagement report for a dataset.
pub fn analyze(dataset: &ProfileDataset) -> EngagementReport {
    let posts = &dataset.posts;
    let n = posts.len() as f64;
    let followers = dataset.meta.followers as f64;

    let mut stats = ProfileStats {
        avg_likes: 0.0,
        avg_comments: 0.0,
        avg_video_views: 0.0,
        engagement_rate: 0.0,
        viral_video_pct: 0.0,
        posts_per_week: 0.0,
        brand_collabs: posts.iter().filter(|p| p.is_brand_collab).count() as u32,
    };

    if posts.is_empty() {
        return EngagementReport {
            stats,
            top_hashtags: Vec::new(),
            top_mentions: Vec::new(),
            content_distribution: Vec::new(),
            er_timeline: Vec::new(),
        };
    }

    stats.avg_likes = posts.iter().map(|p| p.likes as f64).sum::<f64>() / n;
    stats.avg_comments = posts.iter().map(|p| p.comments as f64).sum::<f64>() / n;

    let videos: Vec<_> = posts
        .iter()
        .filter(|p| p.content == ContentKind::Video)
        .collect();
    if !videos.is_empty() {
        stats.avg_video_views = videos
            .iter()
            .map(|p| p.video_views.unwrap_or(0) as f64)
            .sum::<f64>()
            / videos.len() as f64;
    }

    let mut er_timeline = Vec::new();
    if followers > 0.0 {
        let per_post_er: Vec<f64> = posts
            .iter()
            .map(|p| p.engagement() as f64 / followers * 100.0)
            .collect();
        stats.engagement_rate = per_post_er.iter().sum::<f64>() / n;

        if !videos.is_empty() {
            let video_ers: Vec<f64> = videos
                .iter()
                .map(|p| p.engagement() as f64 / followers * 100.0)
                .collect();
            let avg_video_er = video_ers.iter().sum::<f64>() / video_ers.len() as f64;
            let viral = video_ers
                .iter()
                .filter(|er| **er > VIRAL_MULTIPLIER * avg_video_er)
                .count();
            stats.viral_video_pct = viral as f64 / videos.len() as f64 * 100.0;
        }

        er_timeline = posts
            .iter()
            .zip(per_post_er.iter())
            .map(|(p, er)| ErPoint {
                date: p.taken_at,
                post_index: p.index,
                er_percent: *er,
            })
            .collect();
        er_timeline.sort_by_key(|p| p.date);
    }

    if posts.len() > 1 {
        let newest = posts.iter().map(|p| p.taken_at).max().unwrap_or_default();
        let oldest = posts.iter().map(|p| p.taken_at).min().unwrap_or_default();
        let days = (newest - oldest).num_days();
        if days > 0 {
            stats.posts_per_week = n / (days as f64 / 7.0);
        }
    }

    EngagementReport {
        stats,
        top_hashtags: frequency_table(posts.iter().flat_map(|p| p.hashtags.iter())),
        top_mentions: frequency_table(posts.iter().flat_map(|p| p.mentions.iter())),
        content_distribution: content_distribution(dataset),
        er_timeline,
    }
}

/// Count occurrences, sort by descending frequency (ties alphabetical for
/// deterministic output), and keep the top 20.
fn frequency_table<'a, I: Iterator<Item = &'a String>>(items: I) -> Vec<(String, u64)> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for item in items {
        *counts.entry(item.as_str()).or_insert(0) += 1;
    }
    let mut table: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    table.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    table.truncate(TOP_N);
    table
}

/// Content-type shares in percent of fetched posts, descending.
fn content_distribution(dataset: &ProfileDataset) -> Vec<(ContentKind, f64)> {
    let n = dataset.posts.len() as f64;
    if n == 0.0 {
        return Vec::new();
    }
    let mut counts: HashMap<ContentKind, u64> = HashMap::new();
    for post in &dataset.posts {
        *counts.entry(post.content).or_insert(0) += 1;
    }
    let mut dist: Vec<(ContentKind, f64)> = counts
        .into_iter()
        .map(|(kind, count)| (kind, count as f64 / n * 100.0))
        .collect();
    dist.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    dist
}
