//! Export writers for fetched profile data.
//!
//! Each analyzed profile gets its own folder under the output root with a
//! posts CSV, JSONL logs, an interactions summary, and a profile summary in
//! CSV and JSON. Multi-profile runs add a comparison table at the root.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::analytics::EngagementReport;
use crate::classify::ProfileTags;
use crate::ProfileDataset;

pub mod csv;
pub mod json;
pub mod path;

pub use path::ExportPaths;

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// JSON write error
    #[error("JSON error: {0}")]
    JsonError(String),

    /// Buffer flush error
    #[error("flush error: {0}")]
    FlushError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Generic output writer trait
pub trait OutputWriter {
    /// Flush any buffered data to disk
    fn flush(&mut self) -> OutputResult<()>;

    /// Close the writer and finalize output
    fn close(self) -> OutputResult<()>;
}

/// One row of the profile summary and comparison tables.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    /// Handle without the leading `@`.
    pub username: String,
    /// Display name.
    pub full_name: String,
    /// Bio text.
    pub bio: String,
    /// Inferred "City, Country" or "Unknown".
    pub location: String,
    /// Inferred niche.
    pub category: String,
    /// Follower count at fetch time.
    pub followers: u64,
    /// Following count at fetch time.
    pub following: u64,
    /// Lifetime post count reported by the platform.
    pub total_posts: u64,
    /// Verified badge.
    pub is_verified: bool,
    /// Mean likes over the analyzed window.
    pub avg_likes: f64,
    /// Mean comments over the analyzed window.
    pub avg_comments: f64,
    /// Mean video views over the analyzed window.
    pub avg_views: f64,
    /// Mean per-post engagement rate, percent of followers.
    pub engagement_rate: f64,
    /// Share of videos beating 3x the average video engagement.
    pub viral_percentage: f64,
    /// Posting cadence over the analyzed window.
    pub posts_per_week: f64,
    /// Posts flagged as brand collaborations.
    pub brand_collabs: u32,
    /// Date the data was fetched, `YYYY-MM-DD`.
    pub scraping_date: String,
}

impl ProfileSummary {
    /// Assemble a summary row from the dataset, its analytics, and tags.
    pub fn build(dataset: &ProfileDataset, report: &EngagementReport, tags: &ProfileTags) -> Self {
        Self {
            username: dataset.meta.username.clone(),
            full_name: dataset.meta.full_name.clone(),
            bio: dataset.meta.biography.clone(),
            location: tags.location.clone(),
            category: tags.category.clone(),
            followers: dataset.meta.followers,
            following: dataset.meta.following,
            total_posts: dataset.meta.media_count,
            is_verified: dataset.meta.is_verified,
            avg_likes: round_to(report.stats.avg_likes, 1),
            avg_comments: round_to(report.stats.avg_comments, 1),
            avg_views: round_to(report.stats.avg_video_views, 1),
            engagement_rate: round_to(report.stats.engagement_rate, 3),
            viral_percentage: round_to(report.stats.viral_video_pct, 2),
            posts_per_week: round_to(report.stats.posts_per_week, 2),
            brand_collabs: report.stats.brand_collabs,
            scraping_date: dataset.fetched_at.format("%Y-%m-%d").to_string(),
        }
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Write every per-profile artifact into `<root>/<username>/`.
///
/// Returns the paths that were written, in a stable order for reporting.
pub fn export_profile(
    root: &Path,
    dataset: &ProfileDataset,
    report: &EngagementReport,
    tags: &ProfileTags,
) -> OutputResult<Vec<PathBuf>> {
    let paths = ExportPaths::new(root, &dataset.meta.username);
    paths.ensure_dir()?;

    let mut writer = csv::CsvPostsWriter::new(&paths.posts_csv)?;
    writer.write_posts(&dataset.posts)?;
    writer.close()?;

    json::write_posts_log(&paths.posts_log, &dataset.posts)?;
    json::write_username_log(&paths.followers_log, &dataset.followers)?;
    json::write_username_log(&paths.following_log, &dataset.following)?;
    json::write_interactions_summary(&paths.interactions, dataset, report)?;

    let summary = ProfileSummary::build(dataset, report, tags);
    csv::write_profile_summary(&paths.profile_csv, &summary)?;
    json::write_profile_summary(&paths.profile_json, &summary)?;

    info!(
        username = %dataset.meta.username,
        dir = %paths.dir.display(),
        "profile exports written"
    );

    Ok(vec![
        paths.posts_csv,
        paths.posts_log,
        paths.followers_log,
        paths.following_log,
        paths.interactions,
        paths.profile_csv,
        paths.profile_json,
    ])
}

/// Write the multi-profile comparison tables at the output root.
pub fn export_comparison(root: &Path, summaries: &[ProfileSummary]) -> OutputResult<Vec<PathBuf>> {
    let csv_path = path::comparison_csv(root);
    let json_path = path::comparison_json(root);
    csv::write_comparison(&csv_path, summaries)?;
    json::write_comparison(&json_path, summaries)?;
    info!(profiles = summaries.len(), "comparison exports written");
    Ok(vec![csv_path, json_path])
}

/// Timestamp helper shared by the JSON writers.
pub(crate) fn generated_at() -> String {
    Utc::now().to_rfc3339()
}
