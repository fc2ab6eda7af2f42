//! Plain-text per-profile report rendering.

use std::fmt::Write as _;
use std::path::PathBuf;

use crate::analytics::EngagementReport;
use crate::classify::ProfileTags;
use crate::{CollectionStatus, ProfileDataset};

/// Timeline entries shown at the end of the report.
const TIMELINE_TAIL: usize = 10;

/// Render the human report for one analyzed profile.
///
/// `exported` lists the files written for this profile, empty when exports
/// were disabled.
pub fn render_report(
    dataset: &ProfileDataset,
    report: &EngagementReport,
    tags: &ProfileTags,
    exported: &[PathBuf],
) -> String {
    let meta = &dataset.meta;
    let stats = &report.stats;
    let mut out = String::new();

    let _ = writeln!(out, "========================================");
    let _ = writeln!(out, "REPORT: @{}", meta.username);
    let _ = writeln!(out, "Name: {}", meta.full_name);
    let _ = writeln!(out, "========================================");
    let _ = writeln!(out, "Bio: {}", meta.biography.replace('\n', " "));
    let _ = writeln!(out, "Location (AI/heuristic): {}", tags.location);
    let _ = writeln!(out, "Category (AI/heuristic): {}", tags.category);
    let _ = writeln!(out, "----------------------------------------");
    let _ = writeln!(out, "Followers: {}", meta.followers);
    let _ = writeln!(out, "Following: {}", meta.following);
    let _ = writeln!(out, "Total posts: {}", meta.media_count);
    let _ = writeln!(out, "Verified: {}", meta.is_verified);
    let _ = writeln!(out);
    let _ = writeln!(out, "Avg likes: {:.1}", stats.avg_likes);
    let _ = writeln!(out, "Avg comments: {:.1}", stats.avg_comments);
    let _ = writeln!(out, "Avg views (videos): {:.1}", stats.avg_video_views);
    let _ = writeln!(out);
    let _ = writeln!(out, "Engagement rate: {:.3}%", stats.engagement_rate);
    let _ = writeln!(out, "Viral video share: {:.2}%", stats.viral_video_pct);
    let _ = writeln!(out, "Brand collaborations (recent): {}", stats.brand_collabs);
    let _ = writeln!(out, "Posts per week: {:.2}", stats.posts_per_week);
    let _ = writeln!(
        out,
        "Scraping date: {}",
        dataset.fetched_at.format("%Y-%m-%d")
    );
    let _ = writeln!(out, "Failed page fetches: {}", dataset.pages_failed);
    let _ = writeln!(out, "Total requests (approx): {}", dataset.requests_made);
    if let CollectionStatus::Truncated(reason) = &dataset.status {
        let _ = writeln!(out, "NOTE: collection truncated ({})", reason.describe());
    }
    let _ = writeln!(out, "========================================");

    if report.content_distribution.is_empty() {
        let _ = writeln!(out, "\nContent type distribution: no posts.");
    } else {
        let _ = writeln!(out, "\nContent type distribution (% of recent posts):");
        for (kind, pct) in &report.content_distribution {
            let _ = writeln!(out, "  - {}: {:.1}%", kind.label(), pct);
        }
    }

    if report.top_hashtags.is_empty() {
        let _ = writeln!(out, "\nTop hashtags: none detected.");
    } else {
        let _ = writeln!(out, "\nTop hashtags:");
        for (tag, count) in &report.top_hashtags {
            let _ = writeln!(out, "  #{tag}: {count} times");
        }
    }

    if report.top_mentions.is_empty() {
        let _ = writeln!(out, "\nFrequently mentioned accounts: none detected.");
    } else {
        let _ = writeln!(out, "\nFrequently mentioned accounts:");
        for (user, count) in &report.top_mentions {
            let _ = writeln!(out, "  @{user}: {count} times");
        }
    }

    if report.er_timeline.is_empty() {
        let _ = writeln!(out, "\nEngagement rate over time: no data.");
    } else {
        let _ = writeln!(out, "\nEngagement rate over time (most recent posts):");
        let tail = report
            .er_timeline
            .iter()
            .rev()
            .take(TIMELINE_TAIL)
            .collect::<Vec<_>>();
        for point in tail.into_iter().rev() {
            let _ = writeln!(
                out,
                "  {} (post #{}): {:.3}%",
                point.date.format("%Y-%m-%d"),
                point.post_index,
                point.er_percent
            );
        }
    }

    if !exported.is_empty() {
        let _ = writeln!(out, "\nExported files:");
        for path in exported {
            let _ = writeln!(out, "  - {}", path.display());
        }
    }

    out
}
