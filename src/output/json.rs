//! JSON and JSONL export writers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::analytics::EngagementReport;
use crate::{PostRecord, ProfileDataset};

use super::{generated_at, OutputError, OutputResult, ProfileSummary};

/// One collected post per line, full record.
pub fn write_posts_log(path: &Path, posts: &[PostRecord]) -> OutputResult<()> {
    write_jsonl(path, posts)
}

/// One `{"username": ...}` object per line.
pub fn write_username_log(path: &Path, usernames: &[String]) -> OutputResult<()> {
    #[derive(Serialize)]
    struct Entry<'a> {
        username: &'a str,
    }
    let entries: Vec<Entry> = usernames
        .iter()
        .map(|u| Entry { username: u })
        .collect();
    write_jsonl(path, &entries)
}

/// Top interacted accounts plus the run's request counters.
#[derive(Debug, Serialize)]
struct InteractionsSummary<'a> {
    username: &'a str,
    generated_at: String,
    top_mentions: Vec<(&'a str, u64)>,
    pages_failed: u32,
    total_requests: u64,
}

/// Write the interactions summary JSON for one profile.
pub fn write_interactions_summary(
    path: &Path,
    dataset: &ProfileDataset,
    report: &EngagementReport,
) -> OutputResult<()> {
    let summary = InteractionsSummary {
        username: &dataset.meta.username,
        generated_at: generated_at(),
        top_mentions: report
            .top_mentions
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect(),
        pages_failed: dataset.pages_failed,
        total_requests: dataset.requests_made,
    };
    write_pretty(path, &summary)
}

/// Profile summary as a one-element JSON record list, mirroring the CSV row.
pub fn write_profile_summary(path: &Path, summary: &ProfileSummary) -> OutputResult<()> {
    write_pretty(path, std::slice::from_ref(summary))
}

/// Comparison table as a JSON record list.
pub fn write_comparison(path: &Path, summaries: &[ProfileSummary]) -> OutputResult<()> {
    write_pretty(path, summaries)
}

fn write_jsonl<T: Serialize>(path: &Path, items: &[T]) -> OutputResult<()> {
    let file = File::create(path)
        .map_err(|e| OutputError::IoError(format!("Failed to create file: {e}")))?;
    let mut writer = BufWriter::new(file);
    for item in items {
        let line = serde_json::to_string(item)
            .map_err(|e| OutputError::JsonError(format!("Failed to serialize: {e}")))?;
        writeln!(writer, "{line}")
            .map_err(|e| OutputError::IoError(format!("Failed to write line: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| OutputError::FlushError(format!("Failed to flush: {e}")))
}

fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> OutputResult<()> {
    let body = serde_json::to_string_pretty(value)
        .map_err(|e| OutputError::JsonError(format!("Failed to serialize: {e}")))?;
    std::fs::write(path, body)
        .map_err(|e| OutputError::IoError(format!("Failed to write file: {e}")))
}
