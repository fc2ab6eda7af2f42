//! Path layout for per-profile export folders.
//!
//! Every profile gets one folder named after the handle:
//! `<root>/<username>/<username>_posts.csv` and friends. Comparison tables
//! live at the root itself.

use std::path::{Path, PathBuf};

use super::{OutputError, OutputResult};

/// All file paths written for one profile.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    /// The per-profile folder.
    pub dir: PathBuf,
    /// Post table, one row per collected post.
    pub posts_csv: PathBuf,
    /// Post log, one JSON object per line.
    pub posts_log: PathBuf,
    /// Follower handles, one JSON object per line.
    pub followers_log: PathBuf,
    /// Following handles, one JSON object per line.
    pub following_log: PathBuf,
    /// Top mentions and request counters.
    pub interactions: PathBuf,
    /// Single-row profile summary table.
    pub profile_csv: PathBuf,
    /// The same summary as a JSON record list.
    pub profile_json: PathBuf,
}

impl ExportPaths {
    /// Lay out the export paths for `username` under `root`.
    pub fn new(root: &Path, username: &str) -> Self {
        let dir = root.join(username);
        let file = |suffix: &str| dir.join(format!("{username}_{suffix}"));
        Self {
            posts_csv: file("posts.csv"),
            posts_log: file("posts_log.jsonl"),
            followers_log: file("followers.jsonl"),
            following_log: file("following.jsonl"),
            interactions: file("interactions_summary.json"),
            profile_csv: file("profile_summary.csv"),
            profile_json: file("profile_summary.json"),
            dir,
        }
    }

    /// Create the profile folder (and any missing parents).
    pub fn ensure_dir(&self) -> OutputResult<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| OutputError::IoError(format!("Failed to create directory: {e}")))
    }
}

/// Comparison CSV path at the output root.
pub fn comparison_csv(root: &Path) -> PathBuf {
    root.join("profiles_comparison.csv")
}

/// Comparison JSON path at the output root.
pub fn comparison_json(root: &Path) -> PathBuf {
    root.join("profiles_comparison.json")
}
