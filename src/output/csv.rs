//! CSV output writer implementation

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use csv::Writer;
use serde::Serialize;
use tracing::{debug, info};

use super::{OutputError, OutputResult, OutputWriter, ProfileSummary};
use crate::config::CSV_FLUSH_INTERVAL;
use crate::PostRecord;

const DEFAULT_BUFFER_SIZE: usize = 8192; // 8KB buffer

/// CSV record for one collected post
#[derive(Debug, Serialize)]
struct PostCsvRecord {
    index: u32,
    shortcode: String,
    date: String,
    content_type: &'static str,
    likes: u64,
    comments: u64,
    video_views: Option<u64>,
    engagement: u64,
    hashtags: String,
    mentions: String,
    is_brand_collab: bool,
    caption: String,
}

impl From<&PostRecord> for PostCsvRecord {
    fn from(post: &PostRecord) -> Self {
        Self {
            index: post.index,
            shortcode: post.shortcode.clone(),
            date: post.taken_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            content_type: post.content.label(),
            likes: post.likes,
            comments: post.comments,
            video_views: post.video_views,
            engagement: post.engagement(),
            hashtags: post.hashtags.join(" "),
            mentions: post.mentions.join(" "),
            is_brand_collab: post.is_brand_collab,
            caption: post.caption.clone(),
        }
    }
}

/// Buffered CSV writer for the per-profile post table.
pub struct CsvPostsWriter {
    writer: Writer<BufWriter<File>>,
    posts_written: u64,
}

impl CsvPostsWriter {
    /// Create a writer at `path`, creating parent directories as needed.
    pub fn new<P: AsRef<Path>>(path: P) -> OutputResult<Self> {
        let path = path.as_ref();
        debug!("Creating CSV writer: path={}", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| OutputError::IoError(format!("Failed to create directory: {e}")))?;
        }

        let file = File::create(path)
            .map_err(|e| OutputError::IoError(format!("Failed to create file: {e}")))?;
        let buf_writer = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file);

        // Headers are written by csv::Writer on first serialize()
        Ok(Self {
            writer: Writer::from_writer(buf_writer),
            posts_written: 0,
        })
    }

    /// Number of posts written so far.
    pub fn posts_written(&self) -> u64 {
        self.posts_written
    }

    /// Write a single post row.
    pub fn write_post(&mut self, post: &PostRecord) -> OutputResult<()> {
        let record = PostCsvRecord::from(post);
        self.writer
            .serialize(&record)
            .map_err(|e| OutputError::CsvError(format!("Failed to write post: {e}")))?;

        self.posts_written += 1;
        if self.posts_written % CSV_FLUSH_INTERVAL == 0 {
            self.flush()?;
            debug!("Progress: {} posts written", self.posts_written);
        }
        Ok(())
    }

    /// Write posts in order.
    pub fn write_posts(&mut self, posts: &[PostRecord]) -> OutputResult<()> {
        for post in posts {
            self.write_post(post)?;
        }
        Ok(())
    }
}

impl OutputWriter for CsvPostsWriter {
    fn flush(&mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::FlushError(format!("Failed to flush: {e}")))
    }

    /// Final flush plus fsync so a crash after close never loses rows.
    fn close(mut self) -> OutputResult<()> {
        self.flush()?;

        let buf_writer = self
            .writer
            .into_inner()
            .map_err(|e| OutputError::IoError(format!("Failed to get inner writer: {e}")))?;
        let file = buf_writer
            .into_inner()
            .map_err(|e| OutputError::IoError(format!("Failed to get file handle: {e}")))?;
        file.sync_all()
            .map_err(|e| OutputError::IoError(format!("Failed to sync file: {e}")))?;

        info!("CSV writer closed: {} posts written", self.posts_written);
        Ok(())
    }
}

/// Write the single-row profile summary table.
pub fn write_profile_summary(path: &Path, summary: &ProfileSummary) -> OutputResult<()> {
    write_rows(path, std::slice::from_ref(summary))
}

/// Write the multi-profile comparison table.
pub fn write_comparison(path: &Path, summaries: &[ProfileSummary]) -> OutputResult<()> {
    write_rows(path, summaries)
}

fn write_rows(path: &Path, rows: &[ProfileSummary]) -> OutputResult<()> {
    let file = File::create(path)
        .map_err(|e| OutputError::IoError(format!("Failed to create file: {e}")))?;
    let mut writer = Writer::from_writer(BufWriter::new(file));
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| OutputError::CsvError(format!("Failed to write summary: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| OutputError::FlushError(format!("Failed to flush: {e}")))
}
