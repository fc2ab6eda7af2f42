//! Caption parsing: hashtags, @-mentions, brand-collab markers.

use once_cell::sync::Lazy;
use regex::Regex;

static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@([A-Za-z0-9_.]+)").expect("mention regex"));

/// Caption phrases that mark a paid brand collaboration.
pub const AD_KEYWORDS: &[&str] = &["#ad", "#sponsored", "#collab", "paid partnership"];

/// Extract lowercase hashtags (without `#`) from a caption.
pub fn extract_hashtags(caption: &str) -> Vec<String> {
    caption
        .split_whitespace()
        .filter(|w| w.starts_with('#') && w.len() > 1)
        .map(|w| w[1..].to_lowercase())
        .collect()
}

/// Extract lowercase @-mentions from a caption.
pub fn extract_mentions(caption: &str) -> Vec<String> {
    MENTION_RE
        .captures_iter(caption)
        .map(|c| c[1].to_lowercase())
        .collect()
}

/// Whether a caption carries any brand-collaboration marker.
pub fn is_brand_collab(caption: &str) -> bool {
    let lower = caption.to_lowercase();
    AD_KEYWORDS.iter().any(|k| lower.contains(k))
}
