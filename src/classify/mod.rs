//! Category and location inference for a fetched profile.
//!
//! Classification never fails the pipeline: the AI-backed classifier falls
//! back to the keyword heuristic on any error, and the heuristic itself
//! always produces an answer (possibly `Unknown`).

use async_trait::async_trait;

use crate::ProfileDataset;

pub mod gemini;
pub mod heuristic;

pub use gemini::GeminiClassifier;
pub use heuristic::HeuristicClassifier;

/// Inferred niche and home base for a profile.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProfileTags {
    /// Content niche, e.g. "Fitness" or "Travel".
    pub category: String,
    /// Likely "City, Country", or "Unknown".
    pub location: String,
}

impl ProfileTags {
    /// Tags produced when no signal was found.
    pub fn unknown() -> Self {
        Self {
            category: "Unknown (heuristic)".to_string(),
            location: "Unknown (heuristic)".to_string(),
        }
    }
}

/// Infers [`ProfileTags`] from a profile's bio and captions.
///
/// Implementations must always return tags; degraded answers are fine,
/// errors are not.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the profile behind `dataset`.
    async fn classify(&self, dataset: &ProfileDataset) -> ProfileTags;
}

/// Pick the strongest classifier available for `api_key`.
pub fn select_classifier(api_key: Option<&str>) -> Box<dyn Classifier> {
    match api_key {
        Some(key) if !key.trim().is_empty() => {
            Box::new(GeminiClassifier::new(key.trim().to_string()))
        }
        _ => {
            tracing::info!("no AI api key, classification uses local heuristic only");
            Box::new(HeuristicClassifier)
        }
    }
}

/// Bio plus up to `cap` recent captions, the text every classifier works on.
pub(crate) fn classification_text(dataset: &ProfileDataset, cap: usize) -> (String, Vec<&str>) {
    let captions: Vec<&str> = dataset
        .posts
        .iter()
        .map(|p| p.caption.as_str())
        .filter(|c| !c.is_empty())
        .take(cap)
        .collect();
    (dataset.meta.biography.clone(), captions)
}
