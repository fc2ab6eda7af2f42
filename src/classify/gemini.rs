//! Gemini-backed classifier with a clean heuristic fallback.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{classification_text, Classifier, HeuristicClassifier, ProfileTags};
use crate::ProfileDataset;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Captions included in the prompt.
const PROMPT_CAPTION_CAP: usize = 5;

/// Calls the Gemini generateContent endpoint in JSON mode and parses the
/// answer into [`ProfileTags`]. Any failure, from transport to malformed
/// JSON, degrades to [`HeuristicClassifier`].
pub struct GeminiClassifier {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl GeminiClassifier {
    /// Build a classifier for `api_key`.
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: reqwest::Client::new(),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    /// Point at a different endpoint, for tests.
    #[cfg(test)]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    fn prompt(bio: &str, captions: &[&str]) -> String {
        let captions_text = captions[..captions.len().min(PROMPT_CAPTION_CAP)].join(" || ");
        format!(
            "Analyze the following social media profile data:\n\
             BIO: {bio}\n\
             RECENT POST CAPTIONS: {captions_text}\n\n\
             Task:\n\
             1. Identify the 'Category' or niche (e.g., Fitness, Travel, Food, Tech, Fashion, Meme).\n\
             2. Identify the 'Location' (City, Country) where the creator is likely based. If uncertain, say 'Unknown'.\n\n\
             Return ONLY a JSON string with keys 'category' and 'location'."
        )
    }

    async fn generate(&self, prompt: String) -> anyhow::Result<ProfileTags> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, GEMINI_MODEL, self.api_key
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        debug!(model = GEMINI_MODEL, "gemini classification request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("gemini api error ({status}): {error_text}");
        }

        let body: GenerateResponse = response.json().await?;
        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| anyhow::anyhow!("empty gemini response"))?;

        let tags: ProfileTags = serde_json::from_str(text.trim())?;
        Ok(tags)
    }
}

#[async_trait]
impl Classifier for GeminiClassifier {
    async fn classify(&self, dataset: &ProfileDataset) -> ProfileTags {
        let (bio, captions) = classification_text(dataset, PROMPT_CAPTION_CAP);
        match self.generate(Self::prompt(&bio, &captions)).await {
            Ok(tags) => tags,
            Err(err) => {
                warn!(error = %err, "gemini classification failed, using heuristic");
                HeuristicClassifier::tags_for_text(&bio, &captions)
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}
