//! Keyword-table classifier, the offline fallback.

use async_trait::async_trait;

use super::{classification_text, Classifier, ProfileTags};
use crate::ProfileDataset;

/// Captions folded into the classification text.
const CAPTION_CAP: usize = 30;

/// Category keyword tables, checked in order; first hit wins.
const CATEGORY_RULES: &[(&str, &[&str])] = &[
    ("Poetry / Writing", &["poetry", "poet", "shayari", "urdu"]),
    ("Fitness", &["fitness", "gym", "workout", "coach", "trainer"]),
    ("Travel", &["travel", "wanderlust", "trip", "tourism"]),
    ("Food", &["food", "chef", "recipe", "baking", "restaurant"]),
    (
        "Fashion / Beauty",
        &["fashion", "style", "outfit", "ootd", "makeup", "beauty"],
    ),
    (
        "Tech / Developer",
        &["developer", "coding", "programmer", "software", "tech"],
    ),
    (
        "Photography",
        &["photography", "photographer", "camera", "portrait"],
    ),
    (
        "Music / Artist",
        &["music", "singer", "songwriter", "producer", "dj"],
    ),
];

/// City mentions mapped to "City, Country"; first hit wins.
const LOCATION_RULES: &[(&str, &str)] = &[
    ("mumbai", "Mumbai, India"),
    ("bombay", "Mumbai, India"),
    ("pune", "Pune, India"),
    ("bangalore", "Bengaluru, India"),
    ("bengaluru", "Bengaluru, India"),
    ("new delhi", "New Delhi, India"),
    ("delhi", "Delhi, India"),
    ("hyderabad", "Hyderabad, India"),
    ("chennai", "Chennai, India"),
    ("kolkata", "Kolkata, India"),
    ("karachi", "Karachi, Pakistan"),
    ("lahore", "Lahore, Pakistan"),
    ("islamabad", "Islamabad, Pakistan"),
    ("dubai", "Dubai, UAE"),
    ("london", "London, UK"),
    ("new york", "New York, USA"),
    ("los angeles", "Los Angeles, USA"),
    ("toronto", "Toronto, Canada"),
    ("vancouver", "Vancouver, Canada"),
    ("sydney", "Sydney, Australia"),
    ("melbourne", "Melbourne, Australia"),
    ("paris", "Paris, France"),
];

/// Rule-based classifier over bio and caption text. Cheap, offline, and
/// deliberately coarse.
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    /// Classify raw text without a dataset, used directly by the AI
    /// classifier's fallback path.
    pub fn tags_for_text(bio: &str, captions: &[&str]) -> ProfileTags {
        let mut text = bio.to_lowercase();
        for caption in captions {
            text.push(' ');
            text.push_str(&caption.to_lowercase());
        }

        let mut tags = ProfileTags::unknown();
        for (category, keywords) in CATEGORY_RULES {
            if keywords.iter().any(|k| text.contains(k)) {
                tags.category = (*category).to_string();
                break;
            }
        }
        for (needle, location) in LOCATION_RULES {
            if text.contains(needle) {
                tags.location = (*location).to_string();
                break;
            }
        }
        tags
    }
}

#[async_trait]
impl Classifier for HeuristicClassifier {
    async fn classify(&self, dataset: &ProfileDataset) -> ProfileTags {
        let (bio, captions) = classification_text(dataset, CAPTION_CAP);
        Self::tags_for_text(&bio, &captions)
    }
}
