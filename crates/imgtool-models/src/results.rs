//! Structured results returned by JSON capabilities.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reply of `/extract_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedText {
    pub text: String,
}

/// Reply of `/compare_images`.
///
/// The score is whatever the backend computed for `file1` against `file2`;
/// swapping the inputs may change it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SimilarityScore {
    pub similarity_score: f64,
}

impl SimilarityScore {
    pub fn as_percent(&self) -> f64 {
        self.similarity_score * 100.0
    }
}

/// Reply of `/count_objects`: label to count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ObjectCounts(pub BTreeMap<String, u64>);

impl ObjectCounts {
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn get(&self, label: &str) -> Option<u64> {
        self.0.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_counts_total() {
        let counts: ObjectCounts = serde_json::from_str(r#"{ "person": 2, "car": 1 }"#).unwrap();
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.get("person"), Some(2));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_object_counts_serialize_unchanged() {
        let counts: ObjectCounts = serde_json::from_str(r#"{"car":1,"person":2}"#).unwrap();
        assert_eq!(
            serde_json::to_value(&counts).unwrap(),
            serde_json::json!({ "person": 2, "car": 1 })
        );
    }

    #[test]
    fn test_similarity_percent() {
        let score: SimilarityScore = serde_json::from_str(r#"{"similarity_score":0.8734}"#).unwrap();
        assert!((score.as_percent() - 87.34).abs() < 1e-9);
    }

    #[test]
    fn test_extracted_text() {
        let text: ExtractedText = serde_json::from_str(r#"{"text":"hello\nworld"}"#).unwrap();
        assert_eq!(text.text, "hello\nworld");
    }
}
