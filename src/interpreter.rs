//! Turns a classification into what the scanner shows: a verdict, a rounded
//! confidence, and the sentence handed to the voice sink.

use crate::types::{ClassificationResult, Verdict, whole_percent};

pub const DEFAULT_DISEASE_KEYWORDS: &[&str] = &["rust"];

/// Case-insensitive keywords whose presence in a label marks it diseased.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiseaseKeywords {
    lowered: Vec<String>,
}

impl DiseaseKeywords {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lowered = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { lowered }
    }

    pub fn matches(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.lowered.iter().any(|k| label.contains(k.as_str()))
    }
}

impl Default for DiseaseKeywords {
    fn default() -> Self {
        Self::new(DEFAULT_DISEASE_KEYWORDS)
    }
}

/// Labels that match no keyword count as healthy.
pub fn verdict_for_label(label: &str, keywords: &DiseaseKeywords) -> Verdict {
    if keywords.matches(label) {
        Verdict::Diseased
    } else {
        Verdict::Healthy
    }
}

pub fn interpret(result: &ClassificationResult, keywords: &DiseaseKeywords) -> Verdict {
    verdict_for_label(result.label(), keywords)
}

/// `round(p * 100)` as a percentage string, clamped to `0%..=100%`.
pub fn format_confidence(probability: f32) -> String {
    format!("{}%", whole_percent(probability))
}

pub fn spoken_summary(result: &ClassificationResult) -> String {
    format!(
        "Result: {}. Confidence: {} percent.",
        result.label(),
        result.confidence_percent()
    )
}
