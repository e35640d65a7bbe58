use serde::{Deserialize, Serialize};

/// Suggested works for a free-text query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub explanation: String,
}

impl Recommendation {
    /// An empty answer carrying only an explanation for the reader.
    #[must_use]
    pub fn unavailable(explanation: impl Into<String>) -> Self {
        Self {
            recommendations: Vec::new(),
            explanation: explanation.into(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }
}

/// Literary analysis of an arbitrary passage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnalysis {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub recommendation: String,
}
