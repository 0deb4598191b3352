use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

/// Placeholder replaced with the formatted transcript when rendering a prompt
pub const TRANSCRIPT_PLACEHOLDER: &str = "{transcript}";

/// One quality dimension scored by a dedicated prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AspectDef {
    /// Display label results are keyed by
    pub label: String,
    /// Prompt with a `{transcript}` placeholder
    pub template: String,
}

impl AspectDef {
    pub fn new(label: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            template: template.into(),
        }
    }

    pub fn render(&self, transcript: &str) -> String {
        render_template(&self.template, transcript)
    }
}

/// Substitute the transcript into a template. Literal braces elsewhere in the
/// template (JSON examples) are left untouched.
pub fn render_template(template: &str, transcript: &str) -> String {
    template.replace(TRANSCRIPT_PLACEHOLDER, transcript)
}

/// Rating of one aspect on a 1-5 scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectResult {
    pub label: String,
    pub rating: u8,
    pub reason: String,
    /// Improvement suggestion, `"None"` when nothing to improve
    pub suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(format!("unknown sentiment '{}'", other)),
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: String,
    pub sentiment: Sentiment,
    pub reason: String,
    pub suggestion: String,
}

/// Outcome of one profiling slot
pub type SlotResult<T> = Result<T, ProfileError>;

/// Aspect outcomes keyed by display label
pub type AspectProfile = BTreeMap<String, SlotResult<AspectResult>>;

/// The three sentiment channels of a call
#[derive(Debug, Clone)]
pub struct SentimentProfile {
    pub overall: SlotResult<SentimentResult>,
    pub agent: SlotResult<SentimentResult>,
    pub customer: SlotResult<SentimentResult>,
}

impl SentimentProfile {
    /// Channels in display order with their keys
    pub fn channels(&self) -> [(&'static str, &SlotResult<SentimentResult>); 3] {
        [
            ("overall", &self.overall),
            ("agent", &self.agent),
            ("customer", &self.customer),
        ]
    }
}
