use serde::{Deserialize, Serialize};

/// Root response from the Watson Speech to Text `recognize` endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatsonResponse {
    #[serde(default)]
    pub results: Vec<WatsonResult>,
    /// Diarization intervals, present when `speaker_labels=true` was requested
    #[serde(default)]
    pub speaker_labels: Vec<WatsonSpeakerLabel>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatsonResult {
    pub alternatives: Vec<WatsonAlternative>,
    #[serde(default, rename = "final")]
    pub is_final: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatsonAlternative {
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// `[word, start_seconds, end_seconds]` triples
    #[serde(default)]
    pub timestamps: Vec<(String, f64, f64)>,
}

/// A speaker-attributed interval
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatsonSpeakerLabel {
    /// Start time in seconds
    pub from: f64,
    /// End time in seconds
    pub to: f64,
    pub speaker: WatsonSpeakerId,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default, rename = "final")]
    pub is_final: bool,
}

/// Watson emits numeric speaker ids; other providers routed through the same
/// shape sometimes send strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum WatsonSpeakerId {
    Number(u64),
    Text(String),
}

impl WatsonSpeakerId {
    /// Display form used as the speaker id throughout the transcript
    pub fn label(&self) -> String {
        match self {
            WatsonSpeakerId::Number(n) => format!("speaker {}", n),
            WatsonSpeakerId::Text(s) => s.clone(),
        }
    }
}

impl WatsonResponse {
    /// All word timestamps, taking the best alternative of every result block
    pub fn timestamps(&self) -> impl Iterator<Item = &(String, f64, f64)> {
        self.results
            .iter()
            .filter_map(|r| r.alternatives.first())
            .flat_map(|a| a.timestamps.iter())
    }
}
