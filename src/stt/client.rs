use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::models::WatsonResponse;

/// A speech-to-text service producing word timestamps and speaker labels
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn recognize(&self, audio: Vec<u8>, content_type: &str) -> Result<WatsonResponse>;
}

/// Configuration for the Watson Speech to Text client
#[derive(Debug, Clone)]
pub struct WatsonSttConfig {
    pub api_key: String,
    /// Service instance URL
    pub url: String,
    /// Recognition model, e.g. "hi-IN_Telephony"
    pub model: String,
    pub background_audio_suppression: f64,
    pub end_of_phrase_silence_time: f64,
    pub speech_detector_sensitivity: f64,
}

impl WatsonSttConfig {
    /// Create config from WATSON_STT_API_KEY and WATSON_STT_URL
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("WATSON_STT_API_KEY")
            .context("WATSON_STT_API_KEY environment variable not set")?;
        let url = std::env::var("WATSON_STT_URL")
            .context("WATSON_STT_URL environment variable not set")?;

        Ok(Self::new(api_key, url))
    }

    pub fn new(api_key: String, url: String) -> Self {
        Self {
            api_key,
            url: url.trim_end_matches('/').to_string(),
            model: "hi-IN_Telephony".to_string(),
            background_audio_suppression: 0.5,
            end_of_phrase_silence_time: 1.0,
            speech_detector_sensitivity: 0.55,
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("model", self.model.clone()),
            ("speaker_labels", "true".to_string()),
            (
                "background_audio_suppression",
                self.background_audio_suppression.to_string(),
            ),
            (
                "end_of_phrase_silence_time",
                self.end_of_phrase_silence_time.to_string(),
            ),
            (
                "speech_detector_sensitivity",
                self.speech_detector_sensitivity.to_string(),
            ),
            ("smart_formatting", "true".to_string()),
            ("smart_formatting_version", "2".to_string()),
        ]
    }
}

pub struct WatsonSttClient {
    client: Client,
    config: WatsonSttConfig,
}

impl WatsonSttClient {
    pub fn new(config: WatsonSttConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl SpeechToText for WatsonSttClient {
    async fn recognize(&self, audio: Vec<u8>, content_type: &str) -> Result<WatsonResponse> {
        info!(
            "Sending {} bytes of {} to Watson STT ({})",
            audio.len(),
            content_type,
            self.config.model
        );

        let response = self
            .client
            .post(format!("{}/v1/recognize", self.config.url))
            .basic_auth("apikey", Some(&self.config.api_key))
            .header("content-type", content_type)
            .query(&self.config.query())
            .body(audio)
            .send()
            .await
            .context("Failed to send request to Watson STT")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Watson STT error: {} - {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse Watson STT response")
    }
}

/// Content type for an audio file, from its extension
pub fn audio_content_type(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mp3",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("webm") => "audio/webm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_recognize_query() {
        let config = WatsonSttConfig::new("key".to_string(), "https://stt.example/".to_string());
        let query = config.query();

        assert_eq!(config.url, "https://stt.example");
        assert!(query.contains(&("speaker_labels", "true".to_string())));
        assert!(query.contains(&("model", "hi-IN_Telephony".to_string())));
        assert!(query.contains(&("speech_detector_sensitivity", "0.55".to_string())));
    }

    #[test]
    fn test_audio_content_type() {
        assert_eq!(audio_content_type(Path::new("call.WAV")), "audio/wav");
        assert_eq!(audio_content_type(Path::new("call.flac")), "audio/flac");
        assert_eq!(audio_content_type(Path::new("call")), "application/octet-stream");
    }
}
