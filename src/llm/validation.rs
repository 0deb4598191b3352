use serde::Deserialize;
use serde_json::Value;

use crate::error::ProfileError;
use crate::models::{AspectResult, Sentiment, SentimentResult};

/// Suggestion used when the model has nothing to improve or omits the field
pub const NO_SUGGESTION: &str = "None";

#[derive(Debug, Deserialize)]
struct RawAspect {
    rating: Value,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    suggestion: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSentiment {
    sentiment: String,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    suggestion: Option<String>,
}

/// Turn an extracted JSON object into an aspect rating
pub fn parse_aspect_result(label: &str, value: Value) -> Result<AspectResult, ProfileError> {
    let raw: RawAspect =
        serde_json::from_value(value).map_err(|e| ProfileError::InvalidResult(e.to_string()))?;

    Ok(AspectResult {
        label: label.to_string(),
        rating: parse_rating(&raw.rating)?,
        reason: raw.reason.unwrap_or_default(),
        suggestion: normalize_suggestion(raw.suggestion),
    })
}

/// Turn an extracted JSON object into a sentiment result
pub fn parse_sentiment_result(label: &str, value: Value) -> Result<SentimentResult, ProfileError> {
    let raw: RawSentiment =
        serde_json::from_value(value).map_err(|e| ProfileError::InvalidResult(e.to_string()))?;

    let sentiment: Sentiment = raw.sentiment.parse().map_err(ProfileError::InvalidResult)?;

    Ok(SentimentResult {
        label: label.to_string(),
        sentiment,
        reason: raw.reason.unwrap_or_default(),
        suggestion: normalize_suggestion(raw.suggestion),
    })
}

/// Ratings arrive as `4`, `4.0` or `"4"` depending on the model
fn parse_rating(value: &Value) -> Result<u8, ProfileError> {
    let rating = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match rating {
        Some(r) if r.fract() == 0.0 && (1.0..=5.0).contains(&r) => Ok(r as u8),
        _ => Err(ProfileError::InvalidResult(format!(
            "rating {} is not one of 1-5",
            value
        ))),
    }
}

fn normalize_suggestion(suggestion: Option<String>) -> String {
    match suggestion {
        Some(s) if !s.trim().is_empty() => s,
        _ => NO_SUGGESTION.to_string(),
    }
}
