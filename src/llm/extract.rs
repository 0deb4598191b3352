use std::future::Future;

use serde_json::Value;
use tracing::warn;

use crate::error::ProfileError;
use crate::llm::{LlmProvider, render_repair_prompt};

/// Locate the JSON candidate in free-form model output: everything from the
/// first `{` to the last `}`.
///
/// Models wrap their JSON in prose or markdown fences; the greedy span
/// drops both while keeping nested objects intact.
pub fn extract_json_span(text: &str) -> Result<&str, ProfileError> {
    let start = text.find('{').ok_or(ProfileError::NoJsonFound)?;
    let end = text.rfind('}').ok_or(ProfileError::NoJsonFound)?;

    if end < start {
        return Err(ProfileError::NoJsonFound);
    }

    Ok(&text[start..=end])
}

fn parse_candidate(candidate: &str) -> Result<Value, String> {
    serde_json::from_str::<Value>(candidate).map_err(|e| e.to_string())
}

/// Extract and parse the JSON object in `raw`, calling `repair` at most once
/// with the invalid candidate and the parser error when the first parse
/// fails.
///
/// The repaired text goes through the same extraction; if it still does not
/// parse the call fails with [`ProfileError::UnrecoverableJson`].
pub async fn extract_json<F, Fut>(raw: &str, repair: F) -> Result<Value, ProfileError>
where
    F: FnOnce(String, String) -> Fut,
    Fut: Future<Output = anyhow::Result<String>>,
{
    let candidate = extract_json_span(raw)?;

    let message = match parse_candidate(candidate) {
        Ok(value) => return Ok(value),
        Err(message) => message,
    };

    warn!("Invalid JSON in model output ({}), requesting repair", message);

    let repaired = repair(candidate.to_string(), message)
        .await
        .map_err(|e| ProfileError::Provider(format!("{:#}", e)))?;

    let candidate = match extract_json_span(&repaired) {
        Ok(candidate) => candidate,
        Err(_) => {
            return Err(ProfileError::UnrecoverableJson {
                candidate: repaired.clone(),
                message: "no JSON object in repaired output".to_string(),
            });
        }
    };

    parse_candidate(candidate).map_err(|message| ProfileError::UnrecoverableJson {
        candidate: candidate.to_string(),
        message,
    })
}

/// [`extract_json`] with the corrective prompt sent to `llm` as the repair pass
pub async fn extract_json_with_llm(raw: &str, llm: &dyn LlmProvider) -> Result<Value, ProfileError> {
    extract_json(raw, move |candidate, error| async move {
        llm.generate(&render_repair_prompt(&candidate, &error)).await
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use serde_json::json;

    async fn no_repair(_: String, _: String) -> anyhow::Result<String> {
        panic!("repair must not be called for valid JSON");
    }

    #[test]
    fn test_span_strips_markdown_fence() {
        let raw = "Sure! ```json\n{\"rating\":4,\"reason\":\"ok\",\"suggestion\":\"None\"}\n```";
        assert_eq!(
            extract_json_span(raw).unwrap(),
            "{\"rating\":4,\"reason\":\"ok\",\"suggestion\":\"None\"}"
        );
    }

    #[test]
    fn test_span_without_braces() {
        assert_eq!(extract_json_span("no json here"), Err(ProfileError::NoJsonFound));
        assert_eq!(extract_json_span("} backwards {"), Err(ProfileError::NoJsonFound));
        assert_eq!(extract_json_span("{ unterminated"), Err(ProfileError::NoJsonFound));
    }

    #[tokio::test]
    async fn test_extract_fenced_json() {
        let raw = "Sure! ```json\n{\"rating\":4,\"reason\":\"ok\",\"suggestion\":\"None\"}\n```";
        let value = extract_json(raw, no_repair).await.unwrap();

        assert_eq!(value, json!({"rating": 4, "reason": "ok", "suggestion": "None"}));
    }

    #[tokio::test]
    async fn test_extract_recovers_object_from_prose() {
        let object = json!({
            "sentiment": "Neutral",
            "reason": "Customer calm, agent followed the script",
            "details": {"nested": [1, 2, 3], "flag": true}
        });
        let wrappers = [
            ("", ""),
            ("Result: ", ""),
            ("Here is my analysis:\n\n", "\n\nLet me know if you need more."),
            ("```json\n", "\n```"),
        ];

        for (prefix, suffix) in wrappers {
            let raw = format!("{}{}{}", prefix, object, suffix);
            let value = extract_json(&raw, no_repair).await.unwrap();
            assert_eq!(value, object, "wrapper {:?}", (prefix, suffix));
        }
    }

    #[tokio::test]
    async fn test_no_json_skips_repair() {
        let err = extract_json("I cannot rate this call.", no_repair)
            .await
            .unwrap_err();
        assert_eq!(err, ProfileError::NoJsonFound);
    }

    #[tokio::test]
    async fn test_repair_pass_fixes_invalid_json() {
        let calls = Cell::new(0);
        let raw = "JSON Output: {\"rating\": 3, \"reason\": \"slow\" \"suggestion\": \"None\"}";

        let value = extract_json(raw, |candidate, error| {
            calls.set(calls.get() + 1);
            assert!(candidate.starts_with('{'));
            assert!(!error.is_empty());
            async { Ok("Corrected: {\"rating\": 3, \"reason\": \"slow\", \"suggestion\": \"None\"}".to_string()) }
        })
        .await
        .unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(value, json!({"rating": 3, "reason": "slow", "suggestion": "None"}));
    }

    #[tokio::test]
    async fn test_failed_repair_is_terminal() {
        let calls = Cell::new(0);

        let err = extract_json("{rating: four}", |_, _| {
            calls.set(calls.get() + 1);
            async { Ok("{still: broken}".to_string()) }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.get(), 1);
        assert!(matches!(err, ProfileError::UnrecoverableJson { ref candidate, .. } if candidate == "{still: broken}"));
    }

    #[tokio::test]
    async fn test_repair_without_json_is_terminal() {
        let err = extract_json("{oops", |_, _| async { Ok("sorry".to_string()) }).await;
        // "{oops" has no closing brace, so nothing is extracted and no repair happens
        assert_eq!(err.unwrap_err(), ProfileError::NoJsonFound);

        let err = extract_json("{oops}", |_, _| async { Ok("sorry".to_string()) })
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileError::UnrecoverableJson { .. }));
    }

    #[tokio::test]
    async fn test_repair_provider_error() {
        let err = extract_json("{bad}", |_, _| async { Err(anyhow::anyhow!("connection reset")) })
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileError::Provider(ref msg) if msg.contains("connection reset")));
    }
}
