use std::path::Path;

use anyhow::{Context, Result};

use crate::models::WatsonResponse;
use crate::stages::SttInput;

/// Parse a saved Watson STT JSON file
pub fn parse_watson_file(path: &Path) -> Result<SttInput> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_watson_json(&content)
}

/// Parse a Watson STT JSON string into reconstructor input
pub fn parse_watson_json(json: &str) -> Result<SttInput> {
    let response: WatsonResponse =
        serde_json::from_str(json).context("Failed to parse Watson STT JSON")?;
    Ok(SttInput::from_watson(&response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_watson_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "results": [{{"alternatives": [{{"timestamps": [["hello", 0.0, 0.4], ["hi", 1.0, 1.3]]}}]}}],
                "speaker_labels": [
                    {{"from": 0.0, "to": 0.4, "speaker": 3}},
                    {{"from": 1.0, "to": 1.3, "speaker": 5}}
                ]
            }}"#
        )
        .unwrap();

        let input = parse_watson_file(file.path()).unwrap();

        assert_eq!(input.words.len(), 2);
        assert_eq!(input.segments[1].speaker_id, "speaker 5");
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_watson_json("not json").unwrap_err();
        assert!(err.to_string().contains("Failed to parse Watson STT JSON"));
    }

    #[test]
    fn test_missing_file() {
        assert!(parse_watson_file(Path::new("/nonexistent/stt.json")).is_err());
    }
}
