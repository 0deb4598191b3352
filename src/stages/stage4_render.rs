use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::io::{HumanReport, ProfileReport};

/// Result of rendering
#[derive(Debug, Default)]
pub struct RenderResult {
    /// Path to the JSON report (if written)
    pub machine_path: Option<PathBuf>,
    /// Path to the text report (if written)
    pub human_path: Option<PathBuf>,
}

/// Write the report as JSON and, optionally, as plain text
pub fn execute_render(
    report: &ProfileReport,
    machine_output: Option<&Path>,
    human_output: Option<&Path>,
) -> Result<RenderResult> {
    let mut result = RenderResult::default();

    if let Some(path) = machine_output {
        info!("Writing report to {:?}", path);
        report.write_json(path)?;
        result.machine_path = Some(path.to_path_buf());
    }

    if let Some(path) = human_output {
        info!("Writing human-readable report to {:?}", path);
        HumanReport::new(report).write_file(path)?;
        result.human_path = Some(path.to_path_buf());
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AspectProfile, SentimentProfile, Transcript, Turn};
    use crate::error::ProfileError;

    #[test]
    fn test_render_only_requested_outputs() {
        let transcript = Transcript::from_turns(vec![Turn {
            speaker_id: "A".to_string(),
            start: 0.0,
            end: 1.0,
            text: "hello".to_string(),
        }])
        .unwrap();
        let sentiment = SentimentProfile {
            overall: Err(ProfileError::NoJsonFound),
            agent: Err(ProfileError::NoJsonFound),
            customer: Err(ProfileError::NoJsonFound),
        };
        let report = ProfileReport::new(&transcript, &AspectProfile::new(), &sentiment, None);

        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("out.json");

        let result = execute_render(&report, Some(&json_path), None).unwrap();

        assert_eq!(result.machine_path.as_deref(), Some(json_path.as_path()));
        assert!(result.human_path.is_none());
        assert!(json_path.exists());
    }
}
