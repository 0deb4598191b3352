use std::sync::Arc;

use tracing::info;

use crate::llm::{LlmProvider, parse_aspect_result};
use crate::models::{AspectDef, AspectProfile, Transcript};

use super::{ProfilerConfig, PromptTask, dispatch_prompts};

/// Rate the call on every aspect concurrently.
///
/// Each template receives the full transcript. Results are keyed by the
/// aspect's display label; an aspect whose prompt or extraction fails holds
/// its error instead of a rating.
pub async fn profile_aspects(
    llm: &Arc<dyn LlmProvider>,
    transcript: &Transcript,
    aspects: &[AspectDef],
    config: &ProfilerConfig,
) -> AspectProfile {
    let formatted = transcript.format();
    let tasks = aspects
        .iter()
        .map(|aspect| PromptTask::new(aspect.label.clone(), aspect.render(&formatted)))
        .collect();

    info!("Profiling {} aspects", aspects.len());

    let profile: AspectProfile =
        dispatch_prompts(llm, tasks, config.aspect_workers, config.task_timeout)
            .await
            .into_iter()
            .map(|(label, outcome)| {
                let result = outcome.and_then(|value| parse_aspect_result(&label, value));
                (label, result)
            })
            .collect();

    let rated = profile.values().filter(|r| r.is_ok()).count();
    info!("Aspects: {} rated, {} unavailable", rated, profile.len() - rated);

    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProfileError;
    use crate::llm::default_aspects;
    use crate::llm::testing::ScriptedLlm;
    use crate::models::Turn;

    fn transcript() -> Transcript {
        Transcript::from_turns(vec![
            Turn {
                speaker_id: "speaker 0".to_string(),
                start: 0.0,
                end: 3.0,
                text: "thank you for calling how may I help".to_string(),
            },
            Turn {
                speaker_id: "speaker 1".to_string(),
                start: 3.5,
                end: 6.0,
                text: "my refund has not arrived".to_string(),
            },
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_all_aspects_rated() {
        let scripted = Arc::new(ScriptedLlm::new(
            "Result: {\"rating\": 4, \"reason\": \"Handled well\", \"suggestion\": \"None\"}",
        ));
        let llm: Arc<dyn LlmProvider> = scripted.clone();

        let profile = profile_aspects(
            &llm,
            &transcript(),
            &default_aspects(),
            &ProfilerConfig::default(),
        )
        .await;

        assert_eq!(profile.len(), 6);
        let empathy = profile["Empathy"].as_ref().unwrap();
        assert_eq!(empathy.rating, 4);
        assert_eq!(empathy.label, "Empathy");

        for prompt in scripted.prompts() {
            assert!(prompt.contains(
                "agent: thank you for calling how may I help\ncustomer: my refund has not arrived"
            ));
        }
    }

    #[tokio::test]
    async fn test_failed_aspect_does_not_affect_siblings() {
        let aspects = vec![
            AspectDef::new("Alpha", "ALPHA {transcript}"),
            AspectDef::new("Beta", "BETA {transcript}"),
            AspectDef::new("Gamma", "GAMMA {transcript}"),
        ];
        let scripted = Arc::new(
            ScriptedLlm::new("{\"rating\": 2, \"reason\": \"Slow\", \"suggestion\": \"Be faster\"}")
                .on("BETA", "{rating: two}")
                .on("JSON formatter", "still {not json}")
                .on("GAMMA", "{\"rating\": 9, \"reason\": \"?\"}"),
        );
        let llm: Arc<dyn LlmProvider> = scripted.clone();

        let profile =
            profile_aspects(&llm, &transcript(), &aspects, &ProfilerConfig::default()).await;

        assert_eq!(profile["Alpha"].as_ref().unwrap().suggestion, "Be faster");
        assert!(matches!(profile["Beta"], Err(ProfileError::UnrecoverableJson { .. })));
        assert!(matches!(profile["Gamma"], Err(ProfileError::InvalidResult(_))));
        // one call per aspect plus a single repair for Beta
        assert_eq!(scripted.calls(), 4);
    }
}
