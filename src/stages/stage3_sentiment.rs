use std::sync::Arc;

use tracing::info;

use crate::error::ProfileError;
use crate::llm::{
    LlmProvider, agent_sentiment_prompt, customer_sentiment_prompt, overall_sentiment_prompt,
    parse_sentiment_result,
};
use crate::models::{Role, SentimentProfile, SentimentResult, SlotResult, Transcript, render_template};

use super::{ProfilerConfig, PromptTask, dispatch_prompts};

const OVERALL: &str = "Overall";
const AGENT: &str = "Agent";
const CUSTOMER: &str = "Customer";

/// Classify the sentiment of the whole call, the agent's lines and the
/// customer's lines concurrently.
pub async fn profile_sentiment(
    llm: &Arc<dyn LlmProvider>,
    transcript: &Transcript,
    config: &ProfilerConfig,
) -> SentimentProfile {
    let tasks = vec![
        PromptTask::new(
            OVERALL,
            render_template(&overall_sentiment_prompt(), &transcript.format()),
        ),
        PromptTask::new(
            AGENT,
            render_template(&agent_sentiment_prompt(), &transcript.format_role(Role::Agent)),
        ),
        PromptTask::new(
            CUSTOMER,
            render_template(
                &customer_sentiment_prompt(),
                &transcript.format_role(Role::Customer),
            ),
        ),
    ];

    info!("Profiling sentiment");

    let mut results = dispatch_prompts(llm, tasks, config.sentiment_workers, config.task_timeout)
        .await
        .into_iter()
        .map(|(label, outcome)| {
            let result = outcome.and_then(|value| parse_sentiment_result(&label, value));
            (label, result)
        });

    // dispatch keeps submission order
    let mut next = || -> SlotResult<SentimentResult> {
        results
            .next()
            .map(|(_, result)| result)
            .unwrap_or_else(|| Err(ProfileError::Task("missing sentiment result".to_string())))
    };

    SentimentProfile {
        overall: next(),
        agent: next(),
        customer: next(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedLlm;
    use crate::models::{Sentiment, Turn};

    fn transcript() -> Transcript {
        let turn = |speaker: &str, text: &str| Turn {
            speaker_id: speaker.to_string(),
            start: 0.0,
            end: 1.0,
            text: text.to_string(),
        };
        Transcript::from_turns(vec![
            turn("speaker 0", "good morning"),
            turn("speaker 1", "this is the third time I am calling"),
            turn("speaker 0", "I am sorry about that"),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_three_channels() {
        let scripted = Arc::new(
            ScriptedLlm::new("{\"sentiment\": \"Neutral\", \"reason\": \"Mixed call\"}")
                .on("agent's responses", "```json\n{\"sentiment\": \"Positive\", \"reason\": \"Apologetic\", \"suggestion\": \"None\"}\n```")
                .on("customer's responses", "{\"sentiment\": \"negative\", \"reason\": \"Frustrated\", \"suggestion\": \"Resolve on first call\"}"),
        );
        let llm: Arc<dyn LlmProvider> = scripted.clone();

        let profile = profile_sentiment(&llm, &transcript(), &ProfilerConfig::default()).await;

        let overall = profile.overall.unwrap();
        assert_eq!(overall.label, "Overall");
        assert_eq!(overall.sentiment, Sentiment::Neutral);
        assert_eq!(profile.agent.unwrap().sentiment, Sentiment::Positive);
        let customer = profile.customer.unwrap();
        assert_eq!(customer.sentiment, Sentiment::Negative);
        assert_eq!(customer.suggestion, "Resolve on first call");
    }

    #[tokio::test]
    async fn test_role_filtered_prompts() {
        let scripted = Arc::new(ScriptedLlm::new("{\"sentiment\": \"Neutral\"}"));
        let llm: Arc<dyn LlmProvider> = scripted.clone();

        profile_sentiment(&llm, &transcript(), &ProfilerConfig::default()).await;

        let prompts = scripted.prompts();
        assert_eq!(prompts.len(), 3);

        let agent = prompts.iter().find(|p| p.contains("agent's responses")).unwrap();
        assert!(agent.contains("agent: good morning\nagent: I am sorry about that"));
        assert!(!agent.contains("customer:"));

        let customer = prompts.iter().find(|p| p.contains("customer's responses")).unwrap();
        assert!(customer.contains("customer: this is the third time I am calling"));
        assert!(!customer.contains("agent:"));
    }

    #[tokio::test]
    async fn test_one_channel_failure_is_isolated() {
        let scripted = Arc::new(
            ScriptedLlm::new("{\"sentiment\": \"Positive\", \"reason\": \"Fine\"}")
                .fail_on("customer's responses", "rate limited"),
        );
        let llm: Arc<dyn LlmProvider> = scripted.clone();

        let profile = profile_sentiment(&llm, &transcript(), &ProfilerConfig::default()).await;

        assert!(profile.overall.is_ok());
        assert!(profile.agent.is_ok());
        assert!(matches!(profile.customer, Err(ProfileError::Provider(_))));
    }
}
