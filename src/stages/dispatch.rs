use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::ProfileError;
use crate::llm::{LlmProvider, extract_json_with_llm};

/// Configuration shared by the aspect and sentiment profilers
#[derive(Debug, Clone)]
pub struct ProfilerConfig {
    /// Concurrent prompts during aspect profiling
    pub aspect_workers: usize,
    /// Concurrent prompts during sentiment profiling
    pub sentiment_workers: usize,
    /// Upper bound for one prompt including its repair pass; `None` waits
    /// for the provider indefinitely
    pub task_timeout: Option<Duration>,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            aspect_workers: 6,
            sentiment_workers: 3,
            task_timeout: None,
        }
    }
}

/// A rendered prompt and the label its result is reported under
#[derive(Debug, Clone)]
pub struct PromptTask {
    pub label: String,
    pub prompt: String,
}

impl PromptTask {
    pub fn new(label: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            prompt: prompt.into(),
        }
    }
}

/// Query the model and extract the JSON object from its reply
pub async fn evaluate_prompt(llm: &dyn LlmProvider, prompt: &str) -> Result<Value, ProfileError> {
    let raw = llm
        .generate(prompt)
        .await
        .map_err(|e| ProfileError::Provider(format!("{:#}", e)))?;
    extract_json_with_llm(&raw, llm).await
}

async fn run_task(
    llm: Arc<dyn LlmProvider>,
    permits: Arc<Semaphore>,
    prompt: String,
    timeout: Option<Duration>,
) -> Result<Value, ProfileError> {
    let _permit = permits
        .acquire_owned()
        .await
        .map_err(|e| ProfileError::Task(e.to_string()))?;

    let work = evaluate_prompt(llm.as_ref(), &prompt);
    match timeout {
        Some(limit) => tokio::time::timeout(limit, work)
            .await
            .map_err(|_| ProfileError::TimedOut(limit))?,
        None => work.await,
    }
}

/// Run every task on its own tokio task, at most `workers` at a time, and
/// return once all of them have finished.
///
/// Results come back in submission order. A failing or panicking task only
/// affects its own entry.
pub async fn dispatch_prompts(
    llm: &Arc<dyn LlmProvider>,
    tasks: Vec<PromptTask>,
    workers: usize,
    timeout: Option<Duration>,
) -> Vec<(String, Result<Value, ProfileError>)> {
    let permits = Arc::new(Semaphore::new(workers.max(1)));
    debug!("Dispatching {} prompts on {} workers", tasks.len(), workers.max(1));

    let handles: Vec<_> = tasks
        .into_iter()
        .map(|task| {
            let llm = Arc::clone(llm);
            let permits = Arc::clone(&permits);
            let PromptTask { label, prompt } = task;

            let handle = tokio::spawn(run_task(llm, permits, prompt, timeout));

            (label, handle)
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (label, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(ProfileError::Task(e.to_string())),
        };

        match &outcome {
            Ok(_) => debug!("{}: result received", label),
            Err(e) => warn!("{} unavailable: {}", label, e),
        }
        results.push((label, outcome));
    }

    results
}
