//! Scripted stand-in for a real model, used by the profiler tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use super::LlmProvider;

/// Replies with the first scripted response whose marker occurs in the prompt
pub struct ScriptedLlm {
    rules: Vec<(String, Reply)>,
    fallback: Reply,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

#[derive(Clone)]
enum Reply {
    Text(String),
    Fail(String),
    Hang(Duration),
    Panic(String),
}

impl ScriptedLlm {
    pub fn new(fallback: &str) -> Self {
        Self {
            rules: Vec::new(),
            fallback: Reply::Text(fallback.to_string()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn on(mut self, marker: &str, response: &str) -> Self {
        self.rules
            .push((marker.to_string(), Reply::Text(response.to_string())));
        self
    }

    pub fn fail_on(mut self, marker: &str, message: &str) -> Self {
        self.rules
            .push((marker.to_string(), Reply::Fail(message.to_string())));
        self
    }

    pub fn hang_on(mut self, marker: &str, duration: Duration) -> Self {
        self.rules.push((marker.to_string(), Reply::Hang(duration)));
        self
    }

    pub fn panic_on(mut self, marker: &str, message: &str) -> Self {
        self.rules
            .push((marker.to_string(), Reply::Panic(message.to_string())));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let reply = self
            .rules
            .iter()
            .find(|(marker, _)| prompt.contains(marker.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.fallback.clone());

        if let Reply::Panic(message) = &reply {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            panic!("{}", message);
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Reply::Hang(duration) = &reply {
            tokio::time::sleep(*duration).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Fail(message) => Err(anyhow::anyhow!(message)),
            Reply::Hang(_) | Reply::Panic(_) => Ok("{}".to_string()),
        }
    }
}
