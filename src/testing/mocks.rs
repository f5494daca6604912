//! Mock implementations of the boundary traits.
//!
//! These mocks provide controllable test doubles for the analysis service
//! and the change probe, enabling deterministic unit tests.

use crate::analysis::client::{AnalysisClient, AnalysisError};
use crate::changes::ChangeSource;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Mock implementation of the analysis service.
///
/// # Example
///
/// ```rust,ignore
/// let client = MockAnalysisClient::new()
///     .with_response(r#"{"continuation_prompt": "Keep going."}"#);
/// let calls = client.call_counter();
///
/// let orchestrator = AnalysisOrchestrator::new(Box::new(client));
/// orchestrator.analyze("doc", "", "scope").await;
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
/// ```
#[derive(Debug)]
pub struct MockAnalysisClient {
    available: bool,
    response: String,
    error: Mutex<Option<AnalysisError>>,
    calls: Arc<AtomicU32>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl Default for MockAnalysisClient {
    fn default() -> Self {
        Self {
            available: true,
            response: "{}".to_string(),
            error: Mutex::new(None),
            calls: Arc::new(AtomicU32::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockAnalysisClient {
    /// Create an available mock that answers `{}`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that reports itself unavailable.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::default()
        }
    }

    /// Set the response text.
    #[must_use]
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Fail the next call with `error`.
    #[must_use]
    pub fn with_error(self, error: AnalysisError) -> Self {
        if let Ok(mut slot) = self.error.lock() {
            *slot = Some(error);
        }
        self
    }

    /// Shared handle to the number of `complete` calls.
    #[must_use]
    pub fn call_counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.calls)
    }

    /// Shared handle to every prompt received.
    #[must_use]
    pub fn prompt_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

#[async_trait]
impl AnalysisClient for MockAnalysisClient {
    fn is_available(&self) -> bool {
        self.available
    }

    fn model_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, prompt: &str) -> Result<String, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let error = self.error.lock().ok().and_then(|mut slot| slot.take());
        match error {
            Some(e) => Err(e),
            None => Ok(self.response.clone()),
        }
    }
}

/// Mock change source with a fixed summary and a call counter.
#[derive(Debug, Clone, Default)]
pub struct MockChangeSource {
    summary: String,
    calls: Arc<AtomicU32>,
}

impl MockChangeSource {
    #[must_use]
    pub fn new(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// A source reporting no changes.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of `summarize` calls so far.
    #[must_use]
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChangeSource for MockChangeSource {
    async fn summarize(&self) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.summary.clone()
    }
}
