//! Delivery of consultation requests.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::core::types::FormFields;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("submission failed: {message}")]
pub struct SubmissionError {
    pub message: String,
}

impl SubmissionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Sends a validated consultation request somewhere.
///
/// The consultation controller polls the returned future on its own task and
/// drops it on teardown, so implementations must be cancel-safe.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, request: &FormFields) -> Result<(), SubmissionError>;
}

/// Accepts every request after a fixed latency. Performs no I/O.
#[derive(Debug, Clone)]
pub struct SimulatedSubmitter {
    latency: Duration,
}

impl SimulatedSubmitter {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl Submitter for SimulatedSubmitter {
    async fn submit(&self, request: &FormFields) -> Result<(), SubmissionError> {
        debug!(
            latency_ms = self.latency.as_millis() as u64,
            service = %request.service,
            "simulating consultation submission"
        );
        tokio::time::sleep(self.latency).await;
        Ok(())
    }
}
