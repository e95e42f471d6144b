//! Test-only fixtures: content builders, a scripted submitter, and temp
//! site directories.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::content::{SiteContent, Testimonial};
use crate::controller::{ConsultationController, SubmissionError, Submitter};
use crate::core::consultation::ConsultationError;
use crate::core::types::{FormField, FormFields};
use crate::io::config::{DEFAULT_CONFIG_FILE, SiteConfig, write_config};

/// Deterministic testimonial with the given id and rating.
pub fn testimonial(id: u32, rating: u8) -> Testimonial {
    Testimonial {
        id,
        name: format!("Client {}", id),
        role: "Founder".to_string(),
        company: format!("Company {}", id),
        content: format!("Quote {}", id),
        rating,
        image: format!("https://example.com/{}.jpg", id),
    }
}

/// Shipped content with testimonials replaced by one per rating (ids 1..).
pub fn content_with_ratings(ratings: &[u8]) -> SiteContent {
    let mut content = SiteContent::lawxygen();
    content.testimonials = ratings
        .iter()
        .enumerate()
        .map(|(i, rating)| testimonial(i as u32 + 1, *rating))
        .collect();
    content
}

pub fn service_titles() -> Vec<String> {
    SiteContent::lawxygen().service_titles()
}

/// Jane's valid request.
pub fn filled_fields() -> FormFields {
    FormFields {
        name: "Jane".to_string(),
        email: "j@x.com".to_string(),
        phone: "555".to_string(),
        service: "Tax Compliance".to_string(),
        message: String::new(),
    }
}

/// Type every field into a running form controller.
pub async fn fill_form(
    form: &ConsultationController,
    name: &str,
    email: &str,
    phone: &str,
    service: &str,
    message: &str,
) -> Result<(), ConsultationError> {
    let values = [name, email, phone, service, message];
    for (field, value) in FormField::ALL.into_iter().zip(values) {
        form.update_field(field, value).await?;
    }
    Ok(())
}

#[derive(Default)]
struct ScriptState {
    results: Mutex<VecDeque<Result<(), SubmissionError>>>,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

/// Submitter that replays queued results after a fixed latency.
///
/// Succeeds once the queue is empty. Clones share the script.
#[derive(Clone, Default)]
pub struct ScriptedSubmitter {
    latency: Duration,
    state: Arc<ScriptState>,
}

impl ScriptedSubmitter {
    pub fn new(latency: Duration, results: Vec<Result<(), SubmissionError>>) -> Self {
        let state = ScriptState {
            results: Mutex::new(results.into()),
            ..ScriptState::default()
        };
        Self {
            latency,
            state: Arc::new(state),
        }
    }

    /// Submissions started, including ones dropped before finishing.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Submissions that ran to completion.
    pub fn completed(&self) -> usize {
        self.state.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Submitter for ScriptedSubmitter {
    async fn submit(&self, _request: &FormFields) -> Result<(), SubmissionError> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        let result = self
            .state
            .results
            .lock()
            .expect("results lock poisoned")
            .pop_front()
            .unwrap_or(Ok(()));
        self.state.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

/// Temporary directory holding a `site.toml` written from `config`.
pub struct TempSite {
    pub dir: tempfile::TempDir,
    pub config_path: PathBuf,
}

impl TempSite {
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join(DEFAULT_CONFIG_FILE);
        write_config(&config_path, config)?;
        Ok(Self { dir, config_path })
    }
}
