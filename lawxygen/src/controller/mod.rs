//! Timer-driven controllers wrapping the pure state machines in [`crate::core`].
//!
//! Each controller runs as a single tokio task that owns its state. Handles
//! forward intents over a bounded channel and expose snapshots through a
//! watch channel. Shutting a controller down, or dropping its handle,
//! cancels every pending transition.

pub mod carousel;
pub mod consultation;
pub mod submitter;
pub mod timer;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::content::SiteContent;
use crate::core::carousel::CarouselError;
use crate::io::config::SiteConfig;

pub use carousel::CarouselController;
pub use consultation::{ConsultationController, ConsultationSnapshot, ConsultationTimings};
pub use submitter::{SimulatedSubmitter, SubmissionError, Submitter};

/// Intents queued per controller before senders wait.
pub(crate) const COMMAND_BUFFER: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("controller has shut down")]
pub struct ControllerClosed;

/// The two interactive controllers behind one rendered page.
pub struct PageControllers {
    pub carousel: CarouselController,
    pub consultation: ConsultationController,
}

impl PageControllers {
    /// Start both controllers with timings from `config`.
    pub fn open(
        config: &SiteConfig,
        content: &SiteContent,
        submitter: Arc<dyn Submitter>,
    ) -> Result<Self, CarouselError> {
        let carousel = CarouselController::spawn(
            content.testimonials.len(),
            Duration::from_millis(config.carousel.transition_ms),
        )?;
        let consultation = ConsultationController::spawn(
            submitter,
            content.service_titles(),
            config.consultation.timings(),
        );
        Ok(Self {
            carousel,
            consultation,
        })
    }

    /// Submitter configured by `config`: simulated latency, no I/O.
    pub fn simulated_submitter(config: &SiteConfig) -> Arc<dyn Submitter> {
        Arc::new(SimulatedSubmitter::new(Duration::from_millis(
            config.consultation.submit_latency_ms,
        )))
    }

    /// Tear down both controllers, cancelling their pending timers.
    pub async fn shutdown(self) {
        let Self {
            carousel,
            consultation,
        } = self;
        tokio::join!(carousel.shutdown(), consultation.shutdown());
    }
}
