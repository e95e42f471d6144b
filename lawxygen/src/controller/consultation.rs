//! Async consultation form controller.
//!
//! One task owns the [`ConsultationForm`], the in-flight submission future,
//! and the reset / notification timers. The submission is polled on the same
//! task, so a teardown drops it together with every pending timer.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::controller::submitter::{SubmissionError, Submitter};
use crate::controller::timer::{TimerQueue, sleep_until_deadline};
use crate::controller::{COMMAND_BUFFER, ControllerClosed};
use crate::core::consultation::{ConsultationError, ConsultationForm};
use crate::core::types::{FormField, FormFields, Notification, NotificationKind, Phase};

pub const SUCCESS_TITLE: &str = "Consultation request submitted";
pub const SUCCESS_DESCRIPTION: &str = "We'll get back to you within 24 hours.";
pub const FAILURE_TITLE: &str = "Submission failed";

/// Published view of the form: values, phase, and live notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationSnapshot {
    pub fields: FormFields,
    #[serde(flatten)]
    pub phase: Phase,
    pub notifications: Vec<Notification>,
}

impl ConsultationSnapshot {
    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn is_submitted(&self) -> bool {
        self.phase == Phase::Submitted
    }
}

/// Delays applied after the submitter answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsultationTimings {
    /// Time the acknowledgement stays up before the form resets.
    pub reset_after: Duration,
    /// Display window of each notification.
    pub notification: Duration,
}

impl Default for ConsultationTimings {
    fn default() -> Self {
        Self {
            reset_after: Duration::from_millis(3_000),
            notification: Duration::from_millis(5_000),
        }
    }
}

type SubmitFuture = Pin<Box<dyn Future<Output = Result<(), SubmissionError>> + Send>>;

enum Command {
    UpdateField {
        field: FormField,
        value: String,
        reply: oneshot::Sender<Result<(), ConsultationError>>,
    },
    Submit {
        reply: oneshot::Sender<Result<(), ConsultationError>>,
    },
    Snapshot {
        reply: oneshot::Sender<ConsultationSnapshot>,
    },
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    Reset,
    Dismiss(u64),
}

/// Handle to a running consultation form. Dropping it cancels everything
/// still pending.
pub struct ConsultationController {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<ConsultationSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl ConsultationController {
    /// Start a form that offers `services` and hands requests to `submitter`.
    /// Must be called inside a tokio runtime.
    pub fn spawn(
        submitter: Arc<dyn Submitter>,
        services: Vec<String>,
        timings: ConsultationTimings,
    ) -> Self {
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshots) = watch::channel(ConsultationSnapshot::default());

        let task = ConsultationTask {
            form: ConsultationForm::new(),
            notifications: Vec::new(),
            next_notification: 1,
            services,
            timings,
            submitter,
            in_flight: None,
            timers: TimerQueue::new(),
            snapshots: snapshot_tx,
        };
        let task = tokio::spawn(task.run(rx));

        Self {
            commands,
            snapshots,
            task: Some(task),
        }
    }

    pub async fn update_field(
        &self,
        field: FormField,
        value: impl Into<String>,
    ) -> Result<(), ConsultationError> {
        let (reply, rx) = oneshot::channel();
        let command = Command::UpdateField {
            field,
            value: value.into(),
            reply,
        };
        self.request(command, rx).await?
    }

    /// Validate and start a submission. Returns once the form is
    /// `Submitting`; completion is observed through snapshots.
    pub async fn submit(&self) -> Result<(), ConsultationError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Submit { reply }, rx).await?
    }

    /// Current state, after any transition that is already due.
    pub async fn snapshot(&self) -> Result<ConsultationSnapshot, ControllerClosed> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Snapshot { reply })
            .await
            .map_err(|_| ControllerClosed)?;
        rx.await.map_err(|_| ControllerClosed)
    }

    /// Last published state, without a round trip to the task.
    pub fn current(&self) -> ConsultationSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConsultationSnapshot> {
        self.snapshots.clone()
    }

    /// Stop the task and wait for it. Pending timers and any in-flight
    /// submission are dropped.
    pub async fn shutdown(mut self) {
        let _ = self.commands.send(Command::Shutdown).await;
        if let Some(task) = self.task.take()
            && let Err(err) = task.await
        {
            warn!(error = %err, "consultation task did not stop cleanly");
        }
    }

    async fn request<T>(
        &self,
        command: Command,
        rx: oneshot::Receiver<T>,
    ) -> Result<T, ConsultationError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ConsultationError::Closed)?;
        rx.await.map_err(|_| ConsultationError::Closed)
    }
}

impl Drop for ConsultationController {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct ConsultationTask {
    form: ConsultationForm,
    notifications: Vec<Notification>,
    next_notification: u64,
    services: Vec<String>,
    timings: ConsultationTimings,
    submitter: Arc<dyn Submitter>,
    in_flight: Option<SubmitFuture>,
    timers: TimerQueue<Timer>,
    snapshots: watch::Sender<ConsultationSnapshot>,
}

impl ConsultationTask {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        loop {
            let deadline = self.timers.next_deadline();
            tokio::select! {
                biased;
                _ = sleep_until_deadline(deadline) => self.fire_due(),
                result = poll_in_flight(&mut self.in_flight) => {
                    self.in_flight = None;
                    self.finish_submit(result);
                }
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
            }
        }
        let cancelled = self.timers.cancel_all();
        let aborted = self.in_flight.take().is_some();
        debug!(cancelled, aborted, "consultation controller stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::UpdateField {
                field,
                value,
                reply,
            } => {
                let result = self.form.update_field(field, value);
                if result.is_ok() {
                    self.publish();
                }
                let _ = reply.send(result);
            }
            Command::Submit { reply } => {
                let result = self.begin_submit();
                let _ = reply.send(result);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            Command::Shutdown => {}
        }
    }

    fn begin_submit(&mut self) -> Result<(), ConsultationError> {
        let request = self.form.begin_submit(&self.services)?;
        let submitter = Arc::clone(&self.submitter);
        self.in_flight = Some(Box::pin(
            async move { submitter.submit(&request).await },
        ));
        self.publish();
        Ok(())
    }

    fn finish_submit(&mut self, result: Result<(), SubmissionError>) {
        let (kind, title, description) = match &result {
            Ok(()) => (
                NotificationKind::Success,
                SUCCESS_TITLE,
                SUCCESS_DESCRIPTION.to_string(),
            ),
            Err(err) => (NotificationKind::Error, FAILURE_TITLE, err.message.clone()),
        };

        let succeeded = result.is_ok();
        if !self.form.finish_submit(result.map_err(|err| err.message)) {
            warn!("submission finished with no request pending");
            return;
        }

        if succeeded {
            info!("consultation request acknowledged");
            self.timers
                .schedule(Timer::Reset, Instant::now() + self.timings.reset_after);
        } else {
            warn!(reason = %description, "consultation request failed");
        }
        self.notify(kind, title, description);
        self.publish();
    }

    fn notify(&mut self, kind: NotificationKind, title: &str, description: String) {
        let id = self.next_notification;
        self.next_notification += 1;
        self.notifications.push(Notification {
            id,
            kind,
            title: title.to_string(),
            description,
            duration_ms: self.timings.notification.as_millis() as u64,
        });
        self.timers
            .schedule(Timer::Dismiss(id), Instant::now() + self.timings.notification);
    }

    fn fire_due(&mut self) {
        let mut changed = false;
        while let Some(timer) = self.timers.pop_due(Instant::now()) {
            match timer {
                Timer::Reset => changed |= self.form.reset(),
                Timer::Dismiss(id) => {
                    let before = self.notifications.len();
                    self.notifications.retain(|n| n.id != id);
                    changed |= self.notifications.len() != before;
                }
            }
        }
        if changed {
            self.publish();
        }
    }

    fn snapshot(&self) -> ConsultationSnapshot {
        ConsultationSnapshot {
            fields: self.form.fields().clone(),
            phase: self.form.phase().clone(),
            notifications: self.notifications.clone(),
        }
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        debug!(phase = snapshot.phase.name(), "consultation state published");
        self.snapshots.send_replace(snapshot);
    }
}

async fn poll_in_flight(slot: &mut Option<SubmitFuture>) -> Result<(), SubmissionError> {
    match slot.as_mut() {
        Some(future) => future.await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::submitter::SimulatedSubmitter;
    use crate::core::validation::Problem;
    use crate::test_support::{ScriptedSubmitter, fill_form, service_titles};

    async fn after(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    fn simulated() -> ConsultationController {
        ConsultationController::spawn(
            Arc::new(SimulatedSubmitter::new(Duration::from_millis(1_500))),
            service_titles(),
            ConsultationTimings::default(),
        )
    }

    /// Jane's request: submitting at once, submitted at 1.5 s, blank idle form
    /// at 4.5 s.
    #[tokio::test(start_paused = true)]
    async fn submit_runs_full_lifecycle() {
        let form = simulated();
        fill_form(&form, "Jane", "j@x.com", "555", "Tax Compliance", "")
            .await
            .expect("fill");

        form.submit().await.expect("submit");
        let state = form.snapshot().await.expect("snapshot");
        assert_eq!(state.phase, Phase::Submitting);
        assert_eq!(state.fields.name, "Jane");

        after(1_500).await;
        let state = form.snapshot().await.expect("snapshot");
        assert_eq!(state.phase, Phase::Submitted);
        assert_eq!(state.notifications.len(), 1);
        assert_eq!(state.notifications[0].title, SUCCESS_TITLE);
        assert_eq!(state.notifications[0].kind, NotificationKind::Success);

        after(3_000).await;
        let state = form.snapshot().await.expect("snapshot");
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.fields.is_blank());

        form.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn notification_outlives_reset_then_dismisses() {
        let form = simulated();
        fill_form(&form, "Jane", "j@x.com", "555", "", "")
            .await
            .expect("fill");
        form.submit().await.expect("submit");

        after(4_500).await;
        let state = form.snapshot().await.expect("snapshot");
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.notifications.len(), 1, "toast still visible");

        after(1_999).await;
        assert_eq!(form.snapshot().await.expect("snapshot").notifications.len(), 1);

        after(1).await;
        assert!(form.snapshot().await.expect("snapshot").notifications.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_request_never_leaves_idle() {
        let form = simulated();
        form.update_field(FormField::Email, "not-an-email")
            .await
            .expect("update");

        let err = form.submit().await.expect_err("invalid");
        let ConsultationError::Validation(validation) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(validation.has(FormField::Name, Problem::Required));
        assert!(validation.has(FormField::Email, Problem::MalformedEmail));
        assert_eq!(form.snapshot().await.expect("snapshot").phase, Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn edits_are_rejected_while_pending() {
        let form = simulated();
        fill_form(&form, "Jane", "j@x.com", "555", "", "")
            .await
            .expect("fill");
        form.submit().await.expect("submit");

        let err = form
            .update_field(FormField::Name, "John")
            .await
            .expect_err("locked");
        assert_eq!(
            err,
            ConsultationError::NotEditable {
                phase: "submitting"
            }
        );
        assert_eq!(
            form.submit().await,
            Err(ConsultationError::NotEditable {
                phase: "submitting"
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_submission_keeps_fields_and_retries() {
        let submitter = ScriptedSubmitter::new(
            Duration::from_millis(200),
            vec![Err(SubmissionError::new("gateway timeout")), Ok(())],
        );
        let form = ConsultationController::spawn(
            Arc::new(submitter.clone()),
            service_titles(),
            ConsultationTimings::default(),
        );
        fill_form(&form, "Jane", "j@x.com", "555", "", "call me")
            .await
            .expect("fill");

        form.submit().await.expect("submit");
        after(200).await;
        let state = form.snapshot().await.expect("snapshot");
        assert_eq!(
            state.phase,
            Phase::Failed {
                reason: "gateway timeout".to_string()
            }
        );
        assert_eq!(state.fields.message, "call me");
        assert_eq!(state.notifications[0].kind, NotificationKind::Error);

        after(10_000).await;
        let state = form.snapshot().await.expect("snapshot");
        assert!(matches!(state.phase, Phase::Failed { .. }), "no reset after failure");

        form.submit().await.expect("retry");
        after(200).await;
        assert_eq!(form.snapshot().await.expect("snapshot").phase, Phase::Submitted);
        assert_eq!(submitter.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drops_in_flight_submission() {
        let submitter = ScriptedSubmitter::new(Duration::from_millis(1_500), vec![Ok(())]);
        let form = ConsultationController::spawn(
            Arc::new(submitter.clone()),
            service_titles(),
            ConsultationTimings::default(),
        );
        let mut rx = form.subscribe();
        fill_form(&form, "Jane", "j@x.com", "555", "", "")
            .await
            .expect("fill");
        form.submit().await.expect("submit");
        let _ = rx.borrow_and_update();

        form.shutdown().await;
        after(5_000).await;

        assert!(rx.borrow().is_submitting(), "no transition after teardown");
        assert_eq!(submitter.completed(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_json_flattens_phase() {
        let form = simulated();
        form.update_field(FormField::Service, "Tax Compliance")
            .await
            .expect("update");
        let json = serde_json::to_value(form.current()).expect("serialize");
        assert_eq!(json["phase"], "idle");
        assert_eq!(json["fields"]["service"], "Tax Compliance");
        assert!(json["notifications"].as_array().expect("array").is_empty());
    }
}
