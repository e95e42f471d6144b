//! Async carousel controller.
//!
//! One task owns the [`CarouselState`] and the lock-release timer. Intents
//! arrive over a command channel; snapshots are published on a watch channel
//! after every change.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::controller::timer::{TimerQueue, sleep_until_deadline};
use crate::controller::{COMMAND_BUFFER, ControllerClosed};
use crate::core::carousel::{CarouselError, CarouselState, NavOutcome, Navigation};

enum Command {
    Navigate {
        nav: Navigation,
        reply: oneshot::Sender<NavOutcome>,
    },
    Snapshot {
        reply: oneshot::Sender<CarouselState>,
    },
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    Unlock,
}

/// Handle to a running carousel. Dropping it cancels the pending unlock.
pub struct CarouselController {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<CarouselState>,
    task: Option<JoinHandle<()>>,
}

impl CarouselController {
    /// Start a carousel over `len` testimonials. Must be called inside a
    /// tokio runtime.
    pub fn spawn(len: usize, lock_window: Duration) -> Result<Self, CarouselError> {
        let state = CarouselState::new(len)?;
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshots) = watch::channel(state);

        let task = CarouselTask {
            state,
            lock_window,
            timers: TimerQueue::new(),
            snapshots: snapshot_tx,
        };
        let task = tokio::spawn(task.run(rx));

        Ok(Self {
            commands,
            snapshots,
            task: Some(task),
        })
    }

    pub async fn select_next(&self) -> Result<NavOutcome, ControllerClosed> {
        self.navigate(Navigation::Next).await
    }

    pub async fn select_prev(&self) -> Result<NavOutcome, ControllerClosed> {
        self.navigate(Navigation::Prev).await
    }

    pub async fn select_index(&self, index: usize) -> Result<NavOutcome, ControllerClosed> {
        self.navigate(Navigation::Select(index)).await
    }

    pub async fn navigate(&self, nav: Navigation) -> Result<NavOutcome, ControllerClosed> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Navigate { nav, reply })
            .await
            .map_err(|_| ControllerClosed)?;
        rx.await.map_err(|_| ControllerClosed)
    }

    /// Current state, after any transition that is already due.
    pub async fn snapshot(&self) -> Result<CarouselState, ControllerClosed> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Snapshot { reply })
            .await
            .map_err(|_| ControllerClosed)?;
        rx.await.map_err(|_| ControllerClosed)
    }

    /// Last published state, without a round trip to the task.
    pub fn current(&self) -> CarouselState {
        *self.snapshots.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<CarouselState> {
        self.snapshots.clone()
    }

    /// Stop the task and wait for it. Pending timers are cancelled.
    pub async fn shutdown(mut self) {
        let _ = self.commands.send(Command::Shutdown).await;
        if let Some(task) = self.task.take()
            && let Err(err) = task.await
        {
            warn!(error = %err, "carousel task did not stop cleanly");
        }
    }
}

impl Drop for CarouselController {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct CarouselTask {
    state: CarouselState,
    lock_window: Duration,
    timers: TimerQueue<Timer>,
    snapshots: watch::Sender<CarouselState>,
}

impl CarouselTask {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        loop {
            let deadline = self.timers.next_deadline();
            tokio::select! {
                biased;
                _ = sleep_until_deadline(deadline) => self.fire_due(),
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
            }
        }
        let cancelled = self.timers.cancel_all();
        debug!(cancelled, "carousel controller stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Navigate { nav, reply } => {
                let outcome = self.state.navigate(nav);
                if outcome.moved() {
                    self.timers
                        .schedule(Timer::Unlock, Instant::now() + self.lock_window);
                    self.publish();
                }
                let _ = reply.send(outcome);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.state);
            }
            Command::Shutdown => {}
        }
    }

    fn fire_due(&mut self) {
        while let Some(timer) = self.timers.pop_due(Instant::now()) {
            match timer {
                Timer::Unlock => {
                    if self.state.release() {
                        debug!(active = self.state.active_index(), "carousel unlocked");
                        self.publish();
                    }
                }
            }
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.state);
    }
}
