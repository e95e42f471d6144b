//! Server-Sent Events stream per session, and the config file watcher.

use std::convert::Infallible;
use std::path::{Path as FsPath, PathBuf};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use notify::{Event as NotifyEvent, EventKind, PollWatcher, RecursiveMode, Watcher};
use serde_json::json;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use lawxygen::controller::ConsultationSnapshot;
use lawxygen::core::carousel::CarouselState;

use crate::error::ApiError;
use crate::state::{AppState, StreamLease};

const KEEP_ALIVE: Duration = Duration::from_secs(15);

/// A snapshot published by one of a session's controllers.
#[derive(Debug, Clone, PartialEq)]
enum SessionUpdate {
    Carousel(CarouselState),
    Consultation(ConsultationSnapshot),
}

impl SessionUpdate {
    fn name(&self) -> &'static str {
        match self {
            SessionUpdate::Carousel(_) => "carousel",
            SessionUpdate::Consultation(_) => "consultation",
        }
    }

    fn into_event(self) -> Option<Event> {
        let data = match &self {
            SessionUpdate::Carousel(state) => serde_json::to_string(state),
            SessionUpdate::Consultation(snapshot) => serde_json::to_string(snapshot),
        };
        match data {
            Ok(json) => Some(Event::default().event(self.name()).data(json)),
            Err(err) => {
                warn!(error = %err, event = self.name(), "failed to encode SSE payload");
                None
            }
        }
    }
}

/// Current state of both controllers, then every change, until the session
/// is torn down. The lease is held for as long as the stream lives.
fn session_updates(
    lease: StreamLease,
    mut carousel: watch::Receiver<CarouselState>,
    mut consultation: watch::Receiver<ConsultationSnapshot>,
) -> impl Stream<Item = SessionUpdate> {
    async_stream::stream! {
        let _lease = lease;
        // Copy out before yielding; a watch::Ref must not live across a yield.
        let initial_carousel = *carousel.borrow_and_update();
        let initial_consultation = consultation.borrow_and_update().clone();
        yield SessionUpdate::Carousel(initial_carousel);
        yield SessionUpdate::Consultation(initial_consultation);

        loop {
            let update = tokio::select! {
                changed = carousel.changed() => match changed {
                    Ok(()) => {
                        let state = *carousel.borrow_and_update();
                        SessionUpdate::Carousel(state)
                    }
                    Err(_) => break,
                },
                changed = consultation.changed() => match changed {
                    Ok(()) => {
                        let snapshot = consultation.borrow_and_update().clone();
                        SessionUpdate::Consultation(snapshot)
                    }
                    Err(_) => break,
                },
            };
            yield update;
        }
    }
}

/// SSE endpoint handler.
pub async fn events_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let (carousel, consultation, lease) = {
        let (controllers, lease) = state.attach_stream(id)?;
        (
            controllers.carousel.subscribe(),
            controllers.consultation.subscribe(),
            lease,
        )
    };
    debug!(session = %id, "event stream opened");

    let connected = Event::default()
        .event("connected")
        .data(json!({ "session": id }).to_string());
    let updates = session_updates(lease, carousel, consultation).filter_map(|update| async move {
        update.into_event()
    });
    let stream = futures::stream::once(async move { connected })
        .chain(updates)
        .map(Ok);

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE).text("ping")))
}

/// Start the config file watcher in a background task.
pub fn start_config_watcher(state: AppState) {
    tokio::spawn(async move {
        if let Err(e) = run_config_watcher(state).await {
            warn!(error = %e, "config watcher failed");
        }
    });
}

async fn run_config_watcher(state: AppState) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel::<NotifyEvent>(100);

    let mut watcher = PollWatcher::new(
        move |res: Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.try_send(event);
            }
        },
        notify::Config::default().with_poll_interval(Duration::from_millis(500)),
    )?;

    // The file itself may not exist yet; watch its directory.
    let dir = watch_dir(&state.config_path);
    if !dir.exists() {
        warn!(path = %dir.display(), "config directory missing, not watching");
        return Ok(());
    }
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    info!(path = %state.config_path.display(), "watching config file");

    // Editors write in bursts; reload at most once per tick.
    let mut pending_events: Vec<NotifyEvent> = Vec::new();
    let mut flush_tick = tokio::time::interval(Duration::from_millis(250));
    flush_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            Some(event) = rx.recv() => {
                pending_events.push(event);
            }
            _ = flush_tick.tick() => {
                if pending_events.is_empty() {
                    continue;
                }
                if touches_config(&pending_events, &state.config_path)
                    && let Err(err) = state.reload_config()
                {
                    warn!(error = %format!("{:#}", err), "config reload rejected, keeping previous");
                }
                pending_events.clear();
            }
        }
    }
}

fn watch_dir(config_path: &FsPath) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Whether any create/modify event names the config file.
fn touches_config(events: &[NotifyEvent], config_path: &FsPath) -> bool {
    let Some(name) = config_path.file_name() else {
        return false;
    };
    events
        .iter()
        .filter(|event| matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)))
        .flat_map(|event| event.paths.iter())
        .any(|path| path.file_name() == Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lawxygen::content::SiteContent;
    use lawxygen::core::types::FormField;
    use lawxygen::io::config::SiteConfig;

    fn assert_send<T: Send>(_: &T) {}

    fn event(kind: EventKind, path: &str) -> NotifyEvent {
        NotifyEvent {
            kind,
            paths: vec![PathBuf::from(path)],
            attrs: Default::default(),
        }
    }

    #[test]
    fn config_modify_triggers_reload() {
        let events = [event(
            EventKind::Modify(notify::event::ModifyKind::Any),
            "./site.toml",
        )];
        assert!(touches_config(&events, FsPath::new("site.toml")));
    }

    #[test]
    fn unrelated_or_removed_files_are_ignored() {
        let events = [
            event(
                EventKind::Modify(notify::event::ModifyKind::Any),
                "/srv/site.toml.tmp",
            ),
            event(
                EventKind::Remove(notify::event::RemoveKind::File),
                "/srv/site.toml",
            ),
        ];
        assert!(!touches_config(&events, FsPath::new("/srv/site.toml")));
    }

    #[test]
    fn bare_file_name_watches_current_dir() {
        assert_eq!(watch_dir(FsPath::new("site.toml")), PathBuf::from("."));
        assert_eq!(watch_dir(FsPath::new("/srv/site.toml")), PathBuf::from("/srv"));
    }

    #[tokio::test(start_paused = true)]
    async fn updates_start_with_snapshots_and_end_with_session() {
        let state = AppState::new(
            PathBuf::from("site.toml"),
            SiteConfig::default(),
            SiteContent::lawxygen(),
        );
        let id = match state.open_session() {
            Ok(Some((id, _))) => id,
            _ => panic!("open session"),
        };
        let (page, lease) = match state.attach_stream(id) {
            Ok(attached) => attached,
            Err(err) => panic!("attach failed: {}", err.message),
        };
        let stream = session_updates(lease, page.carousel.subscribe(), page.consultation.subscribe());
        assert_send(&stream);
        futures::pin_mut!(stream);

        assert!(matches!(stream.next().await, Some(SessionUpdate::Carousel(s)) if s.active_index() == 0));
        assert!(matches!(stream.next().await, Some(SessionUpdate::Consultation(_))));

        page.carousel.select_next().await.expect("next");
        match stream.next().await {
            Some(SessionUpdate::Carousel(carousel)) => {
                assert_eq!(carousel.active_index(), 1);
                assert!(carousel.locked());
            }
            other => panic!("expected carousel update, got {other:?}"),
        }

        page.consultation
            .update_field(FormField::Name, "Jane")
            .await
            .expect("update");
        match stream.next().await {
            Some(SessionUpdate::Consultation(snapshot)) => assert_eq!(snapshot.fields.name, "Jane"),
            other => panic!("expected consultation update, got {other:?}"),
        }

        drop(page);
        assert!(state.close_session(id).await);
        assert_eq!(stream.next().await, None);
    }
}
