//! Shared application state: site config, content, and live page sessions.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use lawxygen::content::SiteContent;
use lawxygen::controller::PageControllers;
use lawxygen::io::config::{SiteConfig, load_config};
use lawxygen::render::PageRenderer;

use crate::error::{ApiError, ErrorCode};

/// Longest gap between two idle-session sweeps.
const MAX_REAP_INTERVAL: Duration = Duration::from_secs(60);

/// One rendered page and its controllers.
struct Session {
    page: Arc<PageControllers>,
    last_seen: Instant,
    /// Open event streams. A watched session is never idle.
    streams: usize,
}

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// File the config watcher reloads from.
    pub config_path: PathBuf,
    config: Arc<RwLock<SiteConfig>>,
    pub content: Arc<SiteContent>,
    pub renderer: Arc<PageRenderer>,
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl AppState {
    pub fn new(config_path: PathBuf, config: SiteConfig, content: SiteContent) -> Self {
        Self {
            config_path,
            config: Arc::new(RwLock::new(config)),
            content: Arc::new(content),
            renderer: Arc::new(PageRenderer::new()),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> SiteConfig {
        match self.config.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Re-read the config file. Sessions opened afterwards use the new values;
    /// live sessions keep theirs.
    pub fn reload_config(&self) -> Result<()> {
        let config = load_config(&self.config_path)?;
        let mut current = self
            .config
            .write()
            .map_err(|_| anyhow!("config lock poisoned"))?;
        if *current != config {
            *current = config;
            info!(path = %self.config_path.display(), "config reloaded");
        }
        Ok(())
    }

    /// Start controllers for a new page view.
    ///
    /// Returns `None` once `server.max_sessions` are live; the page is then
    /// served without interactive state.
    pub fn open_session(&self) -> Result<Option<(Uuid, Arc<PageControllers>)>, ApiError> {
        let config = self.config();
        let mut sessions = self.lock_sessions();
        if sessions.len() >= config.server.max_sessions {
            warn!(live = sessions.len(), "session limit reached, serving static page");
            return Ok(None);
        }

        let page = PageControllers::open(
            &config,
            &self.content,
            PageControllers::simulated_submitter(&config),
        )
        .map_err(|err| ApiError::new(ErrorCode::Unavailable, err.to_string()))?;
        let page = Arc::new(page);
        let id = Uuid::new_v4();
        sessions.insert(
            id,
            Session {
                page: Arc::clone(&page),
                last_seen: Instant::now(),
                streams: 0,
            },
        );
        info!(session = %id, live = sessions.len(), "session opened");
        Ok(Some((id, page)))
    }

    /// Controllers of a live session. Counts as activity.
    pub fn session(&self, id: Uuid) -> Result<Arc<PageControllers>, ApiError> {
        let mut sessions = self.lock_sessions();
        let session = sessions.get_mut(&id).ok_or_else(ApiError::session_not_found)?;
        session.last_seen = Instant::now();
        Ok(Arc::clone(&session.page))
    }

    /// Controllers of a live session plus a lease that keeps it from being
    /// reaped until dropped.
    pub fn attach_stream(&self, id: Uuid) -> Result<(Arc<PageControllers>, StreamLease), ApiError> {
        let mut sessions = self.lock_sessions();
        let session = sessions.get_mut(&id).ok_or_else(ApiError::session_not_found)?;
        session.streams += 1;
        session.last_seen = Instant::now();
        let lease = StreamLease {
            state: self.clone(),
            id,
        };
        Ok((Arc::clone(&session.page), lease))
    }

    fn detach_stream(&self, id: Uuid) {
        if let Some(session) = self.lock_sessions().get_mut(&id) {
            session.streams = session.streams.saturating_sub(1);
            session.last_seen = Instant::now();
            debug!(session = %id, streams = session.streams, "event stream closed");
        }
    }

    pub fn session_count(&self) -> usize {
        self.lock_sessions().len()
    }

    /// Tear a session down. Returns false if it was not live.
    pub async fn close_session(&self, id: Uuid) -> bool {
        let removed = self.lock_sessions().remove(&id);
        match removed {
            Some(session) => {
                shutdown(session.page).await;
                info!(session = %id, "session closed");
                true
            }
            None => false,
        }
    }

    /// Close every session idle for longer than `server.session_idle_secs`.
    pub async fn reap_idle(&self) -> usize {
        let idle = self.idle_timeout();
        let now = Instant::now();
        let expired: Vec<(Uuid, Session)> = {
            let mut sessions = self.lock_sessions();
            let ids: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, s)| s.streams == 0 && now.duration_since(s.last_seen) > idle)
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| sessions.remove(&id).map(|s| (id, s)))
                .collect()
        };

        let count = expired.len();
        for (id, session) in expired {
            debug!(session = %id, "reaping idle session");
            shutdown(session.page).await;
        }
        if count > 0 {
            info!(count, "idle sessions closed");
        }
        count
    }

    fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.config().server.session_idle_secs)
    }

    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Session>> {
        match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Held by an open event stream; the idle clock restarts when it drops.
pub struct StreamLease {
    state: AppState,
    id: Uuid,
}

impl Drop for StreamLease {
    fn drop(&mut self) {
        self.state.detach_stream(self.id);
    }
}

/// Stop the controllers now if no request still holds them; otherwise the
/// last holder's drop aborts them.
async fn shutdown(page: Arc<PageControllers>) {
    match Arc::try_unwrap(page) {
        Ok(page) => page.shutdown().await,
        Err(_) => debug!("session still in use, controllers stop on last drop"),
    }
}

/// Periodically close idle sessions.
pub fn start_session_reaper(state: AppState) {
    tokio::spawn(async move {
        let period = state.idle_timeout().min(MAX_REAP_INTERVAL);
        let mut tick = tokio::time::interval(period);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tick.tick().await;
            state.reap_idle().await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use lawxygen::test_support::TempSite;

    fn state_with(config: SiteConfig) -> AppState {
        AppState::new(PathBuf::from("site.toml"), config, SiteContent::lawxygen())
    }

    fn open(state: &AppState) -> Uuid {
        match state.open_session() {
            Ok(Some((id, _))) => id,
            Ok(None) => panic!("session limit reached"),
            Err(err) => panic!("open failed: {}", err.message),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn idle_sessions_are_reaped() {
        let mut config = SiteConfig::default();
        config.server.session_idle_secs = 60;
        let state = state_with(config);

        let stale = open(&state);
        tokio::time::sleep(Duration::from_secs(45)).await;
        let fresh = open(&state);
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(state.reap_idle().await, 1);
        assert!(state.session(stale).is_err());
        assert!(state.session(fresh).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn activity_keeps_session_alive() {
        let mut config = SiteConfig::default();
        config.server.session_idle_secs = 60;
        let state = state_with(config);

        let id = open(&state);
        tokio::time::sleep(Duration::from_secs(50)).await;
        state.session(id).expect("touch");
        tokio::time::sleep(Duration::from_secs(50)).await;

        assert_eq!(state.reap_idle().await, 0);
        assert_eq!(state.session_count(), 1);
    }

    #[tokio::test]
    async fn session_limit_is_enforced() {
        let mut config = SiteConfig::default();
        config.server.max_sessions = 1;
        let state = state_with(config);

        let id = open(&state);
        assert!(matches!(state.open_session(), Ok(None)), "limit reached");
        assert_eq!(state.session_count(), 1);

        assert!(state.close_session(id).await);
        assert!(!state.close_session(id).await);
        open(&state);
    }

    #[tokio::test(start_paused = true)]
    async fn open_event_stream_keeps_session_alive() {
        let mut config = SiteConfig::default();
        config.server.session_idle_secs = 60;
        let state = state_with(config);
        let id = open(&state);

        let lease = match state.attach_stream(id) {
            Ok((_, lease)) => lease,
            Err(err) => panic!("attach failed: {}", err.message),
        };
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(state.reap_idle().await, 0, "watched session survives");

        drop(lease);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(state.reap_idle().await, 0, "idle clock restarted on detach");
        assert!(state.session(id).is_ok());

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(state.reap_idle().await, 1);
    }

    #[tokio::test]
    async fn reload_applies_to_new_sessions() {
        let site = TempSite::new(&SiteConfig::default()).expect("site");
        let state = AppState::new(
            site.config_path.clone(),
            SiteConfig::default(),
            SiteContent::lawxygen(),
        );

        let mut edited = SiteConfig::default();
        edited.carousel.transition_ms = 250;
        lawxygen::io::config::write_config(&site.config_path, &edited).expect("write");
        state.reload_config().expect("reload");

        assert_eq!(state.config().carousel.transition_ms, 250);
    }

    #[tokio::test]
    async fn reload_keeps_old_config_on_error() {
        let site = TempSite::new(&SiteConfig::default()).expect("site");
        let state = AppState::new(
            site.config_path.clone(),
            SiteConfig::default(),
            SiteContent::lawxygen(),
        );

        std::fs::write(&site.config_path, "[carousel]\ntransition_ms = 0\n").expect("write");
        assert!(state.reload_config().is_err());
        assert_eq!(state.config(), SiteConfig::default());
    }
}
