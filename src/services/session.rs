//! Session store and auth-state stream.
//!
//! ARCHITECTURE
//! ============
//! Sessions are issued and revoked by the backend's auth service. The portal
//! keeps each one server-side, keyed by a random token held in an `HttpOnly`
//! cookie, so access and refresh tokens never reach the browser.
//!
//! Sign-in, token refresh and sign-out publish an [`AuthEvent`] on a broadcast
//! channel. Interested tasks call [`SessionStore::subscribe`] and detach with
//! [`AuthSubscription::unsubscribe`] (or by dropping the subscription).
//!
//! Sessions whose browser never returns are evicted by a background sweep
//! once their access token has been expired for a grace window.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;

use rand::Rng;
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock, broadcast};
use uuid::Uuid;

use crate::backend::{Backend, Session};
use crate::config::SessionSweep;

const AUTH_EVENT_CAPACITY: usize = 64;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

// =============================================================================
// AUTH EVENTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEventKind {
    SignedIn,
    TokenRefreshed,
    SignedOut,
}

/// A change of authentication state for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub user_id: Uuid,
}

/// Receiving half of the auth-state stream.
pub struct AuthSubscription {
    rx: broadcast::Receiver<AuthEvent>,
}

impl AuthSubscription {
    /// Wait for the next event. Returns `None` once the store is gone.
    ///
    /// A subscriber that falls behind skips the events it missed.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "auth event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Stop receiving events.
    pub fn unsubscribe(self) {}
}

// =============================================================================
// STORE
// =============================================================================

/// In-memory session map shared by every request.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    /// One lock per cookie token with a refresh in flight.
    refresh_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
    events: broadcast::Sender<AuthEvent>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            refresh_locks: Arc::new(Mutex::new(HashMap::new())),
            events,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription { rx: self.events.subscribe() }
    }

    fn publish(&self, kind: AuthEventKind, user_id: Uuid) {
        // No subscribers is not an error.
        let _ = self.events.send(AuthEvent { kind, user_id });
    }

    /// Store a freshly signed-in session and return its cookie token.
    pub async fn create(&self, session: Session) -> String {
        let token = generate_token();
        let user_id = session.user.id;
        self.sessions.write().await.insert(token.clone(), session);
        self.publish(AuthEventKind::SignedIn, user_id);
        token
    }

    pub async fn get(&self, token: &str) -> Option<Session> {
        self.sessions.read().await.get(token).cloned()
    }

    /// Swap in a refreshed session under an existing token.
    ///
    /// Returns `false` without storing anything when the token was signed
    /// out in the meantime.
    pub async fn replace(&self, token: &str, session: Session) -> bool {
        let user_id = session.user.id;
        {
            let mut sessions = self.sessions.write().await;
            let Some(slot) = sessions.get_mut(token) else {
                return false;
            };
            *slot = session;
        }
        self.publish(AuthEventKind::TokenRefreshed, user_id);
        true
    }

    /// Drop a session, returning it if it existed.
    pub async fn remove(&self, token: &str) -> Option<Session> {
        let removed = self.sessions.write().await.remove(token);
        if let Some(session) = &removed {
            self.publish(AuthEventKind::SignedOut, session.user.id);
        }
        removed
    }

    /// Drop a session only if it still carries `refresh_token`.
    ///
    /// A session that was refreshed or replaced since the caller read it is
    /// left alone.
    pub async fn remove_if_unchanged(&self, token: &str, refresh_token: Option<&str>) -> bool {
        let removed = {
            let mut sessions = self.sessions.write().await;
            match sessions.get(token) {
                Some(current) if current.refresh_token.as_deref() == refresh_token => sessions.remove(token),
                _ => None,
            }
        };
        match removed {
            Some(session) => {
                self.publish(AuthEventKind::SignedOut, session.user.id);
                true
            }
            None => false,
        }
    }

    /// Drop every session whose access token expired more than `grace_secs`
    /// before `now`. Returns how many were dropped.
    pub async fn evict_expired(&self, now: i64, grace_secs: i64) -> usize {
        let evicted: Vec<Session> = {
            let mut sessions = self.sessions.write().await;
            let stale: Vec<String> = sessions
                .iter()
                .filter(|(_, session)| session.expires_at.saturating_add(grace_secs) < now)
                .map(|(token, _)| token.clone())
                .collect();
            stale.iter().filter_map(|token| sessions.remove(token)).collect()
        };
        for session in &evicted {
            self.publish(AuthEventKind::SignedOut, session.user.id);
        }
        evicted.len()
    }

    async fn refresh_lock(&self, token: &str) -> Arc<Mutex<()>> {
        Arc::clone(self.refresh_locks.lock().await.entry(token.to_owned()).or_default())
    }

    /// Forget the token's refresh lock unless a later refresh already replaced it.
    async fn release_refresh_lock(&self, token: &str, lock: &Arc<Mutex<()>>) {
        let mut locks = self.refresh_locks.lock().await;
        if locks.get(token).is_some_and(|current| Arc::ptr_eq(current, lock)) {
            locks.remove(token);
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve the session behind a cookie token, refreshing it when expired.
///
/// Refreshes are single-flight per token: concurrent requests carrying the
/// same expired cookie wait for the first refresh and reuse its result. A
/// session whose refresh fails (or that has no refresh token) is dropped and
/// treated as signed out.
pub async fn current_session(backend: &dyn Backend, store: &SessionStore, token: &str, now: i64) -> Option<Session> {
    let session = store.get(token).await?;
    if !session.is_expired_at(now) {
        return Some(session);
    }

    let lock = store.refresh_lock(token).await;
    let refreshed = {
        let _guard = lock.lock().await;
        refresh_locked(backend, store, token, now).await
    };
    store.release_refresh_lock(token, &lock).await;
    refreshed
}

/// Refresh step run while holding the token's refresh lock.
async fn refresh_locked(backend: &dyn Backend, store: &SessionStore, token: &str, now: i64) -> Option<Session> {
    // Another request may have refreshed (or signed out) while we waited.
    let session = store.get(token).await?;
    if !session.is_expired_at(now) {
        return Some(session);
    }

    let Some(refresh_token) = session.refresh_token.as_deref() else {
        tracing::info!(user_id = %session.user.id, "session expired without refresh token");
        store.remove_if_unchanged(token, None).await;
        return None;
    };

    match backend.refresh_session(refresh_token).await {
        Ok(refreshed) => {
            if store.replace(token, refreshed.clone()).await {
                Some(refreshed)
            } else {
                tracing::info!(user_id = %session.user.id, "session signed out during refresh");
                None
            }
        }
        Err(e) => {
            tracing::error!(error = %e, user_id = %session.user.id, "session refresh failed");
            store.remove_if_unchanged(token, Some(refresh_token)).await;
            None
        }
    }
}

/// Log every auth-state change until the store shuts down.
pub fn spawn_auth_event_logger(store: &SessionStore) -> tokio::task::JoinHandle<()> {
    let mut subscription = store.subscribe();
    tokio::spawn(async move {
        while let Some(event) = subscription.recv().await {
            tracing::info!(kind = ?event.kind, user_id = %event.user_id, "auth state changed");
        }
        subscription.unsubscribe();
    })
}

/// Periodically evict sessions whose browser never came back.
pub fn spawn_session_sweeper(store: &SessionStore, sweep: SessionSweep) -> tokio::task::JoinHandle<()> {
    let store = store.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(sweep.interval_secs.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let now = OffsetDateTime::now_utc().unix_timestamp();
            let evicted = store.evict_expired(now, sweep.grace_secs).await;
            if evicted > 0 {
                tracing::info!(evicted, "evicted stale sessions");
            }
        }
    })
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
