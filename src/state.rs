//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the backend client behind the [`Backend`] trait and the server-side
//! session store. Clone is required by Axum; every field is cheap to clone.

use std::sync::Arc;

use crate::backend::Backend;
use crate::services::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub sessions: SessionStore,
    /// Mark the session cookie `Secure`.
    pub cookie_secure: bool,
}

impl AppState {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, cookie_secure: bool) -> Self {
        Self { backend, sessions: SessionStore::new(), cookie_secure }
    }
}

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;
