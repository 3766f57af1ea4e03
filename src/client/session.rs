//! Session state shared by every API call.
//!
//! The session owns the in-memory bearer token slot. The durable
//! [`TokenStore`] is only a mirror: it is read once at hydration and written
//! on login, logout and expiry. Lifecycle changes are broadcast as
//! [`SessionEvent`]s so the hosting application decides how to react
//! (navigate to the login surface, print a hint, ...).

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;

use crate::client::storage::{StorageError, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

const EVENT_CAPACITY: usize = 16;

/// Session lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn,
    LoggedOut,
    /// The upstream rejected the token. Credentials are already wiped when this
    /// is observed; `redirect_to` is set when the environment navigates to a
    /// login surface.
    Expired { redirect_to: Option<String> },
}

/// Explicitly owned session: token slot, durable mirror and event channel.
pub struct Session {
    token: RwLock<Option<String>>,
    store: Arc<dyn TokenStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// A logged-out session over the given store.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            token: RwLock::new(None),
            store,
            events,
        }
    }

    /// Re-hydrate the token slot from durable storage.
    pub fn hydrate(store: Arc<dyn TokenStore>) -> Result<Self, StorageError> {
        let token = store.get(ACCESS_TOKEN_KEY)?.filter(|t| !t.is_empty());
        let session = Self::new(store);
        if token.is_some() {
            tracing::debug!("Session hydrated from token store");
        }
        *session.slot_mut() = token;
        Ok(session)
    }

    fn slot_mut(&self) -> std::sync::RwLockWriteGuard<'_, Option<String>> {
        self.token.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Replace the in-memory token only. Durable storage is untouched.
    pub fn set_token(&self, token: Option<String>) {
        *self.slot_mut() = token;
    }

    /// The refresh token mirrored in storage. No refresh flow consumes it.
    pub fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    /// Store tokens after a successful login: slot first, then the mirror.
    pub fn login(&self, access_token: &str, refresh_token: Option<&str>) -> Result<(), StorageError> {
        self.set_token(Some(access_token.to_string()));
        self.store.set(ACCESS_TOKEN_KEY, access_token)?;
        match refresh_token {
            Some(refresh) => self.store.set(REFRESH_TOKEN_KEY, refresh)?,
            None => self.store.remove(REFRESH_TOKEN_KEY)?,
        }
        self.emit(SessionEvent::LoggedIn);
        Ok(())
    }

    /// Explicit logout: clear the slot and both storage keys.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.set_token(None);
        let result = self.clear_store();
        self.emit(SessionEvent::LoggedOut);
        result
    }

    /// Session termination after an unauthorized response.
    ///
    /// Always clears the slot; storage failures are logged, never raised, so the
    /// caller still receives the original API error.
    pub fn expire(&self, redirect_to: Option<String>) {
        self.set_token(None);
        if let Err(e) = self.clear_store() {
            tracing::warn!(error = %e, "Failed to clear token store after 401");
        }
        tracing::info!(redirect_to = ?redirect_to, "Session expired");
        self.emit(SessionEvent::Expired { redirect_to });
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn clear_store(&self) -> Result<(), StorageError> {
        let access = self.store.remove(ACCESS_TOKEN_KEY);
        let refresh = self.store.remove(REFRESH_TOKEN_KEY);
        access.and(refresh)
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
