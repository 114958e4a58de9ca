//! Auth-session state for the current client user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SessionStore` is the single owner of "who is logged in right now". Route
//! guards read it point-in-time; the header and pages subscribe to it. It is
//! constructed once per running application and handed out by reference or
//! `Arc`; there is no global instance.
//!
//! DESIGN
//! ======
//! The only stored state is `Option<SessionInformation>`. The logged-in
//! boolean is derived from identity presence and never tracked separately, so
//! the two cannot drift apart. The identity is mirrored to session storage
//! under [`SESSION_STORAGE_KEY`] and rehydrated once at construction.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, Mutex, PoisonError};

use super::observable::{Observable, Subscription};
use super::storage::{MemoryStorage, SessionStorage, StorageError};
use crate::net::types::SessionInformation;

/// Storage key holding the serialized identity.
pub const SESSION_STORAGE_KEY: &str = "sessionInformation";

pub struct SessionStore {
    identity: Observable<Option<SessionInformation>>,
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    /// Build the store, rehydrating any identity persisted in `storage`.
    ///
    /// A missing, unreadable, or malformed stored value starts the store
    /// logged out; malformed values are also removed.
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let restored = restore(storage.as_ref());
        Self { identity: Observable::new(restored), storage }
    }

    /// Store backed by process memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Replace the current identity and notify observers.
    pub fn log_in(&self, identity: SessionInformation) {
        tracing::debug!(user_id = identity.id, admin = identity.admin, "session opened");
        if let Err(e) = persist(self.storage.as_ref(), &identity) {
            tracing::warn!(error = %e, "failed to persist session");
        }
        self.identity.set(Some(identity));
    }

    /// Clear the identity. Already logged out: nothing is emitted.
    pub fn log_out(&self) {
        if let Err(e) = self.storage.remove_item(SESSION_STORAGE_KEY) {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }
        if self.identity.with(Option::is_none) {
            return;
        }
        tracing::debug!("session closed");
        self.identity.set(None);
    }

    /// Live logged-in signal.
    #[must_use]
    pub fn is_logged(&self) -> LoggedSignal {
        LoggedSignal { identity: self.identity.clone() }
    }

    /// Current identity, if logged in.
    #[must_use]
    pub fn session_information(&self) -> Option<SessionInformation> {
        self.identity.get()
    }

    /// Identity cell, for observers that care about identity swaps and not
    /// just the boolean.
    #[must_use]
    pub fn identity(&self) -> &Observable<Option<SessionInformation>> {
        &self.identity
    }

    /// `false` when logged out.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.identity.with(|identity| identity.as_ref().is_some_and(|i| i.admin))
    }

    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.identity.with(|identity| identity.as_ref().map(|i| i.id))
    }

    /// `Authorization` header value for the current identity.
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.identity
            .with(|identity| identity.as_ref().map(SessionInformation::authorization))
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("logged", &self.identity.with(Option::is_some))
            .finish_non_exhaustive()
    }
}

/// Subscribable view of "an identity is present".
#[derive(Clone)]
pub struct LoggedSignal {
    identity: Observable<Option<SessionInformation>>,
}

impl LoggedSignal {
    /// Point-in-time value.
    #[must_use]
    pub fn get(&self) -> bool {
        self.identity.with(Option::is_some)
    }

    /// Receive the current value now, then each transition.
    ///
    /// Identity swaps that leave the boolean unchanged are not delivered.
    pub fn subscribe<F>(&self, f: F) -> Subscription
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let last: Mutex<Option<bool>> = Mutex::new(None);
        self.identity.subscribe(move |identity| {
            let logged = identity.is_some();
            {
                let mut last = last.lock().unwrap_or_else(PoisonError::into_inner);
                if *last == Some(logged) {
                    return;
                }
                *last = Some(logged);
            }
            f(logged);
        })
    }
}

fn restore(storage: &dyn SessionStorage) -> Option<SessionInformation> {
    let raw = match storage.get_item(SESSION_STORAGE_KEY) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read persisted session");
            return None;
        }
    };
    match serde_json::from_str::<SessionInformation>(&raw) {
        Ok(identity) => {
            tracing::debug!(user_id = identity.id, "session restored");
            Some(identity)
        }
        Err(e) => {
            tracing::warn!(error = %e, "discarding malformed persisted session");
            if let Err(e) = storage.remove_item(SESSION_STORAGE_KEY) {
                tracing::warn!(error = %e, "failed to remove malformed persisted session");
            }
            None
        }
    }
}

fn persist(storage: &dyn SessionStorage, identity: &SessionInformation) -> Result<(), StorageError> {
    let raw = serde_json::to_string(identity)?;
    storage.set_item(SESSION_STORAGE_KEY, &raw)
}
