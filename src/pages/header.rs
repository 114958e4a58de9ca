//! Top navigation bar.
//!
//! SYSTEM CONTEXT
//! ==============
//! The header is the canonical reactive consumer of the session store: it
//! subscribes to the logged-in signal and swaps its link set on every
//! transition, without ever reading the identity itself.

#[cfg(test)]
#[path = "header_test.rs"]
mod header_test;

use std::sync::{Arc, Mutex, PoisonError};

use crate::router::Route;
use crate::state::observable::Subscription;
use crate::state::session::SessionStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavLink {
    Go { label: &'static str, route: Route },
    Logout,
}

impl NavLink {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Go { label, .. } => *label,
            Self::Logout => "Logout",
        }
    }
}

/// Links shown for the given logged-in state.
#[must_use]
pub fn nav_links(logged: bool) -> Vec<NavLink> {
    if logged {
        vec![
            NavLink::Go { label: "Sessions", route: Route::Sessions },
            NavLink::Go { label: "Account", route: Route::Me },
            NavLink::Logout,
        ]
    } else {
        vec![
            NavLink::Go { label: "Login", route: Route::Login },
            NavLink::Go { label: "Register", route: Route::Register },
        ]
    }
}

/// Header bound to a store for as long as it lives.
pub struct Header {
    links: Arc<Mutex<Vec<NavLink>>>,
    _subscription: Subscription,
}

impl Header {
    #[must_use]
    pub fn attach(store: &SessionStore) -> Self {
        let links = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&links);
        let subscription = store.is_logged().subscribe(move |logged| {
            *sink.lock().unwrap_or_else(PoisonError::into_inner) = nav_links(logged);
        });
        Self { links, _subscription: subscription }
    }

    #[must_use]
    pub fn links(&self) -> Vec<NavLink> {
        self.links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Logout link handler.
pub fn logout(store: &SessionStore) -> Route {
    store.log_out();
    Route::Home
}
