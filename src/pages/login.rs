//! Login page flow.
//!
//! A successful login is the only place an identity enters the session store.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use crate::net::api::AuthApi;
use crate::net::types::{ApiError, LoginRequest};
use crate::router::Route;
use crate::state::session::SessionStore;

#[derive(Debug)]
pub enum LoginOutcome {
    /// Identity stored; continue to `redirect`.
    LoggedIn { redirect: Route },
    /// Authentication failed; the page shows its error banner. The store is
    /// left untouched.
    Failed(ApiError),
}

impl LoginOutcome {
    /// Whether the page should show "An error occurred".
    #[must_use]
    pub fn on_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

pub async fn submit(auth: &dyn AuthApi, store: &SessionStore, request: &LoginRequest) -> LoginOutcome {
    match auth.login(request).await {
        Ok(identity) => {
            tracing::info!(user_id = identity.id, "logged in");
            store.log_in(identity);
            LoginOutcome::LoggedIn { redirect: Route::Sessions }
        }
        Err(e) => {
            tracing::warn!(error = %e, "login failed");
            LoginOutcome::Failed(e)
        }
    }
}
