//! Registration page flow. Registering never logs the user in.

#[cfg(test)]
#[path = "register_test.rs"]
mod register_test;

use crate::net::api::AuthApi;
use crate::net::types::{ApiError, RegisterRequest};
use crate::router::Route;

#[derive(Debug)]
pub enum RegisterOutcome {
    Registered { message: String, redirect: Route },
    Failed(ApiError),
}

impl RegisterOutcome {
    #[must_use]
    pub fn on_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

pub async fn submit(auth: &dyn AuthApi, request: &RegisterRequest) -> RegisterOutcome {
    match auth.register(request).await {
        Ok(response) => {
            tracing::info!(email = %request.email, "account registered");
            RegisterOutcome::Registered { message: response.message, redirect: Route::Login }
        }
        Err(e) => {
            tracing::warn!(error = %e, "registration failed");
            RegisterOutcome::Failed(e)
        }
    }
}
