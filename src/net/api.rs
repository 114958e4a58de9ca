//! REST collaborators for the studio backend.
//!
//! Thin reqwest wrapper. Each resource gets an async trait so page flows can
//! be driven by mocks in tests; [`ApiClient`] implements all of them against
//! the real server.
//!
//! ERROR HANDLING
//! ==============
//! Non-success statuses become [`ApiError::Status`] with the server's
//! `{message}` when one is present; 401 is singled out as
//! [`ApiError::Unauthorized`]. Protected calls short-circuit with
//! [`ApiError::NotLoggedIn`] rather than sending an anonymous request.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use super::types::{
    ApiError, LoginRequest, MessageResponse, RegisterRequest, Session, SessionInformation, SessionPayload, Teacher,
    User,
};
use crate::config::{ClientConfig, Timeouts};
use crate::state::session::SessionStore;

// =============================================================================
// TRAITS
// =============================================================================

#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login`.
    async fn login(&self, request: &LoginRequest) -> Result<SessionInformation, ApiError>;

    /// `POST /auth/register`.
    async fn register(&self, request: &RegisterRequest) -> Result<MessageResponse, ApiError>;
}

#[async_trait::async_trait]
pub trait SessionApi: Send + Sync {
    async fn all(&self) -> Result<Vec<Session>, ApiError>;
    async fn detail(&self, id: i64) -> Result<Session, ApiError>;
    async fn create(&self, payload: &SessionPayload) -> Result<Session, ApiError>;
    async fn update(&self, id: i64, payload: &SessionPayload) -> Result<Session, ApiError>;
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
    /// `POST /session/{id}/participate/{user_id}`.
    async fn participate(&self, id: i64, user_id: i64) -> Result<(), ApiError>;
    /// `DELETE /session/{id}/participate/{user_id}`.
    async fn un_participate(&self, id: i64, user_id: i64) -> Result<(), ApiError>;
}

#[async_trait::async_trait]
pub trait TeacherApi: Send + Sync {
    async fn all(&self) -> Result<Vec<Teacher>, ApiError>;
    async fn detail(&self, id: i64) -> Result<Teacher, ApiError>;
}

#[async_trait::async_trait]
pub trait UserApi: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<User, ApiError>;
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
}

// =============================================================================
// ENDPOINTS
// =============================================================================

fn session_endpoint(id: i64) -> String {
    format!("session/{id}")
}

fn participate_endpoint(id: i64, user_id: i64) -> String {
    format!("session/{id}/participate/{user_id}")
}

fn teacher_endpoint(id: i64) -> String {
    format!("teacher/{id}")
}

fn user_endpoint(id: i64) -> String {
    format!("user/{id}")
}

/// Map a non-success response to an error, preferring the server's message.
fn status_error(status: u16, body: &str) -> ApiError {
    if status == 401 {
        return ApiError::Unauthorized;
    }
    let message = serde_json::from_str::<MessageResponse>(body)
        .map(|m| m.message)
        .unwrap_or_else(|_| body.trim().to_owned());
    ApiError::Status { status, message }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client bound to one backend and one session store.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<SessionStore>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeouts: Timeouts, store: Arc<SessionStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned(), store })
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig, store: Arc<SessionStore>) -> Result<Self, ApiError> {
        Self::new(&config.api_url, config.timeouts, store)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "api request");
        self.http.request(method, self.url(path))
    }

    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let bearer = self.store.bearer().ok_or(ApiError::NotLoggedIn)?;
        Ok(self.request(method, path).header(AUTHORIZATION, bearer))
    }

    /// Send and return the body text of a successful response.
    async fn send(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        if !(200..300).contains(&status) {
            tracing::warn!(status, "api request rejected");
            return Err(status_error(status, &body));
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.send(self.authorized(Method::GET, path)?).await?;
        parse_json(&body)
    }
}

#[async_trait::async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, request: &LoginRequest) -> Result<SessionInformation, ApiError> {
        let body = self
            .send(self.request(Method::POST, "auth/login").json(request))
            .await?;
        parse_json(&body)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<MessageResponse, ApiError> {
        let body = self
            .send(self.request(Method::POST, "auth/register").json(request))
            .await?;
        if body.trim().is_empty() {
            return Ok(MessageResponse::default());
        }
        parse_json(&body)
    }
}

#[async_trait::async_trait]
impl SessionApi for ApiClient {
    async fn all(&self) -> Result<Vec<Session>, ApiError> {
        self.get_json("session").await
    }

    async fn detail(&self, id: i64) -> Result<Session, ApiError> {
        self.get_json(&session_endpoint(id)).await
    }

    async fn create(&self, payload: &SessionPayload) -> Result<Session, ApiError> {
        let body = self
            .send(self.authorized(Method::POST, "session")?.json(payload))
            .await?;
        parse_json(&body)
    }

    async fn update(&self, id: i64, payload: &SessionPayload) -> Result<Session, ApiError> {
        let body = self
            .send(self.authorized(Method::PUT, &session_endpoint(id))?.json(payload))
            .await?;
        parse_json(&body)
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.send(self.authorized(Method::DELETE, &session_endpoint(id))?)
            .await?;
        Ok(())
    }

    async fn participate(&self, id: i64, user_id: i64) -> Result<(), ApiError> {
        self.send(self.authorized(Method::POST, &participate_endpoint(id, user_id))?)
            .await?;
        Ok(())
    }

    async fn un_participate(&self, id: i64, user_id: i64) -> Result<(), ApiError> {
        self.send(self.authorized(Method::DELETE, &participate_endpoint(id, user_id))?)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TeacherApi for ApiClient {
    async fn all(&self) -> Result<Vec<Teacher>, ApiError> {
        self.get_json("teacher").await
    }

    async fn detail(&self, id: i64) -> Result<Teacher, ApiError> {
        self.get_json(&teacher_endpoint(id)).await
    }
}

#[async_trait::async_trait]
impl UserApi for ApiClient {
    async fn get_by_id(&self, id: i64) -> Result<User, ApiError> {
        self.get_json(&user_endpoint(id)).await
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.send(self.authorized(Method::DELETE, &user_endpoint(id))?)
            .await?;
        Ok(())
    }
}
