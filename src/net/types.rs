//! Wire DTOs for the studio REST API.
//!
//! DESIGN
//! ======
//! Field names mirror the backend JSON exactly (camelCase, except the
//! session's `teacher_id`), so serde round-trips stay lossless. Timestamps
//! are kept as the server's strings; the client never does date arithmetic.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by REST collaborator calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, I/O).
    #[error("request failed: {0}")]
    Request(String),

    /// A protected call was attempted with no identity in the session store.
    #[error("not logged in")]
    NotLoggedIn,

    /// The server rejected the credentials (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// The server returned any other non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// AUTH
// =============================================================================

/// The authenticated session record returned by `POST /auth/login`.
///
/// Immutable once received: a new login replaces it wholesale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInformation {
    /// Opaque bearer credential.
    pub token: String,
    /// Credential kind, e.g. `"Bearer"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub admin: bool,
}

impl SessionInformation {
    /// Value for the `Authorization` header, e.g. `"Bearer abc123"`.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("{} {}", self.kind, self.token)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Generic `{ "message": ... }` body used by register and error responses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// =============================================================================
// RESOURCES
// =============================================================================

/// A yoga session as returned by `GET /session`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: i64,
    pub name: String,
    pub date: String,
    #[serde(rename = "teacher_id")]
    pub teacher_id: i64,
    pub description: String,
    /// Ids of participating users.
    #[serde(default)]
    pub users: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Body for session create/update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    pub name: String,
    pub date: String,
    pub teacher_id: i64,
    pub description: String,
    #[serde(default)]
    pub users: Vec<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A user account as returned by `GET /user/{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub admin: bool,
    /// Never echoed back out of the client.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}
