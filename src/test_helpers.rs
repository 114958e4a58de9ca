//! Fixtures and in-memory collaborators shared by unit tests.

use std::sync::Mutex;

use crate::net::api::{AuthApi, SessionApi, TeacherApi, UserApi};
use crate::net::types::{
    ApiError, LoginRequest, MessageResponse, RegisterRequest, Session, SessionInformation, SessionPayload, Teacher,
    User,
};

// =============================================================================
// IDENTITIES
// =============================================================================

#[must_use]
pub fn admin_identity() -> SessionInformation {
    SessionInformation {
        token: "abcd1234".into(),
        kind: "Bearer".into(),
        id: 99,
        username: "admin".into(),
        first_name: "Admin".into(),
        last_name: "User".into(),
        admin: true,
    }
}

#[must_use]
pub fn member_identity() -> SessionInformation {
    SessionInformation {
        token: "fake-token".into(),
        kind: "Bearer".into(),
        id: 1,
        username: "julio".into(),
        first_name: "Julio".into(),
        last_name: "Tester".into(),
        admin: false,
    }
}

// =============================================================================
// RESOURCES
// =============================================================================

#[must_use]
pub fn session(id: i64, users: Vec<i64>) -> Session {
    Session {
        id,
        name: "Yoga".into(),
        date: "2024-01-01".into(),
        teacher_id: 2,
        description: "Relax.".into(),
        users,
        created_at: None,
        updated_at: None,
    }
}

/// Session as the backend serializes it: full timestamps everywhere.
#[must_use]
pub fn server_session(id: i64, users: Vec<i64>) -> Session {
    Session {
        date: "2024-01-01T00:00:00.000+00:00".into(),
        created_at: Some("2023-01-01T00:00:00".into()),
        updated_at: Some("2023-02-01T00:00:00".into()),
        ..session(id, users)
    }
}

#[must_use]
pub fn teacher(id: i64) -> Teacher {
    Teacher { id, first_name: "John".into(), last_name: "Doe".into(), created_at: None, updated_at: None }
}

#[must_use]
pub fn user(id: i64, admin: bool) -> User {
    User {
        id,
        email: "alice@studio.com".into(),
        first_name: "Alice".into(),
        last_name: "Smith".into(),
        admin,
        password: None,
        created_at: Some("2023-01-01T00:00:00".into()),
        updated_at: Some("2023-02-01T00:00:00".into()),
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Status { status: 404, message: format!("{what} not found") }
}

// =============================================================================
// MockAuth
// =============================================================================

/// Logs in as `identity` when set, otherwise answers 401. Registration fails
/// for any email containing `taken`.
#[derive(Default)]
pub struct MockAuth {
    pub identity: Option<SessionInformation>,
    pub calls: Mutex<Vec<String>>,
}

impl MockAuth {
    #[must_use]
    pub fn accepting(identity: SessionInformation) -> Self {
        Self { identity: Some(identity), calls: Mutex::default() }
    }

    #[must_use]
    pub fn rejecting() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AuthApi for MockAuth {
    async fn login(&self, request: &LoginRequest) -> Result<SessionInformation, ApiError> {
        self.calls.lock().unwrap().push(format!("login {}", request.email));
        self.identity.clone().ok_or(ApiError::Unauthorized)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<MessageResponse, ApiError> {
        self.calls.lock().unwrap().push(format!("register {}", request.email));
        if request.email.contains("taken") {
            return Err(ApiError::Status { status: 400, message: "Error: Email is already taken!".into() });
        }
        Ok(MessageResponse { message: "User registered successfully!".into() })
    }
}

// =============================================================================
// MockSessions
// =============================================================================

/// In-memory session backend that applies writes so reloads observe them.
#[derive(Default)]
pub struct MockSessions {
    pub sessions: Mutex<Vec<Session>>,
    pub calls: Mutex<Vec<String>>,
}

impl MockSessions {
    #[must_use]
    pub fn with(sessions: Vec<Session>) -> Self {
        Self { sessions: Mutex::new(sessions), calls: Mutex::default() }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl SessionApi for MockSessions {
    async fn all(&self) -> Result<Vec<Session>, ApiError> {
        self.record("all".into());
        Ok(self.sessions.lock().unwrap().clone())
    }

    async fn detail(&self, id: i64) -> Result<Session, ApiError> {
        self.record(format!("detail {id}"));
        let sessions = self.sessions.lock().unwrap();
        sessions
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| not_found("Session"))
    }

    async fn create(&self, payload: &SessionPayload) -> Result<Session, ApiError> {
        self.record(format!("create {}", payload.name));
        let mut sessions = self.sessions.lock().unwrap();
        let id = sessions.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        let created = Session {
            id,
            name: payload.name.clone(),
            date: payload.date.clone(),
            teacher_id: payload.teacher_id,
            description: payload.description.clone(),
            users: payload.users.clone(),
            created_at: None,
            updated_at: None,
        };
        sessions.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, payload: &SessionPayload) -> Result<Session, ApiError> {
        self.record(format!("update {id} {}", payload.name));
        let mut sessions = self.sessions.lock().unwrap();
        let existing = sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found("Session"))?;
        existing.name.clone_from(&payload.name);
        existing.date.clone_from(&payload.date);
        existing.teacher_id = payload.teacher_id;
        existing.description.clone_from(&payload.description);
        existing.users.clone_from(&payload.users);
        Ok(existing.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.record(format!("delete {id}"));
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        if sessions.len() == before {
            return Err(not_found("Session"));
        }
        Ok(())
    }

    async fn participate(&self, id: i64, user_id: i64) -> Result<(), ApiError> {
        self.record(format!("participate {id} {user_id}"));
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found("Session"))?;
        if session.users.contains(&user_id) {
            return Err(ApiError::Status { status: 400, message: String::new() });
        }
        session.users.push(user_id);
        Ok(())
    }

    async fn un_participate(&self, id: i64, user_id: i64) -> Result<(), ApiError> {
        self.record(format!("unparticipate {id} {user_id}"));
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found("Session"))?;
        if !session.users.contains(&user_id) {
            return Err(ApiError::Status { status: 400, message: String::new() });
        }
        session.users.retain(|u| *u != user_id);
        Ok(())
    }
}

// =============================================================================
// MockTeachers / MockUsers
// =============================================================================

#[derive(Default)]
pub struct MockTeachers {
    pub teachers: Vec<Teacher>,
}

#[async_trait::async_trait]
impl TeacherApi for MockTeachers {
    async fn all(&self) -> Result<Vec<Teacher>, ApiError> {
        Ok(self.teachers.clone())
    }

    async fn detail(&self, id: i64) -> Result<Teacher, ApiError> {
        self.teachers
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| not_found("Teacher"))
    }
}

#[derive(Default)]
pub struct MockUsers {
    pub users: Mutex<Vec<User>>,
    pub deleted: Mutex<Vec<i64>>,
}

impl MockUsers {
    #[must_use]
    pub fn with(users: Vec<User>) -> Self {
        Self { users: Mutex::new(users), deleted: Mutex::default() }
    }
}

#[async_trait::async_trait]
impl UserApi for MockUsers {
    async fn get_by_id(&self, id: i64) -> Result<User, ApiError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| not_found("User"))
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(not_found("User"));
        }
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }
}
