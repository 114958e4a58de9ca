//! Session pages: list, detail, and the admin create/update form.
//!
//! DESIGN
//! ======
//! Views are plain data loaded through the API traits, so every page can be
//! driven from tests with in-memory collaborators. Mutations reload the
//! affected view instead of patching it locally, so what is shown always
//! matches what the server holds.

#[cfg(test)]
#[path = "sessions_test.rs"]
mod sessions_test;

use crate::net::api::{SessionApi, TeacherApi};
use crate::net::types::{ApiError, Session, Teacher};
use crate::pages::form::{FormError, SessionForm, date_part};
use crate::router::Route;
use crate::state::session::SessionStore;

pub const SESSION_CREATED_MESSAGE: &str = "Session created !";
pub const SESSION_UPDATED_MESSAGE: &str = "Session updated !";
pub const SESSION_DELETED_MESSAGE: &str = "Session deleted !";

// =============================================================================
// LIST
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListView {
    pub sessions: Vec<Session>,
    /// Create/edit buttons are only offered to admins.
    pub show_admin_actions: bool,
}

impl ListView {
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn load(sessions: &dyn SessionApi, store: &SessionStore) -> Result<Self, ApiError> {
        let all = sessions.all().await?;
        Ok(Self { sessions: all, show_admin_actions: store.is_admin() })
    }
}

// =============================================================================
// DETAIL
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailView {
    pub session: Session,
    pub teacher: Teacher,
    pub is_participate: bool,
    pub is_admin: bool,
    pub user_id: i64,
}

impl DetailView {
    /// Load a session with its teacher, resolved against the current user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotLoggedIn`] without an identity, or a fetch error.
    pub async fn load(
        sessions: &dyn SessionApi,
        teachers: &dyn TeacherApi,
        store: &SessionStore,
        id: i64,
    ) -> Result<Self, ApiError> {
        let user_id = store.user_id().ok_or(ApiError::NotLoggedIn)?;
        let session = sessions.detail(id).await?;
        let teacher = teachers.detail(session.teacher_id).await?;
        let is_participate = session.users.contains(&user_id);
        Ok(Self { session, teacher, is_participate, is_admin: store.is_admin(), user_id })
    }

    async fn reload(&mut self, sessions: &dyn SessionApi, teachers: &dyn TeacherApi) -> Result<(), ApiError> {
        self.session = sessions.detail(self.session.id).await?;
        if self.teacher.id != self.session.teacher_id {
            self.teacher = teachers.detail(self.session.teacher_id).await?;
        }
        self.is_participate = self.session.users.contains(&self.user_id);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the participate or reload error.
    pub async fn participate(&mut self, sessions: &dyn SessionApi, teachers: &dyn TeacherApi) -> Result<(), ApiError> {
        sessions.participate(self.session.id, self.user_id).await?;
        self.reload(sessions, teachers).await
    }

    /// # Errors
    ///
    /// Returns the un-participate or reload error.
    pub async fn un_participate(
        &mut self,
        sessions: &dyn SessionApi,
        teachers: &dyn TeacherApi,
    ) -> Result<(), ApiError> {
        sessions.un_participate(self.session.id, self.user_id).await?;
        self.reload(sessions, teachers).await
    }

    /// Admin delete; navigates back to the list.
    ///
    /// # Errors
    ///
    /// Returns the delete error.
    pub async fn delete(&self, sessions: &dyn SessionApi) -> Result<(Route, &'static str), ApiError> {
        sessions.delete(self.session.id).await?;
        tracing::info!(session_id = self.session.id, "session deleted");
        Ok((Route::Sessions, SESSION_DELETED_MESSAGE))
    }
}

// =============================================================================
// FORM
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update(i64),
}

impl FormMode {
    /// Mode for a form route; `None` for any other route.
    #[must_use]
    pub fn from_route(route: &Route) -> Option<Self> {
        match route {
            Route::SessionCreate => Some(Self::Create),
            Route::SessionUpdate(id) => Some(Self::Update(*id)),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum FormInit {
    Ready(FormPage),
    Redirect(Route),
}

#[derive(Debug)]
pub enum SubmitError {
    Invalid(Vec<FormError>),
    Api(ApiError),
}

impl From<ApiError> for SubmitError {
    fn from(error: ApiError) -> Self {
        Self::Api(error)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormPage {
    pub mode: FormMode,
    pub form: SessionForm,
    pub teachers: Vec<Teacher>,
    /// Participants of the edited session, carried through an update.
    users: Vec<i64>,
}

impl FormPage {
    /// Prepare the form. Non-admins are sent back to the list; update mode
    /// pre-fills from the existing session.
    ///
    /// # Errors
    ///
    /// Returns a fetch error.
    pub async fn init(
        mode: FormMode,
        sessions: &dyn SessionApi,
        teachers: &dyn TeacherApi,
        store: &SessionStore,
    ) -> Result<FormInit, ApiError> {
        if !store.is_admin() {
            tracing::debug!("non-admin on session form, redirecting");
            return Ok(FormInit::Redirect(Route::Sessions));
        }
        let teachers = teachers.all().await?;
        let (form, users) = match mode {
            FormMode::Create => (SessionForm::default(), Vec::new()),
            FormMode::Update(id) => {
                let existing = sessions.detail(id).await?;
                let form = SessionForm {
                    name: existing.name,
                    date: date_part(&existing.date).to_owned(),
                    teacher_id: Some(existing.teacher_id),
                    description: existing.description,
                };
                (form, existing.users)
            }
        };
        Ok(FormInit::Ready(Self { mode, form, teachers, users }))
    }

    /// Validate, then create or update.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Invalid`] with every field error, or the API error.
    pub async fn submit(&self, sessions: &dyn SessionApi) -> Result<(Route, &'static str), SubmitError> {
        let payload = self.form.validate(self.users.clone()).map_err(SubmitError::Invalid)?;
        let message = match self.mode {
            FormMode::Create => {
                sessions.create(&payload).await?;
                SESSION_CREATED_MESSAGE
            }
            FormMode::Update(id) => {
                sessions.update(id, &payload).await?;
                SESSION_UPDATED_MESSAGE
            }
        };
        Ok((Route::Sessions, message))
    }
}
