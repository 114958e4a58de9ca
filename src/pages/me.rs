//! Account page: profile display and self-service account deletion.

#[cfg(test)]
#[path = "me_test.rs"]
mod me_test;

use crate::net::api::UserApi;
use crate::net::types::{ApiError, User};
use crate::router::Route;
use crate::state::session::SessionStore;

pub const ACCOUNT_DELETED_MESSAGE: &str = "Your account has been deleted !";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeView {
    pub user: User,
}

impl MeView {
    /// Fetch the logged-in user's account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotLoggedIn`] without an identity, or the fetch error.
    pub async fn load(users: &dyn UserApi, store: &SessionStore) -> Result<Self, ApiError> {
        let id = store.user_id().ok_or(ApiError::NotLoggedIn)?;
        let user = users.get_by_id(id).await?;
        Ok(Self { user })
    }

    /// `"First LAST"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.user.first_name, self.user.last_name.to_uppercase())
    }

    /// Admins cannot delete their own account.
    #[must_use]
    pub fn can_delete_account(&self) -> bool {
        !self.user.admin
    }

    /// Delete the account, then drop the session. The store is only cleared
    /// once the server confirms the deletion.
    ///
    /// # Errors
    ///
    /// Returns the delete error; the session is kept in that case.
    pub async fn delete_account(&self, users: &dyn UserApi, store: &SessionStore) -> Result<Route, ApiError> {
        users.delete(self.user.id).await?;
        tracing::info!(user_id = self.user.id, "account deleted");
        store.log_out();
        Ok(Route::Home)
    }
}
