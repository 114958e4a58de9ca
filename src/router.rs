//! Client routes and navigation guards.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every navigation is resolved through [`Router::navigate`], which parses the
//! path and runs the guards in order: authentication, then the
//! logged-in bounce away from login/register, then the admin check. Guards
//! read the session store point-in-time; none of them subscribe or mutate it.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use std::fmt;

use crate::state::session::SessionStore;

// =============================================================================
// ROUTES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Sessions,
    SessionDetail(i64),
    SessionCreate,
    SessionUpdate(i64),
    Me,
    NotFound(String),
}

impl Route {
    /// Parse an app path. Leading/trailing slashes are ignored; anything
    /// unrecognized becomes [`Route::NotFound`].
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim().trim_matches('/');
        let segments: Vec<&str> = if trimmed.is_empty() { Vec::new() } else { trimmed.split('/').collect() };
        let not_found = || Self::NotFound(format!("/{trimmed}"));
        match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["me"] => Self::Me,
            ["sessions"] => Self::Sessions,
            ["sessions", "create"] => Self::SessionCreate,
            ["sessions", "detail", id] => id.parse().map_or_else(|_| not_found(), Self::SessionDetail),
            ["sessions", "update", id] => id.parse().map_or_else(|_| not_found(), Self::SessionUpdate),
            _ => not_found(),
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::Login => "/login".to_owned(),
            Self::Register => "/register".to_owned(),
            Self::Sessions => "/sessions".to_owned(),
            Self::SessionDetail(id) => format!("/sessions/detail/{id}"),
            Self::SessionCreate => "/sessions/create".to_owned(),
            Self::SessionUpdate(id) => format!("/sessions/update/{id}"),
            Self::Me => "/me".to_owned(),
            Self::NotFound(path) => path.clone(),
        }
    }

    /// Requires a logged-in user.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Self::Sessions | Self::SessionDetail(_) | Self::SessionCreate | Self::SessionUpdate(_) | Self::Me
        )
    }

    /// Only reachable by administrators.
    #[must_use]
    pub fn requires_admin(&self) -> bool {
        matches!(self, Self::SessionCreate | Self::SessionUpdate(_))
    }

    /// Entry points that make no sense once logged in.
    #[must_use]
    pub fn is_unauth_only(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of a guard check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Allow(Route),
    Redirect(Route),
}

impl Navigation {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }

    /// The route the user ends up on.
    #[must_use]
    pub fn route(&self) -> &Route {
        match self {
            Self::Allow(route) | Self::Redirect(route) => route,
        }
    }
}

// =============================================================================
// GUARDS
// =============================================================================

/// Redirects anonymous users away from protected routes.
#[derive(Clone, Copy, Debug)]
pub struct RouteGuard<'a> {
    store: &'a SessionStore,
}

impl<'a> RouteGuard<'a> {
    #[must_use]
    pub fn new(store: &'a SessionStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn can_activate(&self, route: &Route) -> Navigation {
        if route.is_protected() && !self.store.is_logged().get() {
            return Navigation::Redirect(Route::Login);
        }
        Navigation::Allow(route.clone())
    }
}

/// Sends logged-in users from login/register to the session list.
#[derive(Clone, Copy, Debug)]
pub struct UnauthGuard<'a> {
    store: &'a SessionStore,
}

impl<'a> UnauthGuard<'a> {
    #[must_use]
    pub fn new(store: &'a SessionStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn can_activate(&self, route: &Route) -> Navigation {
        if route.is_unauth_only() && self.store.is_logged().get() {
            return Navigation::Redirect(Route::Sessions);
        }
        Navigation::Allow(route.clone())
    }
}

/// Keeps non-admins off admin-only routes. Assumes [`RouteGuard`] ran first.
#[derive(Clone, Copy, Debug)]
pub struct AdminGuard<'a> {
    store: &'a SessionStore,
}

impl<'a> AdminGuard<'a> {
    #[must_use]
    pub fn new(store: &'a SessionStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn can_activate(&self, route: &Route) -> Navigation {
        if route.requires_admin() && !self.store.is_admin() {
            return Navigation::Redirect(Route::Sessions);
        }
        Navigation::Allow(route.clone())
    }
}

// =============================================================================
// ROUTER
// =============================================================================

#[derive(Clone, Copy, Debug)]
pub struct Router<'a> {
    auth: RouteGuard<'a>,
    unauth: UnauthGuard<'a>,
    admin: AdminGuard<'a>,
}

impl<'a> Router<'a> {
    #[must_use]
    pub fn new(store: &'a SessionStore) -> Self {
        Self { auth: RouteGuard::new(store), unauth: UnauthGuard::new(store), admin: AdminGuard::new(store) }
    }

    /// Resolve `path` through every guard; the first redirect wins.
    #[must_use]
    pub fn navigate(&self, path: &str) -> Navigation {
        self.resolve(&Route::parse(path))
    }

    #[must_use]
    pub fn resolve(&self, route: &Route) -> Navigation {
        let checks = [
            self.auth.can_activate(route),
            self.unauth.can_activate(route),
            self.admin.can_activate(route),
        ];
        let navigation = checks
            .into_iter()
            .find(|nav| !nav.is_allowed())
            .unwrap_or_else(|| Navigation::Allow(route.clone()));
        if let Navigation::Redirect(target) = &navigation {
            tracing::debug!(from = %route, to = %target, "navigation redirected");
        }
        navigation
    }
}
