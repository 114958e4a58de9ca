//! Yoga studio client.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store in [`state::session`] is the single source of truth for
//! who is logged in. Everything else reads it: the router's guards decide
//! navigation from it, the API client attaches its bearer token, and page
//! views (the header in particular) subscribe to its logged-in signal.
//! Only the login page writes an identity; logout and account deletion
//! clear it.

pub mod config;
pub mod net;
pub mod pages;
pub mod router;
pub mod state;

#[cfg(test)]
mod test_helpers;
