pub mod form;
pub mod header;
pub mod login;
pub mod me;
pub mod register;
pub mod sessions;
