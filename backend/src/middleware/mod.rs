//! HTTP middleware for the PharmaStock backend

pub mod auth;

pub use auth::{auth_middleware, AuthUser, CurrentUser};
