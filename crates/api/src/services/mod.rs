//! Business logic for the API.

pub mod auth;
