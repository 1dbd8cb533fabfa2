//! Server-side models that never leave the API (password hashes live here).

pub mod user;

pub use user::{NewUser, ProfileUpdate, User};
