//! ShiftWatch Core - Shared types library.
//!
//! This crate provides common types used across all ShiftWatch components:
//! - `api` - REST backend for users, temperature readings and fatigue events
//! - `client` - Session-gated polling client used by dashboards
//! - `cli` - Command-line tools for migrations, provisioning and a terminal front end
//!
//! # Architecture
//!
//! The core crate contains only types, validation and pure helpers - no I/O,
//! no database access, no HTTP clients. This keeps it lightweight and allows
//! the server and the client to share one wire contract.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, corporate email, password policy, phone numbers,
//!   readings, fatigue events and user profiles
//! - [`wire`] - JSON request/response bodies exchanged with the API
//! - [`page`] - Page request normalization and page-count math
//! - [`validation`] - Boundary validation shared by server and client

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod page;
pub mod types;
pub mod validation;
pub mod wire;

pub use page::{PageRequest, total_pages};
pub use types::*;
pub use validation::{
    NewAccount, NewReading, NewSnapshot, ProfileChanges, RequiredFields, ValidationError,
    validate_login, validate_new_reading, validate_new_snapshot, validate_profile_update,
    validate_registration,
};
