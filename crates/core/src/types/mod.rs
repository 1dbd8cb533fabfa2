//! Core types for ShiftWatch.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod password;
pub mod phone;
pub mod reading;
pub mod user;

pub use email::{CORPORATE_DOMAIN, Email, EmailError};
pub use id::*;
pub use password::{PASSWORD_SYMBOLS, PasswordPolicyError, validate_password};
pub use phone::{PhoneError, PhoneNumber};
pub use reading::{FAN_THRESHOLD_CELSIUS, FatigueEvent, TemperatureReading, fan_engaged};
pub use user::{AvatarPreference, UserProfile};
