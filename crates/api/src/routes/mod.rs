//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                               - Liveness check
//! GET    /health/ready                         - Readiness check (database)
//! GET    /uploads/{file}                       - Stored snapshot images
//!
//! # Accounts
//! POST   /login                                - Exchange credentials for a token
//! POST   /registro                             - Register an account
//! PUT    /perfil/{id}                          - Edit own profile (auth)
//!
//! # Temperature (auth)
//! GET    /temperatura?page&limit               - Caller's readings, newest first
//! POST   /temperatura                          - Record a reading
//! GET    /temperatura/{id}                     - One reading
//! DELETE /temperatura/{id}                     - Delete a reading
//! GET    /temperatura/device/{device}?page&limit - One device's readings
//! GET    /temperatura/idDispositivo/{device}   - Latest reading of a device
//!
//! # Fatigue (auth)
//! GET    /fatiga                               - Caller's snapshots, newest first
//! POST   /fatiga                               - Upload a snapshot (multipart)
//! DELETE /fatiga/{id}                          - Delete a snapshot and its image
//! ```

pub mod auth;
pub mod fatigue;
pub mod health;
pub mod temperature;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Multipart framing overhead allowed on top of the image size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/registro", post(auth::register))
        .route("/perfil/{id}", put(auth::update_profile))
}

/// Create the temperature routes router.
pub fn temperature_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/temperatura",
            get(temperature::list).post(temperature::create),
        )
        .route(
            "/temperatura/{id}",
            get(temperature::get_one).delete(temperature::delete),
        )
        .route(
            "/temperatura/device/{device_id}",
            get(temperature::list_for_device),
        )
        .route(
            "/temperatura/idDispositivo/{device_id}",
            get(temperature::latest_for_device),
        )
}

/// Create the fatigue routes router. `max_upload_bytes` bounds the request body.
pub fn fatigue_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/fatiga", get(fatigue::list).post(fatigue::upload))
        .route("/fatiga/{id}", axum::routing::delete(fatigue::delete))
        .layer(DefaultBodyLimit::max(
            max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
        ))
}

/// Create all API routes.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(account_routes())
        .merge(temperature_routes())
        .merge(fatigue_routes(max_upload_bytes))
}
