//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (allowed origins from configuration)
//!
//! Bearer authentication is an extractor ([`RequireAuth`]) rather than a
//! layer, so public routes simply don't ask for it. Request bodies go through
//! [`JsonBody`] so parse failures share the API's error envelope.

pub mod auth;
pub mod json;
pub mod request_id;

pub use auth::{AuthRejection, RequireAuth};
pub use json::JsonBody;
pub use request_id::request_id_middleware;
