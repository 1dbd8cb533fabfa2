//! Account routes: login, registration and profile edits.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use shiftwatch_core::wire::{
    LoginRequest, LoginResponse, MessageBody, ProfileUpdateRequest, RegisterRequest,
};
use shiftwatch_core::{
    UserId, UserProfile, ValidationError, validate_login, validate_profile_update,
    validate_registration,
};

use crate::error::{AppError, Result};
use crate::middleware::{JsonBody, RequireAuth};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// `POST /login`
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (email, password) = validate_login(&body)?;

    let auth = AuthService::new(state.users(), state.tokens());
    let (token, user) = auth.login(&email, &password).await?;

    tracing::info!(user_id = %user.id, "Login succeeded");
    Ok(Json(LoginResponse {
        token,
        user: user.to_profile(),
    }))
}

/// `POST /registro`
#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageBody>)> {
    let account = validate_registration(&body).map_err(|e| match e {
        ValidationError::Password(_) => AppError::BadRequest("Contraseña inválida".to_owned()),
        other => AppError::Validation(other),
    })?;

    AuthService::new(state.users(), state.tokens())
        .register(&account)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageBody::new("Usuario registrado")),
    ))
}

/// `PUT /perfil/{id}`
#[instrument(skip(state, body))]
pub async fn update_profile(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<ProfileUpdateRequest>,
) -> Result<Json<UserProfile>> {
    let changes = validate_profile_update(&body)?;
    let target: UserId = id.parse().map_err(|_| AuthError::UserNotFound)?;

    let user = AuthService::new(state.users(), state.tokens())
        .update_profile(caller, target, &changes)
        .await?;

    Ok(Json(user.to_profile()))
}
