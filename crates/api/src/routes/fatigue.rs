//! Fatigue snapshot routes.
//!
//! Uploads are `multipart/form-data` with text fields `idCamara` and
//! `ambiente` plus an image in `foto`.

use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
};
use chrono::Utc;
use tracing::{instrument, warn};

use shiftwatch_core::wire::MessageBody;
use shiftwatch_core::{FatigueEvent, FatigueEventId, validate_new_snapshot};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;
use crate::storage::ImageKind;

/// Rejection text for anything that is not a jpg/png.
pub const IMAGE_TYPE_MESSAGE: &str = "Solo se permiten imágenes (jpg, png)";
const IMAGE_TOO_LARGE_MESSAGE: &str = "La imagen supera el tamaño máximo permitido";
const MALFORMED_UPLOAD_MESSAGE: &str = "Formulario de carga inválido";

struct Photo {
    kind: ImageKind,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct UploadForm {
    camera_id: Option<String>,
    environment: Option<String>,
    photo: Option<Photo>,
}

fn multipart_error(e: &MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::BadRequest(IMAGE_TOO_LARGE_MESSAGE.to_owned())
    } else {
        AppError::BadRequest(MALFORMED_UPLOAD_MESSAGE.to_owned())
    }
}

async fn read_form(mut multipart: Multipart, max_bytes: usize) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(&e))? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("idCamara") => {
                form.camera_id = Some(field.text().await.map_err(|e| multipart_error(&e))?);
            }
            Some("ambiente") => {
                form.environment = Some(field.text().await.map_err(|e| multipart_error(&e))?);
            }
            Some("foto") => {
                let kind = ImageKind::detect(
                    field.file_name().unwrap_or_default(),
                    field.content_type().unwrap_or_default(),
                )
                .ok_or_else(|| AppError::BadRequest(IMAGE_TYPE_MESSAGE.to_owned()))?;

                let bytes = field.bytes().await.map_err(|e| multipart_error(&e))?;
                if bytes.len() > max_bytes {
                    return Err(AppError::BadRequest(IMAGE_TOO_LARGE_MESSAGE.to_owned()));
                }
                form.photo = Some(Photo {
                    kind,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

/// `GET /fatiga`
#[instrument(skip(state))]
pub async fn list(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<FatigueEvent>>> {
    Ok(Json(state.fatigue().list(caller).await?))
}

/// `POST /fatiga`
#[instrument(skip(state, multipart))]
pub async fn upload(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<FatigueEvent>)> {
    let form = read_form(multipart, state.max_upload_bytes()).await?;
    let snapshot = validate_new_snapshot(
        form.camera_id.as_ref(),
        form.environment.as_ref(),
        form.photo.is_some(),
    )?;
    let photo = form
        .photo
        .ok_or_else(|| AppError::Internal("photo missing after validation".to_owned()))?;

    let key = state.images().put(photo.kind, &photo.bytes).await?;
    let photo_url = state.photo_url(&key);

    let created = match state
        .fatigue()
        .insert(caller, &snapshot, &photo_url, Some(key.as_str()), Utc::now())
        .await
    {
        Ok(event) => event,
        Err(e) => {
            if let Err(cleanup) = state.images().delete(&key).await {
                warn!(key = %key, error = %cleanup, "Failed to remove orphaned snapshot image");
            }
            return Err(e.into());
        }
    };

    tracing::info!(event_id = %created.id, url = %photo_url, "Snapshot stored");
    Ok((StatusCode::CREATED, Json(created)))
}

/// `DELETE /fatiga/{id}`
///
/// Removing the stored image is best-effort: a failure is logged and the
/// delete still succeeds.
#[instrument(skip(state))]
pub async fn delete(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>> {
    let not_found = || AppError::NotFound("No encontrado".to_owned());
    let id: FatigueEventId = id.parse().map_err(|_| not_found())?;

    let event = state
        .fatigue()
        .delete(caller, id)
        .await?
        .ok_or_else(not_found)?;

    if let Some(key) = &event.storage_key {
        match state.images().delete(key).await {
            Ok(()) => tracing::info!(key = %key, "Snapshot image removed"),
            Err(e) => warn!(key = %key, error = %e, "Failed to remove snapshot image"),
        }
    }

    Ok(Json(MessageBody::new("Eliminado")))
}
