//! Temperature reading routes. Every query is scoped to the caller.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use tracing::instrument;

use shiftwatch_core::wire::{CreateTemperatureRequest, MessageBody, PageQuery, Paginated};
use shiftwatch_core::{
    PageRequest, TemperatureReading, TemperatureReadingId, fan_engaged, validate_new_reading,
};

use crate::error::{AppError, Result};
use crate::middleware::{JsonBody, RequireAuth};
use crate::state::AppState;

const DEVICE_NOT_FOUND: &str = "Dispositivo no encontrado";
const NOT_FOUND: &str = "No encontrado";

fn page_request(query: &PageQuery) -> PageRequest {
    PageRequest::from_raw(query.page.as_deref(), query.limit.as_deref())
}

async fn list_page(
    state: &AppState,
    caller: shiftwatch_core::UserId,
    device_id: Option<&str>,
    page: PageRequest,
) -> Result<Json<Paginated<TemperatureReading>>> {
    let (items, total) = state.readings().list(caller, device_id, page).await?;
    Ok(Json(Paginated {
        items,
        total_pages: page.total_pages(total),
    }))
}

/// `GET /temperatura?page&limit`
#[instrument(skip(state))]
pub async fn list(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<TemperatureReading>>> {
    list_page(&state, caller, None, page_request(&query)).await
}

/// `GET /temperatura/device/{device_id}?page&limit`
#[instrument(skip(state))]
pub async fn list_for_device(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<TemperatureReading>>> {
    list_page(&state, caller, Some(device_id.as_str()), page_request(&query)).await
}

/// `POST /temperatura`
#[instrument(skip(state, body))]
pub async fn create(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateTemperatureRequest>,
) -> Result<(StatusCode, Json<TemperatureReading>)> {
    let reading = validate_new_reading(&body)?;
    let fan = fan_engaged(reading.temperature);

    let created = state
        .readings()
        .insert(caller, &reading, fan, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /temperatura/{id}`
#[instrument(skip(state))]
pub async fn get_one(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TemperatureReading>> {
    let not_found = || AppError::NotFound(DEVICE_NOT_FOUND.to_owned());
    let id: TemperatureReadingId = id.parse().map_err(|_| not_found())?;

    state
        .readings()
        .get(caller, id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// `GET /temperatura/idDispositivo/{device_id}`
#[instrument(skip(state))]
pub async fn latest_for_device(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<TemperatureReading>> {
    state
        .readings()
        .latest_for_device(caller, &device_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(DEVICE_NOT_FOUND.to_owned()))
}

/// `DELETE /temperatura/{id}`
#[instrument(skip(state))]
pub async fn delete(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>> {
    let not_found = || AppError::NotFound(NOT_FOUND.to_owned());
    let id: TemperatureReadingId = id.parse().map_err(|_| not_found())?;

    if state.readings().delete(caller, id).await? {
        Ok(Json(MessageBody::new("Eliminado")))
    } else {
        Err(not_found())
    }
}
