use axum::{extract::{Path, State}, http::StatusCode, Json};
use models::{City, CityPayload};
use tracing::info;
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::state::ServerState;

/// Ids that are not UUIDs cannot name a stored city, so they are a plain 404.
fn parse_id(raw: &str) -> Result<Uuid, JsonApiError> {
    Uuid::parse_str(raw).map_err(|_| JsonApiError::not_found())
}

#[utoipa::path(get, path = "/cities", tag = "cities", responses((status = 200, description = "All cities", body = [crate::openapi::CityDoc])))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<City>>, JsonApiError> {
    let cities = state.cities.list_all().await?;
    Ok(Json(cities))
}

#[utoipa::path(
    post,
    path = "/cities",
    tag = "cities",
    request_body = crate::openapi::CityInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::CityDoc),
        (status = 422, description = "Validation failed or name+country already taken", body = crate::openapi::ValidationErrorDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CityPayload>,
) -> Result<(StatusCode, Json<City>), JsonApiError> {
    let input = payload.into_input()?;
    let city = state.cities.create(input).await?;
    info!(city_id = %city.id, "city_create_request");
    Ok((StatusCode::CREATED, Json(city)))
}

#[utoipa::path(
    get,
    path = "/cities/{id}",
    tag = "cities",
    params(("id" = String, Path, description = "City id")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::CityDoc),
        (status = 404, description = "City not found", body = crate::openapi::MessageDoc)
    )
)]
pub async fn show(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<City>, JsonApiError> {
    let id = parse_id(&id)?;
    match state.cities.find(id).await? {
        Some(city) => Ok(Json(city)),
        None => Err(JsonApiError::not_found()),
    }
}

#[utoipa::path(
    put,
    path = "/cities/{id}",
    tag = "cities",
    params(("id" = String, Path, description = "City id")),
    request_body = crate::openapi::CityPatchDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::CityDoc),
        (status = 404, description = "City not found", body = crate::openapi::MessageDoc),
        (status = 422, description = "Validation failed or name+country already taken", body = crate::openapi::ValidationErrorDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CityPayload>,
) -> Result<Json<City>, JsonApiError> {
    // field errors win over an unknown id, as in the create path
    let patch = payload.into_patch()?;
    let id = parse_id(&id)?;
    let city = state.cities.update(id, patch).await?;
    Ok(Json(city))
}

#[utoipa::path(
    delete,
    path = "/cities/{id}",
    tag = "cities",
    params(("id" = String, Path, description = "City id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "City not found", body = crate::openapi::MessageDoc)
    )
)]
pub async fn destroy(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    let id = parse_id(&id)?;
    if state.cities.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::not_found())
    }
}
