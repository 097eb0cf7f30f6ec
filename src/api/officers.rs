//! Officer directory endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        equipment::Equipment,
        officer::{OfficerQuery, OfficerShort},
    },
    AppState,
};

use super::AuthenticatedOfficer;

/// List officers
#[utoipa::path(
    get,
    path = "/officers",
    tag = "officers",
    security(("bearer_auth" = [])),
    params(OfficerQuery),
    responses(
        (status = 200, description = "Matching officers", body = Vec<OfficerShort>)
    )
)]
pub async fn list_officers(
    State(state): State<AppState>,
    AuthenticatedOfficer(_claims): AuthenticatedOfficer,
    Query(query): Query<OfficerQuery>,
) -> AppResult<Json<Vec<OfficerShort>>> {
    let officers = state.services.directory.officers(&query).await?;
    Ok(Json(officers))
}

/// Get officer by ID
#[utoipa::path(
    get,
    path = "/officers/{id}",
    tag = "officers",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Officer ID")),
    responses(
        (status = 200, description = "Officer profile", body = OfficerShort),
        (status = 404, description = "Officer not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_officer(
    State(state): State<AppState>,
    AuthenticatedOfficer(_claims): AuthenticatedOfficer,
    Path(id): Path<String>,
) -> AppResult<Json<OfficerShort>> {
    let officer = state.services.directory.officer(&id).await?;
    Ok(Json(officer))
}

/// Equipment the signed-in officer holds
#[utoipa::path(
    get,
    path = "/officers/me/equipment",
    tag = "officers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Held equipment", body = Vec<Equipment>)
    )
)]
pub async fn my_equipment(
    State(state): State<AppState>,
    officer: AuthenticatedOfficer,
) -> AppResult<Json<Vec<Equipment>>> {
    let equipment = state.services.directory.held_equipment(&officer.context()).await?;
    Ok(Json(equipment))
}

/// Officers in the caller's department who can receive a handover
#[utoipa::path(
    get,
    path = "/officers/me/recipients",
    tag = "officers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Department officers other than the caller", body = Vec<OfficerShort>)
    )
)]
pub async fn my_recipients(
    State(state): State<AppState>,
    officer: AuthenticatedOfficer,
) -> AppResult<Json<Vec<OfficerShort>>> {
    let officers = state.services.directory.recipients(&officer.context()).await?;
    Ok(Json(officers))
}
