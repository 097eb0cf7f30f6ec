//! Equipment API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        equipment::{AssetOverview, CreateEquipment, Equipment, EquipmentQuery},
        AssignmentHistoryEntry,
    },
    AppState,
};

use super::AuthenticatedOfficer;

/// List equipment
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(EquipmentQuery),
    responses(
        (status = 200, description = "Equipment list", body = Vec<Equipment>)
    )
)]
pub async fn list_equipment(
    State(state): State<AppState>,
    AuthenticatedOfficer(_claims): AuthenticatedOfficer,
    Query(query): Query<EquipmentQuery>,
) -> AppResult<Json<Vec<Equipment>>> {
    let equipment = state.services.directory.equipment(&query).await?;
    Ok(Json(equipment))
}

/// Asset details, current holder and assignment history
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Asset overview", body = AssetOverview),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_equipment(
    State(state): State<AppState>,
    AuthenticatedOfficer(_claims): AuthenticatedOfficer,
    Path(id): Path<String>,
) -> AppResult<Json<AssetOverview>> {
    let overview = state.services.directory.asset_overview(&id).await?;
    Ok(Json(overview))
}

/// Register equipment (supervisors only)
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 403, description = "Supervisor rank required", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    officer: AuthenticatedOfficer,
    Json(form): Json<CreateEquipment>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    let equipment = state.services.equipment.create(&officer.context(), &form).await?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// Assignment history for an asset, newest first
#[utoipa::path(
    get,
    path = "/equipment/{id}/assignments",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Assignment history", body = Vec<AssignmentHistoryEntry>)
    )
)]
pub async fn assignment_history(
    State(state): State<AppState>,
    AuthenticatedOfficer(_claims): AuthenticatedOfficer,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<AssignmentHistoryEntry>>> {
    let history = state.services.directory.assignment_history(&id).await?;
    Ok(Json(history))
}
