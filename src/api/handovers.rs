//! Handover endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::handover::{CreateHandover, Handover, HandoverReceipt},
    AppState,
};

use super::AuthenticatedOfficer;

/// Hand the caller's equipment over to another officer
#[utoipa::path(
    post,
    path = "/handovers",
    tag = "handovers",
    security(("bearer_auth" = [])),
    request_body = CreateHandover,
    responses(
        (status = 201, description = "Handover recorded", body = HandoverReceipt),
        (status = 200, description = "Earlier submission with the same key", body = HandoverReceipt),
        (status = 404, description = "Target officer not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Some items cannot be handed over", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_handover(
    State(state): State<AppState>,
    officer: AuthenticatedOfficer,
    Json(form): Json<CreateHandover>,
) -> AppResult<(StatusCode, Json<HandoverReceipt>)> {
    let receipt = state.services.handovers.handover(&officer.context(), &form).await?;
    let status = if receipt.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(receipt)))
}

/// Handovers sent by the caller, newest first
#[utoipa::path(
    get,
    path = "/handovers",
    tag = "handovers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sent handovers", body = Vec<Handover>)
    )
)]
pub async fn list_sent(
    State(state): State<AppState>,
    officer: AuthenticatedOfficer,
) -> AppResult<Json<Vec<Handover>>> {
    let handovers = state.services.handovers.sent_by(&officer.context()).await?;
    Ok(Json(handovers))
}

/// Get handover by ID
#[utoipa::path(
    get,
    path = "/handovers/{id}",
    tag = "handovers",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Handover ID")),
    responses(
        (status = 200, description = "Handover record", body = Handover),
        (status = 404, description = "Handover not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_handover(
    State(state): State<AppState>,
    AuthenticatedOfficer(_claims): AuthenticatedOfficer,
    Path(id): Path<String>,
) -> AppResult<Json<Handover>> {
    let handover = state.services.handovers.get(&id).await?;
    Ok(Json(handover))
}
