//! Assignment endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::assignment::{AssignmentReceipt, CreateAssignment},
    AppState,
};

use super::AuthenticatedOfficer;

/// Assign an asset to an officer, closing any active assignment
#[utoipa::path(
    post,
    path = "/assignments",
    tag = "assignments",
    security(("bearer_auth" = [])),
    request_body = CreateAssignment,
    responses(
        (status = 201, description = "Asset assigned", body = AssignmentReceipt),
        (status = 200, description = "Earlier submission with the same key", body = AssignmentReceipt),
        (status = 403, description = "Supervisor rank required", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Concurrent reassignment", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn assign(
    State(state): State<AppState>,
    officer: AuthenticatedOfficer,
    Json(form): Json<CreateAssignment>,
) -> AppResult<(StatusCode, Json<AssignmentReceipt>)> {
    let receipt = state.services.assignments.assign(&officer.context(), &form).await?;
    let status = if receipt.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(receipt)))
}
