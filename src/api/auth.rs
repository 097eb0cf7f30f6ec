//! Registration and sign-in endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::officer::{LoginRequest, OfficerShort, RegisterOfficer},
    AppState,
};

use super::AuthenticatedOfficer;

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// JWT access token
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
    pub officer: OfficerShort,
}

/// Register a field officer
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterOfficer,
    responses(
        (status = 201, description = "Officer registered", body = OfficerShort),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterOfficer>,
) -> AppResult<(StatusCode, Json<OfficerShort>)> {
    let officer = state.services.officers.register(&form).await?;
    Ok((StatusCode::CREATED, Json(officer.into())))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, officer) = state.services.officers.authenticate(&request).await?;
    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.auth.jwt_expiration_hours * 3600,
        officer: officer.into(),
    }))
}

/// Profile of the signed-in officer
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current officer", body = OfficerShort),
        (status = 401, description = "Not signed in", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedOfficer(claims): AuthenticatedOfficer,
) -> AppResult<Json<OfficerShort>> {
    let officer = state.services.officers.get(&claims.sub).await?;
    Ok(Json(officer.into()))
}
