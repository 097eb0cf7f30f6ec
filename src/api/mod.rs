//! API handlers for Precinct REST endpoints

pub mod assignments;
pub mod auth;
pub mod equipment;
pub mod handovers;
pub mod health;
pub mod officers;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    models::officer::{OfficerClaims, OfficerContext},
    AppState,
};

/// Extractor for the signed-in officer from the JWT bearer token
pub struct AuthenticatedOfficer(pub OfficerClaims);

impl AuthenticatedOfficer {
    /// The officer on whose behalf the request runs
    pub fn context(&self) -> OfficerContext {
        self.0.context()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedOfficer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = OfficerClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedOfficer(claims))
    }
}

/// Application router: API v1 routes, OpenAPI docs, tracing and CORS
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Officers
        .route("/officers", get(officers::list_officers))
        .route("/officers/me/equipment", get(officers::my_equipment))
        .route("/officers/me/recipients", get(officers::my_recipients))
        .route("/officers/:id", get(officers::get_officer))
        // Equipment
        .route(
            "/equipment",
            get(equipment::list_equipment).post(equipment::create_equipment),
        )
        .route("/equipment/:id", get(equipment::get_equipment))
        .route("/equipment/:id/assignments", get(equipment::assignment_history))
        // Assignments
        .route("/assignments", post(assignments::assign))
        // Handovers
        .route(
            "/handovers",
            get(handovers::list_sent).post(handovers::create_handover),
        )
        .route("/handovers/:id", get(handovers::get_handover))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
