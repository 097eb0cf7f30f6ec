//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{assignments, auth, equipment, handovers, health, officers};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Precinct API",
        version = "1.0.0",
        description = "Police equipment tracking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Officers
        officers::list_officers,
        officers::get_officer,
        officers::my_equipment,
        officers::my_recipients,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::assignment_history,
        // Assignments
        assignments::assign,
        // Handovers
        handovers::create_handover,
        handovers::list_sent,
        handovers::get_handover,
    ),
    components(
        schemas(
            // Auth
            auth::LoginResponse,
            crate::models::officer::RegisterOfficer,
            crate::models::officer::LoginRequest,
            // Officers
            crate::models::officer::OfficerShort,
            crate::models::Rank,
            crate::models::RecordStatus,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::CurrentHolder,
            crate::models::equipment::AssetOverview,
            crate::models::EquipmentStatus,
            // Assignments
            crate::models::assignment::Assignment,
            crate::models::assignment::CreateAssignment,
            crate::models::assignment::AssignmentHistoryEntry,
            crate::models::assignment::AssignmentReceipt,
            // Handovers
            crate::models::handover::Handover,
            crate::models::handover::CreateHandover,
            crate::models::handover::HandoverReceipt,
            crate::models::handover::ItemFailure,
            crate::models::handover::ItemFailureReason,
            crate::models::HandoverStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and sign-in"),
        (name = "officers", description = "Officer directory"),
        (name = "equipment", description = "Equipment registry and history"),
        (name = "assignments", description = "Asset assignment"),
        (name = "handovers", description = "Equipment handover between officers")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
