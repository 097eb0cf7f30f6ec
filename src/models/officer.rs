//! Officer model, registration forms and authentication claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{Rank, RecordStatus};
use super::timestamp;
use crate::error::AppError;

/// Officer document as stored in the `officers` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Officer {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub badge_number: String,
    pub police_station: Option<String>,
    pub department_id: String,
    pub rank: Rank,
    /// Name of the supervising officer, free text
    pub reporting_officer: Option<String>,
    pub status: RecordStatus,
    pub password_hash: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Officer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Case-insensitive match on "first last" or badge number
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.full_name().to_lowercase().contains(&query)
            || self.badge_number.to_lowercase().contains(&query)
    }
}

/// Officer as exposed by the API (no credentials)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OfficerShort {
    pub id: String,
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub badge_number: String,
    pub police_station: Option<String>,
    pub department_id: String,
    pub rank: Rank,
    pub reporting_officer: Option<String>,
    pub status: RecordStatus,
}

impl From<&Officer> for OfficerShort {
    fn from(officer: &Officer) -> Self {
        Self {
            id: officer.id.clone(),
            full_name: officer.full_name(),
            first_name: officer.first_name.clone(),
            last_name: officer.last_name.clone(),
            email: officer.email.clone(),
            badge_number: officer.badge_number.clone(),
            police_station: officer.police_station.clone(),
            department_id: officer.department_id.clone(),
            rank: officer.rank,
            reporting_officer: officer.reporting_officer.clone(),
            status: officer.status,
        }
    }
}

impl From<Officer> for OfficerShort {
    fn from(officer: Officer) -> Self {
        OfficerShort::from(&officer)
    }
}

/// Field officer sign-up form
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RegisterOfficer {
    #[validate(custom(function = "crate::validation::non_blank", message = "First name is required"))]
    pub first_name: String,
    #[validate(custom(function = "crate::validation::non_blank", message = "Last name is required"))]
    pub last_name: String,
    #[validate(
        custom(function = "crate::validation::non_blank", message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(
        custom(function = "crate::validation::non_blank", message = "Please confirm your password"),
        must_match(other = "password", message = "Passwords do not match")
    )]
    pub confirm_password: String,
    #[validate(custom(function = "crate::validation::non_blank", message = "Badge number is required"))]
    pub badge_number: String,
    #[serde(default)]
    pub rank: Rank,
    /// Division or unit; becomes the officer's department
    #[validate(custom(function = "crate::validation::non_blank", message = "Division is required"))]
    pub division: String,
    #[validate(custom(function = "crate::validation::non_blank", message = "Supervisor name is required"))]
    pub supervisor: String,
    pub police_station: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::accepted", message = "You must accept the terms of use"))]
    pub accept_terms: bool,
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(custom(function = "crate::validation::non_blank", message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Officer directory filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct OfficerQuery {
    pub status: Option<RecordStatus>,
    pub department_id: Option<String>,
    /// Matches name or badge number
    pub search: Option<String>,
}

/// The signed-in officer on whose behalf an operation runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficerContext {
    pub officer_id: String,
    pub name: String,
    pub department_id: String,
    pub rank: Rank,
}

impl OfficerContext {
    /// `action` completes "Supervisor rank required to ..."
    pub fn require_supervisor(&self, action: &str) -> Result<(), AppError> {
        if self.rank.is_supervisor() {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Supervisor rank required to {}",
                action
            )))
        }
    }
}

impl From<&Officer> for OfficerContext {
    fn from(officer: &Officer) -> Self {
        Self {
            officer_id: officer.id.clone(),
            name: officer.full_name(),
            department_id: officer.department_id.clone(),
            rank: officer.rank,
        }
    }
}

/// JWT claims for signed-in officers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficerClaims {
    /// Officer id
    pub sub: String,
    pub name: String,
    pub department_id: String,
    pub rank: Rank,
    pub exp: i64,
    pub iat: i64,
}

impl OfficerClaims {
    pub fn new(officer: &Officer, expiration_hours: u64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: officer.id.clone(),
            name: officer.full_name(),
            department_id: officer.department_id.clone(),
            rank: officer.rank,
            exp: now + (expiration_hours as i64 * 3600),
            iat: now,
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn context(&self) -> OfficerContext {
        OfficerContext {
            officer_id: self.sub.clone(),
            name: self.name.clone(),
            department_id: self.department_id.clone(),
            rank: self.rank,
        }
    }
}
