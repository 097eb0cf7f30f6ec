//! Officer accounts: registration and sign-in

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        officer::{LoginRequest, Officer, OfficerClaims, RegisterOfficer},
        RecordStatus,
    },
    repository::{collections, new_id, CommitOutcome, Repository},
    validation::check_form,
};

#[derive(Clone)]
pub struct OfficersService {
    repository: Repository,
    config: AuthConfig,
}

impl OfficersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a field officer. Email and badge number must be unused.
    pub async fn register(&self, form: &RegisterOfficer) -> AppResult<Officer> {
        check_form(form)?;

        let officer = Officer {
            id: new_id(),
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            email: form.email.trim().to_lowercase(),
            badge_number: form.badge_number.trim().to_string(),
            police_station: form
                .police_station
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            department_id: form.division.trim().to_string(),
            rank: form.rank,
            reporting_officer: Some(form.supervisor.trim().to_string()),
            status: RecordStatus::Active,
            password_hash: self.hash_password(&form.password)?,
            created_at: Utc::now(),
        };

        let batch = Repository::officers_create_batch(&officer)?;
        match self.repository.store.commit(batch).await? {
            CommitOutcome::Committed => {
                tracing::info!(
                    "Registered officer {} ({}) in {}",
                    officer.id,
                    officer.badge_number,
                    officer.department_id
                );
                Ok(officer)
            }
            CommitOutcome::Rejected(failures) => {
                let mut errors = crate::error::FieldErrors::new();
                for failure in failures {
                    match failure.collection.as_str() {
                        collections::OFFICER_EMAILS => {
                            errors.insert("email".to_string(), "Email is already registered".to_string());
                        }
                        collections::OFFICER_BADGES => {
                            errors.insert(
                                "badge_number".to_string(),
                                "Badge number is already registered".to_string(),
                            );
                        }
                        _ => {}
                    }
                }
                tracing::warn!("Registration rejected for {}: {:?}", officer.email, errors);
                if errors.is_empty() {
                    Err(AppError::Duplicate("Officer already exists".to_string()))
                } else {
                    Err(AppError::InvalidForm(errors))
                }
            }
            CommitOutcome::Conflict => Err(AppError::Conflict(
                "Registration collided with another request, please retry".to_string(),
            )),
        }
    }

    /// Authenticate by email and password, returning a signed token
    pub async fn authenticate(&self, request: &LoginRequest) -> AppResult<(String, Officer)> {
        check_form(request)?;

        let officer = self
            .repository
            .officers_get_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&officer, &request.password)? {
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        if officer.status != RecordStatus::Active {
            return Err(AppError::Authentication("Account is inactive".to_string()));
        }

        let token = OfficerClaims::new(&officer, self.config.jwt_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        tracing::info!("Officer {} signed in", officer.id);
        Ok((token, officer))
    }

    pub async fn get(&self, id: &str) -> AppResult<Officer> {
        self.repository.officers_get(id).await
    }

    fn verify_password(&self, officer: &Officer, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&officer.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
