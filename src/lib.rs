//! Precinct Police Equipment Tracking Server
//!
//! Tracks which officer holds which piece of equipment: supervisors assign
//! assets, officers hand them over to colleagues, and every change is kept
//! as assignment history. Exposed as a REST JSON API.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire services over the given repository
    pub fn new(config: AppConfig, repository: repository::Repository) -> Self {
        let services = services::Services::new(repository, config.auth.clone(), &config.store);
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
