//! Business logic services

pub mod assignments;
pub mod directory;
pub mod equipment;
pub mod handovers;
pub mod officers;

use crate::{
    config::{AuthConfig, StoreConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub directory: directory::DirectoryService,
    pub officers: officers::OfficersService,
    pub equipment: equipment::EquipmentService,
    pub assignments: assignments::AssignmentsService,
    pub handovers: handovers::HandoversService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, store_config: &StoreConfig) -> Self {
        let directory = directory::DirectoryService::new(repository.clone());
        Self {
            officers: officers::OfficersService::new(repository.clone(), auth_config),
            equipment: equipment::EquipmentService::new(repository.clone()),
            assignments: assignments::AssignmentsService::new(
                repository.clone(),
                directory.clone(),
                store_config.max_transaction_attempts,
            ),
            handovers: handovers::HandoversService::new(
                repository.clone(),
                store_config.max_transaction_attempts,
            ),
            directory,
            repository,
        }
    }
}
