//! Shared fixtures: in-memory services and seeded records

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use precinct_server::{
    config::AppConfig,
    models::{
        Equipment, EquipmentStatus, Officer, OfficerContext, Rank, RecordStatus,
    },
    repository::{
        collections,
        memory::MemoryStore,
        new_id,
        store::{encode, fields},
        Repository,
    },
    services::Services,
    AppState,
};

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub repository: Repository,
    pub services: Services,
    pub state: AppState,
}

pub fn fixture() -> Fixture {
    fixture_with(AppConfig::default())
}

pub fn fixture_with(config: AppConfig) -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let repository = Repository::new(store.clone());
    let state = AppState::new(config, repository.clone());
    let services = (*state.services).clone();
    Fixture {
        store,
        repository,
        services,
        state,
    }
}

/// Officer stored directly, skipping registration and password hashing
pub async fn seed_officer(
    repository: &Repository,
    first_name: &str,
    last_name: &str,
    department_id: &str,
    rank: Rank,
) -> Officer {
    let id = new_id();
    let officer = Officer {
        id: id.clone(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!("{}.{}@precinct.test", first_name, last_name).to_lowercase(),
        badge_number: format!("B-{}", &id[..8]),
        police_station: None,
        department_id: department_id.to_string(),
        rank,
        reporting_officer: None,
        status: RecordStatus::Active,
        password_hash: String::new(),
        created_at: Utc::now(),
    };
    repository
        .store
        .create(collections::OFFICERS, &officer.id, encode(&officer).unwrap())
        .await
        .unwrap();
    officer
}

pub async fn deactivate_officer(repository: &Repository, officer: &Officer) {
    repository
        .store
        .update(collections::OFFICERS, &officer.id, fields(json!({"status": "inactive"})))
        .await
        .unwrap();
}

pub async fn seed_equipment(
    repository: &Repository,
    name: &str,
    department_id: &str,
    holder: Option<&Officer>,
) -> Equipment {
    let equipment = Equipment {
        id: new_id(),
        name: name.to_string(),
        category: "radio".to_string(),
        serial_number: format!("SN-{}", name.to_uppercase().replace(' ', "-")),
        department_id: department_id.to_string(),
        condition: Some("good".to_string()),
        status: if holder.is_some() {
            EquipmentStatus::InUse
        } else {
            EquipmentStatus::Available
        },
        assigned_to: holder.map(|o| o.id.clone()),
        assigned_to_name: holder.map(|o| o.full_name()),
        handover_id: None,
        purchase_date: None,
        last_updated: Utc::now(),
    };
    repository.equipment_create(&equipment).await.unwrap();
    equipment
}

pub fn context(officer: &Officer) -> OfficerContext {
    OfficerContext::from(officer)
}
