//! Equipment domain methods on Repository

use super::{collections, store::encode, Query, Repository};
use crate::{
    error::{AppError, AppResult},
    models::equipment::Equipment,
};

impl Repository {
    /// Get equipment by id
    pub async fn equipment_get(&self, id: &str) -> AppResult<Equipment> {
        self.equipment_find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    pub async fn equipment_find(&self, id: &str) -> AppResult<Option<Equipment>> {
        self.fetch_as(collections::EQUIPMENT, id).await
    }

    /// List equipment matching equality filters
    pub async fn equipment_list(&self, query: &Query) -> AppResult<Vec<Equipment>> {
        self.lookup_as(collections::EQUIPMENT, query).await
    }

    /// Equipment currently held by an officer within a department
    pub async fn equipment_held_by(
        &self,
        department_id: &str,
        officer_id: &str,
    ) -> AppResult<Vec<Equipment>> {
        let query = Query::new()
            .filter("department_id", department_id)
            .filter("assigned_to", officer_id);
        self.equipment_list(&query).await
    }

    /// Create equipment
    pub async fn equipment_create(&self, equipment: &Equipment) -> AppResult<()> {
        self.store
            .create(collections::EQUIPMENT, &equipment.id, encode(equipment)?)
            .await
    }
}
