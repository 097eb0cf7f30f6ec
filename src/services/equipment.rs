//! Equipment registry

use chrono::Utc;

use crate::{
    error::AppResult,
    models::{
        equipment::{CreateEquipment, Equipment},
        EquipmentStatus, OfficerContext,
    },
    repository::{new_id, Repository},
    validation::check_form,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new asset. It starts available with no holder.
    pub async fn create(&self, ctx: &OfficerContext, form: &CreateEquipment) -> AppResult<Equipment> {
        ctx.require_supervisor("register equipment")?;
        check_form(form)?;

        let equipment = Equipment {
            id: new_id(),
            name: form.name.trim().to_string(),
            category: form.category.trim().to_string(),
            serial_number: form.serial_number.trim().to_string(),
            department_id: form.department_id.trim().to_string(),
            condition: form.condition.clone(),
            status: EquipmentStatus::Available,
            assigned_to: None,
            assigned_to_name: None,
            handover_id: None,
            purchase_date: form.purchase_date,
            last_updated: Utc::now(),
        };

        self.repository.equipment_create(&equipment).await?;
        tracing::info!(
            "Officer {} registered equipment {} ({})",
            ctx.officer_id,
            equipment.id,
            equipment.serial_number
        );
        Ok(equipment)
    }

    pub async fn get(&self, id: &str) -> AppResult<Equipment> {
        self.repository.equipment_get(id).await
    }
}
