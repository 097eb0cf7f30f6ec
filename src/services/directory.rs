//! Directory lookups over officers, equipment and assignment history.
//!
//! Every lookup returns `AppResult`: an empty vector is a successful lookup
//! that matched nothing, and a store failure is an `Err` (logged here).

use std::collections::HashMap;

use crate::{
    error::AppResult,
    models::{
        equipment::{AssetOverview, CurrentHolder, Equipment, EquipmentQuery},
        officer::{OfficerContext, OfficerQuery, OfficerShort},
        Assignment, AssignmentHistoryEntry, RecordStatus,
    },
    repository::{Document, Query, Repository},
};

fn logged<T>(result: AppResult<T>, what: &str) -> AppResult<T> {
    if let Err(ref e) = result {
        tracing::error!("Lookup of {} failed: {}", what, e);
    }
    result
}

#[derive(Clone)]
pub struct DirectoryService {
    repository: Repository,
}

impl DirectoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Documents in `collection` matching every equality filter in `query`
    pub async fn lookup(&self, collection: &str, query: &Query) -> AppResult<Vec<Document>> {
        let documents = logged(self.repository.lookup(collection, query).await, collection)?;
        tracing::debug!(
            "Lookup on {} with {} filter(s) matched {} document(s)",
            collection,
            query.filters.len(),
            documents.len()
        );
        Ok(documents)
    }

    /// Officer directory with optional status/department filters and search
    pub async fn officers(&self, filters: &OfficerQuery) -> AppResult<Vec<OfficerShort>> {
        let mut query = Query::new();
        if let Some(status) = filters.status {
            query = query.filter("status", status);
        }
        if let Some(ref department_id) = filters.department_id {
            query = query.filter("department_id", department_id.as_str());
        }
        let search = filters.search.as_deref().unwrap_or("");

        let officers = logged(self.repository.officers_list(&query).await, "officers")?;
        Ok(officers
            .iter()
            .filter(|o| o.matches_search(search))
            .map(OfficerShort::from)
            .collect())
    }

    /// Officers with status active, as offered for assignment
    pub async fn active_officers(&self) -> AppResult<Vec<OfficerShort>> {
        self.officers(&OfficerQuery {
            status: Some(RecordStatus::Active),
            ..Default::default()
        })
        .await
    }

    pub async fn officer(&self, id: &str) -> AppResult<OfficerShort> {
        Ok(self.repository.officers_get(id).await?.into())
    }

    /// Possible handover recipients: the caller's department minus the caller
    pub async fn recipients(&self, ctx: &OfficerContext) -> AppResult<Vec<OfficerShort>> {
        let officers = self
            .officers(&OfficerQuery {
                department_id: Some(ctx.department_id.clone()),
                ..Default::default()
            })
            .await?;
        Ok(officers
            .into_iter()
            .filter(|o| o.id != ctx.officer_id)
            .collect())
    }

    /// Equipment the caller currently holds within their department
    pub async fn held_equipment(&self, ctx: &OfficerContext) -> AppResult<Vec<Equipment>> {
        logged(
            self.repository
                .equipment_held_by(&ctx.department_id, &ctx.officer_id)
                .await,
            "held equipment",
        )
    }

    pub async fn equipment(&self, filters: &EquipmentQuery) -> AppResult<Vec<Equipment>> {
        let mut query = Query::new();
        if let Some(ref department_id) = filters.department_id {
            query = query.filter("department_id", department_id.as_str());
        }
        if let Some(ref assigned_to) = filters.assigned_to {
            query = query.filter("assigned_to", assigned_to.as_str());
        }
        if let Some(status) = filters.status {
            query = query.filter("status", status);
        }
        let search = filters.search.as_deref().unwrap_or("");

        let equipment = logged(self.repository.equipment_list(&query).await, "equipment")?;
        Ok(equipment
            .into_iter()
            .filter(|e| e.matches_search(search))
            .collect())
    }

    /// Assignment history for an asset, newest first
    pub async fn assignment_history(&self, asset_id: &str) -> AppResult<Vec<AssignmentHistoryEntry>> {
        let assignments = logged(
            self.repository.assignments_history(asset_id).await,
            "assignment history",
        )?;
        self.decorate(assignments).await
    }

    /// Asset record, current holder and history
    pub async fn asset_overview(&self, asset_id: &str) -> AppResult<AssetOverview> {
        let asset = self.repository.equipment_get(asset_id).await?;
        let history = self.assignment_history(asset_id).await?;

        let current_holder = history
            .first()
            .filter(|entry| entry.assignment.is_active())
            .map(|entry| CurrentHolder {
                officer_id: entry.assignment.officer_id.clone(),
                officer_name: entry
                    .officer
                    .as_ref()
                    .map(|o| o.full_name.clone())
                    .unwrap_or_else(|| entry.assignment.officer_name.clone()),
                assignment_id: entry.assignment.id.clone(),
            });

        Ok(AssetOverview {
            asset,
            current_holder,
            history,
        })
    }

    /// Attach the officer's current profile to each row. The stored
    /// `officer_name` is left as written.
    async fn decorate(&self, assignments: Vec<Assignment>) -> AppResult<Vec<AssignmentHistoryEntry>> {
        let mut profiles: HashMap<String, Option<OfficerShort>> = HashMap::new();
        let mut entries = Vec::with_capacity(assignments.len());

        for assignment in assignments {
            if !profiles.contains_key(&assignment.officer_id) {
                let profile = self
                    .repository
                    .officers_find(&assignment.officer_id)
                    .await?
                    .map(OfficerShort::from);
                profiles.insert(assignment.officer_id.clone(), profile);
            }
            let officer = profiles.get(&assignment.officer_id).cloned().flatten();
            entries.push(AssignmentHistoryEntry { assignment, officer });
        }

        Ok(entries)
    }
}
