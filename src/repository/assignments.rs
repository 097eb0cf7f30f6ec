//! Assignment domain methods on Repository

use super::{collections, Direction, Query, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{assignment::Assignment, RecordStatus},
};

impl Repository {
    /// Get assignment by id
    pub async fn assignments_get(&self, id: &str) -> AppResult<Assignment> {
        self.fetch_as(collections::ASSIGNMENTS, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Assignment {} not found", id)))
    }

    /// Query selecting the active assignments of an asset
    pub fn assignments_active_query(asset_id: &str) -> Query {
        Query::new()
            .filter("asset_id", asset_id)
            .filter("status", RecordStatus::Active)
    }

    /// Active assignments for an asset. More than one means the invariant
    /// was broken by an earlier writer; callers close all of them.
    pub async fn assignments_active_for_asset(&self, asset_id: &str) -> AppResult<Vec<Assignment>> {
        self.lookup_as(
            collections::ASSIGNMENTS,
            &Self::assignments_active_query(asset_id),
        )
        .await
    }

    /// All assignments for an asset, newest first
    pub async fn assignments_history(&self, asset_id: &str) -> AppResult<Vec<Assignment>> {
        let query = Query::new()
            .filter("asset_id", asset_id)
            .order_by("assigned_date", Direction::Descending);
        self.lookup_as(collections::ASSIGNMENTS, &query).await
    }
}
