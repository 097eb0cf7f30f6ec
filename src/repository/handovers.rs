//! Handover domain methods on Repository

use super::{collections, Direction, Query, Repository};
use crate::{
    error::{AppError, AppResult},
    models::handover::Handover,
};

impl Repository {
    /// Get handover by id
    pub async fn handovers_get(&self, id: &str) -> AppResult<Handover> {
        self.fetch_as(collections::HANDOVERS, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Handover {} not found", id)))
    }

    /// Handovers sent by an officer, newest first
    pub async fn handovers_sent_by(&self, officer_id: &str) -> AppResult<Vec<Handover>> {
        let query = Query::new()
            .filter("from_officer_id", officer_id)
            .order_by("created_at", Direction::Descending);
        self.lookup_as(collections::HANDOVERS, &query).await
    }
}
