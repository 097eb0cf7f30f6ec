//! Officer domain methods on Repository

use super::{collections, store::encode, Query, Repository, Write, WriteBatch};
use crate::{
    error::{AppError, AppResult},
    models::officer::Officer,
};

impl Repository {
    /// Get officer by id
    pub async fn officers_get(&self, id: &str) -> AppResult<Officer> {
        self.officers_find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Officer {} not found", id)))
    }

    pub async fn officers_find(&self, id: &str) -> AppResult<Option<Officer>> {
        self.fetch_as(collections::OFFICERS, id).await
    }

    /// Get officer by email (case-insensitive)
    pub async fn officers_get_by_email(&self, email: &str) -> AppResult<Option<Officer>> {
        let query = Query::new().filter("email", email.trim().to_lowercase());
        Ok(self
            .lookup_as::<Officer>(collections::OFFICERS, &query)
            .await?
            .into_iter()
            .next())
    }

    /// List officers matching equality filters
    pub async fn officers_list(&self, query: &Query) -> AppResult<Vec<Officer>> {
        self.lookup_as(collections::OFFICERS, query).await
    }

    /// Writes that register an officer. Email and badge number are claimed
    /// through marker documents so two registrations cannot share them.
    pub fn officers_create_batch(officer: &Officer) -> AppResult<WriteBatch> {
        let mut marker = super::DocumentData::new();
        marker.insert(
            "officer_id".to_string(),
            serde_json::Value::String(officer.id.clone()),
        );

        let mut batch = WriteBatch::new();
        batch
            .push(Write::create(collections::OFFICERS, &officer.id, encode(officer)?))
            .push(Write::create(
                collections::OFFICER_EMAILS,
                &officer.email.to_lowercase(),
                marker.clone(),
            ))
            .push(Write::create(
                collections::OFFICER_BADGES,
                &officer.badge_number,
                marker,
            ));
        Ok(batch)
    }
}
