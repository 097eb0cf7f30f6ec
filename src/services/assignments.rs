//! Asset assignment.
//!
//! An assignment closes whatever is active for the asset, opens the new
//! record and moves the equipment holder in one guarded batch. When another
//! writer gets there first the batch is rejected and the whole read/commit
//! cycle runs again, so an asset never ends up with two active assignments.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use super::directory::DirectoryService;
use crate::{
    error::{AppError, AppResult},
    models::{
        assignment::{Assignment, AssignmentReceipt, CreateAssignment},
        idempotency::IdempotencyKey,
        timestamp, EquipmentStatus, OfficerContext, RecordStatus,
    },
    repository::{
        collections, new_id,
        store::{encode, fields},
        CommitOutcome, Repository, Write, WriteBatch,
    },
    validation::check_form,
};

const OPERATION: &str = "assign";

#[derive(Clone)]
pub struct AssignmentsService {
    repository: Repository,
    directory: DirectoryService,
    max_attempts: u32,
}

impl AssignmentsService {
    pub fn new(repository: Repository, directory: DirectoryService, max_attempts: u32) -> Self {
        Self {
            repository,
            directory,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Assign an asset to an officer on behalf of a supervisor
    pub async fn assign(&self, ctx: &OfficerContext, form: &CreateAssignment) -> AppResult<AssignmentReceipt> {
        ctx.require_supervisor("assign equipment")?;
        check_form(form)?;

        let asset_id = form.asset_id.trim();
        let officer_id = form.officer_id.trim();
        let key = form
            .idempotency_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|k| IdempotencyKey::new(OPERATION, &ctx.officer_id, k, json!([asset_id, officer_id])));

        for attempt in 1..=self.max_attempts {
            if let Some(ref key) = key {
                if let Some(receipt) = self.replay(key).await? {
                    return Ok(receipt);
                }
            }

            let asset = self.repository.equipment_get(asset_id).await?;
            let officer = self.repository.officers_get(officer_id).await?;
            if officer.status != RecordStatus::Active {
                return Err(AppError::field("officer_id", "Selected officer is not active"));
            }
            let active = self.repository.assignments_active_for_asset(asset_id).await?;

            let now = Utc::now();
            let assignment = Assignment {
                id: new_id(),
                asset_id: asset.id.clone(),
                asset_name: submitted_or(&form.asset_name, || asset.name.clone()),
                officer_id: officer.id.clone(),
                officer_name: submitted_or(&form.officer_name, || officer.full_name()),
                assigned_by: Some(ctx.officer_id.clone()),
                assigned_date: next_assigned_date(now, active.iter().map(|a| a.assigned_date).max()),
                returned_date: None,
                status: RecordStatus::Active,
            };

            let mut batch = WriteBatch::new();
            for previous in &active {
                batch.push(
                    Write::update(
                        collections::ASSIGNMENTS,
                        &previous.id,
                        fields(json!({
                            "status": RecordStatus::Inactive,
                            "returned_date": timestamp::format(&now),
                        })),
                    )
                    .expect_field("status", RecordStatus::Active),
                );
            }
            batch
                .push(Write::create(
                    collections::ASSIGNMENTS,
                    &assignment.id,
                    encode(&assignment)?,
                ))
                .push(Write::update(
                    collections::EQUIPMENT,
                    &asset.id,
                    fields(json!({
                        "assigned_to": assignment.officer_id,
                        "assigned_to_name": assignment.officer_name,
                        "status": EquipmentStatus::InUse,
                        "handover_id": null,
                        "last_updated": timestamp::format(&now),
                    })),
                ))
                .guard(
                    collections::ASSIGNMENTS,
                    Repository::assignments_active_query(asset_id),
                    active.iter().map(|a| a.id.clone()).collect(),
                );
            if let Some(ref key) = key {
                batch.push(Repository::idempotency_claim(key, &assignment.id, now)?);
            }

            match self.repository.store.commit(batch).await? {
                CommitOutcome::Committed => {
                    let closed: Vec<String> = active.into_iter().map(|a| a.id).collect();
                    tracing::info!(
                        "Officer {} assigned asset {} to {} (closed {} assignment(s))",
                        ctx.officer_id,
                        asset_id,
                        officer_id,
                        closed.len()
                    );
                    let history = self.directory.assignment_history(asset_id).await?;
                    return Ok(AssignmentReceipt {
                        assignment,
                        closed,
                        history,
                        replayed: false,
                    });
                }
                CommitOutcome::Conflict => {
                    tracing::warn!("Assignment of {} hit a conflict (attempt {})", asset_id, attempt);
                }
                CommitOutcome::Rejected(failures) => {
                    if failures.iter().any(|f| f.collection == collections::EQUIPMENT) {
                        return Err(AppError::NotFound(format!("Equipment {} not found", asset_id)));
                    }
                    tracing::warn!(
                        "Assignment of {} rejected (attempt {}): {:?}",
                        asset_id,
                        attempt,
                        failures
                    );
                }
            }
        }

        // A concurrent submission with the same key may have won the last round
        if let Some(ref key) = key {
            if let Some(receipt) = self.replay(key).await? {
                return Ok(receipt);
            }
        }

        Err(AppError::Conflict(format!(
            "Asset {} is being reassigned concurrently, please retry",
            asset_id
        )))
    }

    async fn replay(&self, key: &IdempotencyKey) -> AppResult<Option<AssignmentReceipt>> {
        let Some(record) = self.repository.idempotency_get(key).await? else {
            return Ok(None);
        };
        key.check(&record)?;
        let assignment = self.repository.assignments_get(&record.resource_id).await?;
        let history = self.directory.assignment_history(&assignment.asset_id).await?;
        tracing::info!("Replayed assignment {} for key {}", assignment.id, key.key);
        Ok(Some(AssignmentReceipt {
            assignment,
            closed: Vec::new(),
            history,
            replayed: true,
        }))
    }
}

/// Denormalized name as submitted, or the current record's name when blank
fn submitted_or(submitted: &str, current: impl FnOnce() -> String) -> String {
    let submitted = submitted.trim();
    if submitted.is_empty() {
        current()
    } else {
        submitted.to_string()
    }
}

/// New records sort strictly after the ones they replace, even when the
/// clock has not moved past the previous assigned date.
fn next_assigned_date(now: DateTime<Utc>, newest: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match newest {
        Some(previous) if previous >= now => previous + Duration::microseconds(1),
        _ => now,
    }
}
