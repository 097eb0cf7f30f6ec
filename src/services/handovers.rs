//! Equipment handover between officers

use chrono::Utc;
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::{
        handover::{CreateHandover, Handover, HandoverReceipt, ItemFailure, ItemFailureReason},
        idempotency::IdempotencyKey,
        timestamp, EquipmentStatus, HandoverStatus, OfficerContext, RecordStatus,
    },
    repository::{
        collections, new_id,
        store::{encode, fields, FailureReason},
        CommitOutcome, Repository, Write, WriteBatch,
    },
    validation::validate_form,
};

const OPERATION: &str = "handover";

#[derive(Clone)]
pub struct HandoversService {
    repository: Repository,
    max_attempts: u32,
}

impl HandoversService {
    pub fn new(repository: Repository, max_attempts: u32) -> Self {
        Self {
            repository,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Hand the caller's equipment over to another officer.
    ///
    /// Either every listed item moves to the target or none does; a
    /// rejection names each item that blocked it.
    pub async fn handover(&self, ctx: &OfficerContext, form: &CreateHandover) -> AppResult<HandoverReceipt> {
        let mut errors = validate_form(form);
        let to_officer_id = form.to_officer_id.trim();
        if to_officer_id == ctx.officer_id {
            errors
                .entry("to_officer_id".to_string())
                .or_insert_with(|| "You cannot hand over equipment to yourself".to_string());
        }

        let equipment_ids = distinct_ids(&form.equipment_ids);
        if equipment_ids.is_empty() {
            errors
                .entry("equipment_ids".to_string())
                .or_insert_with(|| "Please select at least one equipment item".to_string());
        }
        if !errors.is_empty() {
            return Err(AppError::InvalidForm(errors));
        }

        let key = form
            .idempotency_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|k| {
                IdempotencyKey::new(
                    OPERATION,
                    &ctx.officer_id,
                    k,
                    json!([to_officer_id, equipment_ids, form.notes.trim()]),
                )
            });

        for attempt in 1..=self.max_attempts {
            if let Some(ref key) = key {
                if let Some(receipt) = self.replay(key).await? {
                    return Ok(receipt);
                }
            }

            let target = self.repository.officers_get(to_officer_id).await?;
            if target.status != RecordStatus::Active {
                return Err(AppError::field(
                    "to_officer_id",
                    "Selected officer is not active",
                ));
            }

            let now = Utc::now();
            let handover = Handover {
                id: new_id(),
                from_officer_id: ctx.officer_id.clone(),
                from_officer_name: ctx.name.clone(),
                to_officer_id: target.id.clone(),
                to_officer_name: target.full_name(),
                equipment_ids: equipment_ids.clone(),
                notes: form.notes.trim().to_string(),
                department_id: ctx.department_id.clone(),
                status: HandoverStatus::Pending,
                created_at: now,
            };

            let mut batch = WriteBatch::new();
            batch.push(Write::create(
                collections::HANDOVERS,
                &handover.id,
                encode(&handover)?,
            ));
            for equipment_id in &handover.equipment_ids {
                batch.push(
                    Write::update(
                        collections::EQUIPMENT,
                        equipment_id,
                        fields(json!({
                            "assigned_to": handover.to_officer_id,
                            "assigned_to_name": handover.to_officer_name,
                            "status": EquipmentStatus::PendingTransfer,
                            "handover_id": handover.id,
                            "last_updated": timestamp::format(&now),
                        })),
                    )
                    .expect_field("assigned_to", ctx.officer_id.as_str()),
                );
            }
            if let Some(ref key) = key {
                batch.push(Repository::idempotency_claim(key, &handover.id, now)?);
            }

            match self.repository.store.commit(batch).await? {
                CommitOutcome::Committed => {
                    tracing::info!(
                        "Officer {} handed {} item(s) to {} (handover {})",
                        ctx.officer_id,
                        handover.equipment_ids.len(),
                        handover.to_officer_id,
                        handover.id
                    );
                    return Ok(HandoverReceipt {
                        handover,
                        replayed: false,
                    });
                }
                CommitOutcome::Conflict => {
                    tracing::warn!("Handover by {} hit a conflict (attempt {})", ctx.officer_id, attempt);
                }
                CommitOutcome::Rejected(failures) => {
                    let items: Vec<ItemFailure> = failures
                        .iter()
                        .filter(|f| f.collection == collections::EQUIPMENT)
                        .filter_map(|f| {
                            f.id.as_ref().map(|id| ItemFailure {
                                equipment_id: id.clone(),
                                reason: match f.reason {
                                    FailureReason::Missing => ItemFailureReason::NotFound,
                                    _ => ItemFailureReason::NotHeldBySender,
                                },
                            })
                        })
                        .collect();

                    if !items.is_empty()
                        && !failures.iter().any(|f| f.collection == collections::IDEMPOTENCY_KEYS)
                    {
                        tracing::warn!(
                            "Handover by {} rejected for {} item(s)",
                            ctx.officer_id,
                            items.len()
                        );
                        return Err(AppError::HandoverRejected(items));
                    }
                    tracing::warn!(
                        "Handover by {} rejected (attempt {}): {:?}",
                        ctx.officer_id,
                        attempt,
                        failures
                    );
                }
            }
        }

        if let Some(ref key) = key {
            if let Some(receipt) = self.replay(key).await? {
                return Ok(receipt);
            }
        }

        Err(AppError::Conflict(
            "Equipment is being updated concurrently, please retry".to_string(),
        ))
    }

    pub async fn get(&self, id: &str) -> AppResult<Handover> {
        self.repository.handovers_get(id).await
    }

    /// Handovers the caller has sent, newest first
    pub async fn sent_by(&self, ctx: &OfficerContext) -> AppResult<Vec<Handover>> {
        self.repository.handovers_sent_by(&ctx.officer_id).await
    }

    async fn replay(&self, key: &IdempotencyKey) -> AppResult<Option<HandoverReceipt>> {
        let Some(record) = self.repository.idempotency_get(key).await? else {
            return Ok(None);
        };
        key.check(&record)?;
        let handover = self.repository.handovers_get(&record.resource_id).await?;
        tracing::info!("Replayed handover {} for key {}", handover.id, key.key);
        Ok(Some(HandoverReceipt {
            handover,
            replayed: true,
        }))
    }
}

/// Trimmed, non-blank ids in first-seen order
fn distinct_ids(ids: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty() && seen.insert(id.to_string()))
        .map(str::to_string)
        .collect()
}
