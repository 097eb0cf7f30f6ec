//! Assignment manager tests against the in-memory store

mod common;

use std::collections::BTreeSet;

use chrono::Utc;
use precinct_server::{
    config::AppConfig,
    error::AppError,
    models::{Assignment, CreateAssignment, EquipmentStatus, Rank, RecordStatus},
    repository::{collections, new_id, store::encode, Repository},
};
use tokio_test::{assert_err, assert_ok};

use common::{context, deactivate_officer, fixture, fixture_with, seed_equipment, seed_officer};

fn assign_form(asset_id: &str, asset_name: &str, officer_id: &str, officer_name: &str) -> CreateAssignment {
    CreateAssignment {
        asset_id: asset_id.to_string(),
        asset_name: asset_name.to_string(),
        officer_id: officer_id.to_string(),
        officer_name: officer_name.to_string(),
        idempotency_key: None,
    }
}

async fn active_for(repository: &Repository, asset_id: &str) -> Vec<Assignment> {
    repository.assignments_active_for_asset(asset_id).await.unwrap()
}

#[tokio::test]
async fn test_sequential_assigns_keep_one_active_and_order_history() {
    let f = fixture();
    let sergeant = seed_officer(&f.repository, "Maya", "Iyer", "traffic", Rank::Sergeant).await;
    let radio = seed_equipment(&f.repository, "Radio 7", "traffic", None).await;

    let mut officers = Vec::new();
    for name in ["Arjun", "Neha", "Ravi", "Sara", "Kabir"] {
        officers.push(seed_officer(&f.repository, name, "Rao", "traffic", Rank::Officer).await);
    }

    for officer in &officers {
        let form = assign_form(&radio.id, &radio.name, &officer.id, &officer.full_name());
        assert_ok!(f.services.assignments.assign(&context(&sergeant), &form).await);
        assert_eq!(active_for(&f.repository, &radio.id).await.len(), 1);
    }

    let history = f.services.directory.assignment_history(&radio.id).await.unwrap();
    assert_eq!(history.len(), officers.len());
    assert!(history
        .windows(2)
        .all(|pair| pair[0].assignment.assigned_date > pair[1].assignment.assigned_date));

    let newest = &history[0];
    let last = officers.last().unwrap();
    assert_eq!(newest.assignment.officer_id, last.id);
    assert_eq!(newest.assignment.status, RecordStatus::Active);
    assert!(history[1..]
        .iter()
        .all(|entry| entry.assignment.status == RecordStatus::Inactive));
}

#[tokio::test]
async fn test_reassignment_closes_previous_record() {
    let f = fixture();
    let sergeant = seed_officer(&f.repository, "Maya", "Iyer", "traffic", Rank::Sergeant).await;
    let first = seed_officer(&f.repository, "Arjun", "Rao", "traffic", Rank::Officer).await;
    let second = seed_officer(&f.repository, "Neha", "Shah", "traffic", Rank::Officer).await;
    let camera = seed_equipment(&f.repository, "Body Cam 3", "traffic", None).await;
    let ctx = context(&sergeant);

    let opened = f
        .services
        .assignments
        .assign(&ctx, &assign_form(&camera.id, &camera.name, &first.id, &first.full_name()))
        .await
        .unwrap();
    let receipt = f
        .services
        .assignments
        .assign(&ctx, &assign_form(&camera.id, &camera.name, &second.id, &second.full_name()))
        .await
        .unwrap();

    assert_eq!(receipt.closed, vec![opened.assignment.id.clone()]);
    assert_eq!(receipt.assignment.assigned_by.as_deref(), Some(sergeant.id.as_str()));

    let previous = f.repository.assignments_get(&opened.assignment.id).await.unwrap();
    assert_eq!(previous.status, RecordStatus::Inactive);
    assert!(previous.returned_date.is_some());

    let active = active_for(&f.repository, &camera.id).await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].officer_id, second.id);

    let equipment = f.repository.equipment_get(&camera.id).await.unwrap();
    assert_eq!(equipment.assigned_to.as_deref(), Some(second.id.as_str()));
    assert_eq!(equipment.status, EquipmentStatus::InUse);
}

#[tokio::test]
async fn test_denormalized_names_are_kept_as_submitted() {
    let f = fixture();
    let sergeant = seed_officer(&f.repository, "Maya", "Iyer", "traffic", Rank::Sergeant).await;
    let officer = seed_officer(&f.repository, "Arjun", "Rao", "traffic", Rank::Officer).await;
    let radio = seed_equipment(&f.repository, "Radio 9", "traffic", None).await;

    let form = assign_form(&radio.id, "Old radio label", &officer.id, "A. Rao");
    f.services
        .assignments
        .assign(&context(&sergeant), &form)
        .await
        .unwrap();

    let history = f.services.directory.assignment_history(&radio.id).await.unwrap();
    assert_eq!(history[0].assignment.asset_name, "Old radio label");
    assert_eq!(history[0].assignment.officer_name, "A. Rao");
    assert_eq!(
        history[0].officer.as_ref().map(|o| o.full_name.as_str()),
        Some("Arjun Rao")
    );
}

/// Two callers running the unguarded read-then-write sequence both see no
/// active record and both insert one.
#[tokio::test]
async fn test_unguarded_sequence_races() {
    let f = fixture();
    let radio = seed_equipment(&f.repository, "Radio 1", "traffic", None).await;

    let seen_by_first = active_for(&f.repository, &radio.id).await;
    let seen_by_second = active_for(&f.repository, &radio.id).await;
    assert!(seen_by_first.is_empty() && seen_by_second.is_empty());

    for officer_id in ["o-1", "o-2"] {
        let assignment = Assignment {
            id: new_id(),
            asset_id: radio.id.clone(),
            asset_name: radio.name.clone(),
            officer_id: officer_id.to_string(),
            officer_name: officer_id.to_string(),
            assigned_by: None,
            assigned_date: Utc::now(),
            returned_date: None,
            status: RecordStatus::Active,
        };
        f.repository
            .store
            .create(collections::ASSIGNMENTS, &assignment.id, encode(&assignment).unwrap())
            .await
            .unwrap();
    }

    assert_eq!(active_for(&f.repository, &radio.id).await.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_assigns_leave_exactly_one_active() {
    let mut config = AppConfig::default();
    config.store.max_transaction_attempts = 50;
    let f = fixture_with(config);

    let sergeant = seed_officer(&f.repository, "Maya", "Iyer", "traffic", Rank::Sergeant).await;
    let radio = seed_equipment(&f.repository, "Radio 2", "traffic", None).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let officer = seed_officer(&f.repository, &format!("Officer{}", i), "Rao", "traffic", Rank::Officer).await;
        let services = f.services.clone();
        let ctx = context(&sergeant);
        let form = assign_form(&radio.id, &radio.name, &officer.id, &officer.full_name());
        handles.push(tokio::spawn(async move {
            services.assignments.assign(&ctx, &form).await
        }));
    }

    let mut succeeded = BTreeSet::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(receipt) => {
                succeeded.insert(receipt.assignment.id);
            }
            Err(AppError::Conflict(_)) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }
    }
    assert!(!succeeded.is_empty());

    let active = active_for(&f.repository, &radio.id).await;
    assert_eq!(active.len(), 1);
    assert!(succeeded.contains(&active[0].id));

    let history = f.repository.assignments_history(&radio.id).await.unwrap();
    assert_eq!(history.len(), succeeded.len());
    assert_eq!(history[0].id, active[0].id);
}

#[tokio::test]
async fn test_idempotent_resubmission_returns_same_assignment() {
    let f = fixture();
    let sergeant = seed_officer(&f.repository, "Maya", "Iyer", "traffic", Rank::Sergeant).await;
    let officer = seed_officer(&f.repository, "Arjun", "Rao", "traffic", Rank::Officer).await;
    let radio = seed_equipment(&f.repository, "Radio 4", "traffic", None).await;

    let mut form = assign_form(&radio.id, &radio.name, &officer.id, &officer.full_name());
    form.idempotency_key = Some("req-42".to_string());

    let first = f.services.assignments.assign(&context(&sergeant), &form).await.unwrap();
    let second = f.services.assignments.assign(&context(&sergeant), &form).await.unwrap();

    assert!(!first.replayed);
    assert!(second.replayed);
    assert_eq!(first.assignment.id, second.assignment.id);
    assert_eq!(f.repository.assignments_history(&radio.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_blank_names_are_filled_from_records() {
    let f = fixture();
    let sergeant = seed_officer(&f.repository, "Maya", "Iyer", "traffic", Rank::Sergeant).await;
    let officer = seed_officer(&f.repository, "Arjun", "Rao", "traffic", Rank::Officer).await;
    let radio = seed_equipment(&f.repository, "Radio 10", "traffic", None).await;

    let form = assign_form(&radio.id, "", &officer.id, "  ");
    let receipt = f.services.assignments.assign(&context(&sergeant), &form).await.unwrap();

    assert_eq!(receipt.assignment.asset_name, "Radio 10");
    assert_eq!(receipt.assignment.officer_name, "Arjun Rao");
    let equipment = f.repository.equipment_get(&radio.id).await.unwrap();
    assert_eq!(equipment.assigned_to_name.as_deref(), Some("Arjun Rao"));
}

#[tokio::test]
async fn test_same_key_from_different_supervisors_is_independent() {
    let f = fixture();
    let first = seed_officer(&f.repository, "Maya", "Iyer", "traffic", Rank::Sergeant).await;
    let second = seed_officer(&f.repository, "Dev", "Joshi", "traffic", Rank::Lieutenant).await;
    let officer = seed_officer(&f.repository, "Arjun", "Rao", "traffic", Rank::Officer).await;
    let radio = seed_equipment(&f.repository, "Radio 11", "traffic", None).await;
    let camera = seed_equipment(&f.repository, "Body Cam 11", "traffic", None).await;

    let mut form = assign_form(&radio.id, &radio.name, &officer.id, &officer.full_name());
    form.idempotency_key = Some("1".to_string());
    let by_first = f.services.assignments.assign(&context(&first), &form).await.unwrap();

    let mut form = assign_form(&camera.id, &camera.name, &officer.id, &officer.full_name());
    form.idempotency_key = Some("1".to_string());
    let by_second = f.services.assignments.assign(&context(&second), &form).await.unwrap();

    assert!(!by_second.replayed);
    assert_ne!(by_first.assignment.id, by_second.assignment.id);
    assert_eq!(by_second.assignment.asset_id, camera.id);
    assert_eq!(active_for(&f.repository, &camera.id).await.len(), 1);
}

#[tokio::test]
async fn test_reused_key_with_different_assignee_conflicts() {
    let f = fixture();
    let sergeant = seed_officer(&f.repository, "Maya", "Iyer", "traffic", Rank::Sergeant).await;
    let first = seed_officer(&f.repository, "Arjun", "Rao", "traffic", Rank::Officer).await;
    let second = seed_officer(&f.repository, "Neha", "Shah", "traffic", Rank::Officer).await;
    let radio = seed_equipment(&f.repository, "Radio 12", "traffic", None).await;

    let mut form = assign_form(&radio.id, &radio.name, &first.id, &first.full_name());
    form.idempotency_key = Some("req-7".to_string());
    f.services.assignments.assign(&context(&sergeant), &form).await.unwrap();

    let mut changed = assign_form(&radio.id, &radio.name, &second.id, &second.full_name());
    changed.idempotency_key = Some("req-7".to_string());
    assert!(matches!(
        f.services.assignments.assign(&context(&sergeant), &changed).await,
        Err(AppError::Conflict(_))
    ));

    let active = active_for(&f.repository, &radio.id).await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].officer_id, first.id);
}

#[tokio::test]
async fn test_assignee_must_exist_and_be_active() {
    let f = fixture();
    let sergeant = seed_officer(&f.repository, "Maya", "Iyer", "traffic", Rank::Sergeant).await;
    let retired = seed_officer(&f.repository, "Arjun", "Rao", "traffic", Rank::Officer).await;
    let radio = seed_equipment(&f.repository, "Radio 13", "traffic", None).await;
    deactivate_officer(&f.repository, &retired).await;

    let unknown = assign_form(&radio.id, &radio.name, "no-such-officer", "Ghost");
    assert!(matches!(
        f.services.assignments.assign(&context(&sergeant), &unknown).await,
        Err(AppError::NotFound(_))
    ));

    let inactive = assign_form(&radio.id, &radio.name, &retired.id, &retired.full_name());
    match f.services.assignments.assign(&context(&sergeant), &inactive).await {
        Err(AppError::InvalidForm(errors)) => assert_eq!(
            errors.get("officer_id").map(String::as_str),
            Some("Selected officer is not active")
        ),
        other => panic!("expected form errors, got {:?}", other.map(|r| r.assignment.id)),
    }

    assert!(f.repository.assignments_history(&radio.id).await.unwrap().is_empty());
    let equipment = f.repository.equipment_get(&radio.id).await.unwrap();
    assert_eq!(equipment.assigned_to, None);
    assert_eq!(equipment.status, EquipmentStatus::Available);
}

#[tokio::test]
async fn test_assign_validation_and_permissions() {
    let f = fixture();
    let sergeant = seed_officer(&f.repository, "Maya", "Iyer", "traffic", Rank::Sergeant).await;
    let constable = seed_officer(&f.repository, "Arjun", "Rao", "traffic", Rank::Officer).await;
    let radio = seed_equipment(&f.repository, "Radio 5", "traffic", None).await;

    match f
        .services
        .assignments
        .assign(&context(&sergeant), &assign_form(" ", "", "", ""))
        .await
    {
        Err(AppError::InvalidForm(errors)) => {
            assert_eq!(errors.get("asset_id").map(String::as_str), Some("Asset ID is required"));
            assert_eq!(errors.get("officer_id").map(String::as_str), Some("Officer is required"));
        }
        other => panic!("expected form errors, got {:?}", other.map(|r| r.assignment.id)),
    }

    let form = assign_form(&radio.id, &radio.name, &constable.id, &constable.full_name());
    assert!(matches!(
        f.services.assignments.assign(&context(&constable), &form).await,
        Err(AppError::Authorization(_))
    ));

    let missing = assign_form("no-such-asset", "Ghost", &constable.id, &constable.full_name());
    assert!(matches!(
        f.services.assignments.assign(&context(&sergeant), &missing).await,
        Err(AppError::NotFound(_))
    ));

    assert_err!(f.services.assignments.assign(&context(&constable), &form).await);
    assert!(active_for(&f.repository, &radio.id).await.is_empty());
}
