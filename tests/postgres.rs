//! PostgreSQL store tests
//!
//! Need a scratch database: `DATABASE_URL=postgres://... cargo test -- --ignored`

mod common;

use std::collections::BTreeSet;

use precinct_server::{
    config::AppConfig,
    error::AppError,
    models::{CreateAssignment, Rank},
    repository::{collections, store::fields, CommitOutcome, Direction, Query, Repository, Write, WriteBatch},
    AppState,
};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;

use common::{context, seed_equipment, seed_officer};

async fn repository() -> Repository {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    Repository::postgres(pool)
}

#[tokio::test]
#[ignore]
async fn test_pg_find_filters_and_orders() {
    let repository = repository().await;
    let department = format!("dept-{}", precinct_server::repository::new_id());
    for name in ["Charlie", "Alpha", "Bravo"] {
        seed_officer(&repository, name, "Test", &department, Rank::Officer).await;
    }

    let query = Query::new()
        .filter("department_id", department.as_str())
        .order_by("first_name", Direction::Ascending);
    let officers = repository.officers_list(&query).await.unwrap();
    let names: Vec<_> = officers.iter().map(|o| o.first_name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Bravo", "Charlie"]);

    let none = repository
        .lookup(collections::OFFICERS, &Query::new().filter("department_id", "no-such-dept"))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_pg_rejected_batch_reports_and_writes_nothing() {
    let repository = repository().await;
    let holder = seed_officer(&repository, "Hold", "Er", "pg", Rank::Officer).await;
    let item = seed_equipment(&repository, "PG Radio", "pg", Some(&holder)).await;

    let mut batch = WriteBatch::new();
    batch
        .push(
            Write::update(collections::EQUIPMENT, &item.id, fields(json!({"status": "maintenance"})))
                .expect_field("assigned_to", "someone-else"),
        )
        .push(Write::update(collections::EQUIPMENT, "missing", fields(json!({"status": "maintenance"}))));

    match repository.store.commit(batch).await.unwrap() {
        CommitOutcome::Rejected(failures) => assert_eq!(failures.len(), 2),
        other => panic!("expected rejection, got {:?}", other),
    }
    let unchanged = repository.equipment_get(&item.id).await.unwrap();
    assert_eq!(unchanged.status, item.status);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_pg_concurrent_assigns_leave_exactly_one_active() {
    let repository = repository().await;
    let mut config = AppConfig::default();
    config.store.max_transaction_attempts = 20;
    let state = AppState::new(config, repository.clone());

    let sergeant = seed_officer(&repository, "Sam", "Sergeant", "pg", Rank::Sergeant).await;
    let radio = seed_equipment(&repository, "PG Radio 2", "pg", None).await;

    let mut handles = Vec::new();
    for i in 0..6 {
        let officer = seed_officer(&repository, &format!("Pg{}", i), "Officer", "pg", Rank::Officer).await;
        let services = state.services.clone();
        let ctx = context(&sergeant);
        let form = CreateAssignment {
            asset_id: radio.id.clone(),
            asset_name: radio.name.clone(),
            officer_id: officer.id.clone(),
            officer_name: officer.full_name(),
            idempotency_key: None,
        };
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

    let active = repository.assignments_active_for_asset(&radio.id).await.unwrap();
    assert_eq!(active.len(), 1);
    assert!(succeeded.contains(&active[0].id));
}
