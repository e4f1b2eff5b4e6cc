//! Repository tests against a live PostgreSQL database.
//!
//! Ignored by default. Run with
//! `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`.

#![allow(clippy::panic)]

use chrono::{DateTime, TimeZone, Utc};
use sqlx::PgPool;

use puzzle_tracker::domain::{NewPuzzle, Puzzle, PuzzleChanges, PuzzleId};
use puzzle_tracker::error::PuzzleError;
use puzzle_tracker::persistence::{PostgresPuzzleRepository, PuzzleRepository, postgres};

async fn repository() -> PostgresPuzzleRepository {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        panic!("TEST_DATABASE_URL must point at a scratch database");
    };
    let Ok(pool) = PgPool::connect(&url).await else {
        panic!("connect to {url}");
    };
    let Ok(()) = postgres::migrate(&pool).await else {
        panic!("migrate");
    };
    PostgresPuzzleRepository::new(pool)
}

fn at(secs: i64) -> DateTime<Utc> {
    let Some(t) = Utc.timestamp_opt(secs, 0).single() else {
        panic!("valid timestamp");
    };
    t
}

/// Name unique to this run so tests can share one database.
fn unique(prefix: &str) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{prefix}-{}-{nanos}", std::process::id())
}

async fn insert(repo: &PostgresPuzzleRepository, name: &str) -> Puzzle {
    let Ok(stored) = repo
        .insert(NewPuzzle::new(name.to_string(), format!("1_{name}.png"), at(1_700_000_000)))
        .await
    else {
        panic!("insert {name}");
    };
    stored
}

#[tokio::test]
#[ignore = "requires PostgreSQL at TEST_DATABASE_URL"]
async fn duplicate_insert_is_conflict() {
    let repo = repository().await;
    let name = unique("dup");
    let first = insert(&repo, &name).await;

    let again = repo
        .insert(NewPuzzle::new(name.clone(), "2_other.png".into(), at(1_700_000_001)))
        .await;
    assert!(matches!(again, Err(PuzzleError::Conflict(_))), "{again:?}");

    let _ = repo.delete(first.id).await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL at TEST_DATABASE_URL"]
async fn update_fields_keeps_unset_columns() {
    let repo = repository().await;
    let name = unique("partial");
    let stored = insert(&repo, &name).await;

    let changes = PuzzleChanges {
        best_time: Some(4_200),
        last_best_time_at: Some(at(1_700_000_100)),
        ..PuzzleChanges::default()
    };
    let Ok(updated) = repo.update_fields(stored.id, &changes).await else {
        panic!("update_fields");
    };
    assert_eq!(updated.name, name);
    assert_eq!(updated.image_reference, stored.image_reference);
    assert_eq!(updated.created_at, stored.created_at);
    assert_eq!(updated.last_played_at, stored.last_played_at);
    assert_eq!(updated.best_time, 4_200);
    assert_eq!(updated.last_best_time_at, Some(at(1_700_000_100)));

    let Ok(untouched) = repo.update_fields(stored.id, &PuzzleChanges::default()).await else {
        panic!("empty update");
    };
    assert_eq!(untouched, updated);

    let _ = repo.delete(stored.id).await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL at TEST_DATABASE_URL"]
async fn rename_onto_taken_name_is_conflict() {
    let repo = repository().await;
    let taken = insert(&repo, &unique("taken")).await;
    let other = insert(&repo, &unique("other")).await;

    let changes = PuzzleChanges {
        name: Some(taken.name.clone()),
        ..PuzzleChanges::default()
    };
    let result = repo.update_fields(other.id, &changes).await;
    assert!(matches!(result, Err(PuzzleError::Conflict(_))), "{result:?}");

    let _ = repo.delete(taken.id).await;
    let _ = repo.delete(other.id).await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL at TEST_DATABASE_URL"]
async fn save_rewrites_every_column() {
    let repo = repository().await;
    let mut puzzle = insert(&repo, &unique("save")).await;

    puzzle.record_play(9_000, at(1_700_000_500));
    let Ok(saved) = repo.save(&puzzle).await else {
        panic!("save");
    };
    assert_eq!(saved, puzzle);

    let Ok(reloaded) = repo.find_by_name(&puzzle.name).await else {
        panic!("find_by_name");
    };
    assert_eq!(reloaded, puzzle);

    let _ = repo.delete(puzzle.id).await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL at TEST_DATABASE_URL"]
async fn missing_rows_are_not_found() {
    let repo = repository().await;
    let id = PuzzleId::new(i64::MAX);

    assert!(matches!(repo.find_by_id(id).await, Err(PuzzleError::NotFound(_))));
    assert!(matches!(repo.delete(id).await, Err(PuzzleError::NotFound(_))));
    assert!(matches!(
        repo.update_fields(id, &PuzzleChanges::default()).await,
        Err(PuzzleError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore = "requires PostgreSQL at TEST_DATABASE_URL"]
async fn count_follows_inserts_and_deletes() {
    let repo = repository().await;
    let Ok(before) = repo.count().await else {
        panic!("count");
    };
    let stored = insert(&repo, &unique("count")).await;
    assert!(matches!(repo.count().await, Ok(n) if n >= before + 1));

    let _ = repo.delete(stored.id).await;
}
