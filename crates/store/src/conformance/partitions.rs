use std::future::Future;

use super::TestResult;
use crate::CheckStore;

pub(super) async fn run_partition_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "partitions",
        "fresh_store_has_none",
        fresh_store_has_none(factory).await,
    ));
    results.push(TestResult::from_result(
        "partitions",
        "ensure_creates_the_bucket",
        ensure_creates_the_bucket(factory).await,
    ));
    results.push(TestResult::from_result(
        "partitions",
        "ensure_is_idempotent",
        ensure_is_idempotent(factory).await,
    ));
    results.push(TestResult::from_result(
        "partitions",
        "listing_is_sorted",
        listing_is_sorted(factory).await,
    ));
    results.push(TestResult::from_result(
        "partitions",
        "next_id_is_monotonic",
        next_id_is_monotonic(factory).await,
    ));

    results
}

// ── Test implementations ──────────────────────────────────────────────────────

async fn fresh_store_has_none<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let partitions = s.partitions().await.map_err(|e| e.to_string())?;
    if !partitions.is_empty() {
        return Err(format!("expected no partitions, got {partitions:?}"));
    }
    Ok(())
}

async fn ensure_creates_the_bucket<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.ensure_partition(2026, 4).await.map_err(|e| e.to_string())?;
    let partitions = s.partitions().await.map_err(|e| e.to_string())?;
    if partitions != ["records_2026_04"] {
        return Err(format!("expected [records_2026_04], got {partitions:?}"));
    }
    Ok(())
}

async fn ensure_is_idempotent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.ensure_partition(2026, 4).await.map_err(|e| e.to_string())?;
    s.ensure_partition(2026, 4).await.map_err(|e| e.to_string())?;
    let partitions = s.partitions().await.map_err(|e| e.to_string())?;
    if partitions.len() != 1 {
        return Err(format!("expected one partition, got {partitions:?}"));
    }
    Ok(())
}

async fn listing_is_sorted<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.ensure_partition(2026, 11).await.map_err(|e| e.to_string())?;
    s.ensure_partition(2026, 4).await.map_err(|e| e.to_string())?;
    s.ensure_partition(2025, 12).await.map_err(|e| e.to_string())?;
    let partitions = s.partitions().await.map_err(|e| e.to_string())?;
    if partitions != ["records_2025_12", "records_2026_04", "records_2026_11"] {
        return Err(format!("expected sorted keys, got {partitions:?}"));
    }
    Ok(())
}

async fn next_id_is_monotonic<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let a = s.next_id().await.map_err(|e| e.to_string())?;
    let b = s.next_id().await.map_err(|e| e.to_string())?;
    let c = s.next_id().await.map_err(|e| e.to_string())?;
    if !(a < b && b < c) {
        return Err(format!("expected strictly increasing ids, got {a}, {b}, {c}"));
    }
    Ok(())
}
