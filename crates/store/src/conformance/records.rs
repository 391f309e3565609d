use std::future::Future;

use time::macros::datetime;

use super::{make_record, TestResult, T0};
use crate::{CheckStore, StoreError};

pub(super) async fn run_record_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "records",
        "put_then_get_round_trips",
        put_then_get_round_trips(factory).await,
    ));
    results.push(TestResult::from_result(
        "records",
        "missing_id_is_not_found",
        missing_id_is_not_found(factory).await,
    ));
    results.push(TestResult::from_result(
        "records",
        "user_window_filters_by_user",
        user_window_filters_by_user(factory).await,
    ));
    results.push(TestResult::from_result(
        "records",
        "user_window_honors_since_inclusively",
        user_window_honors_since_inclusively(factory).await,
    ));
    results.push(TestResult::from_result(
        "records",
        "user_window_is_oldest_first",
        user_window_is_oldest_first(factory).await,
    ));
    results.push(TestResult::from_result(
        "records",
        "user_window_spans_month_buckets",
        user_window_spans_month_buckets(factory).await,
    ));
    results.push(TestResult::from_result(
        "records",
        "write_creates_its_month_partition",
        write_creates_its_month_partition(factory).await,
    ));

    results
}

// ── Test implementations ──────────────────────────────────────────────────────

async fn put_then_get_round_trips<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let record = make_record(10, 1, 7, T0);
    s.put_record(record.clone())
        .await
        .map_err(|e| e.to_string())?;
    let got = s.record(10).await.map_err(|e| e.to_string())?;
    if got != record {
        return Err("stored record differs from the one written".to_string());
    }
    Ok(())
}

async fn missing_id_is_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.record(404).await {
        Err(StoreError::NotFound { entity, .. }) if entity == "record" => Ok(()),
        Err(other) => Err(format!("expected NotFound, got {other}")),
        Ok(_) => Err("expected NotFound, got a record".to_string()),
    }
}

async fn user_window_filters_by_user<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.put_record(make_record(10, 1, 7, T0))
        .await
        .map_err(|e| e.to_string())?;
    s.put_record(make_record(11, 1, 8, T0))
        .await
        .map_err(|e| e.to_string())?;

    let got = s
        .records_for_user(7, datetime!(2026-03-01 00:00:00))
        .await
        .map_err(|e| e.to_string())?;
    if got.len() != 1 || got[0].id != 10 {
        return Err(format!(
            "expected exactly record 10, got {:?}",
            got.iter().map(|r| r.id).collect::<Vec<_>>()
        ));
    }
    Ok(())
}

async fn user_window_honors_since_inclusively<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.put_record(make_record(10, 1, 7, datetime!(2026-03-02 11:59:59)))
        .await
        .map_err(|e| e.to_string())?;
    s.put_record(make_record(11, 1, 7, T0))
        .await
        .map_err(|e| e.to_string())?;

    let got = s.records_for_user(7, T0).await.map_err(|e| e.to_string())?;
    let ids: Vec<u64> = got.iter().map(|r| r.id).collect();
    if ids != [11] {
        return Err(format!("expected [11] (since is inclusive), got {ids:?}"));
    }
    Ok(())
}

async fn user_window_is_oldest_first<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.put_record(make_record(12, 1, 7, datetime!(2026-03-04 09:00:00)))
        .await
        .map_err(|e| e.to_string())?;
    s.put_record(make_record(10, 1, 7, datetime!(2026-03-02 09:00:00)))
        .await
        .map_err(|e| e.to_string())?;
    s.put_record(make_record(11, 1, 7, datetime!(2026-03-03 09:00:00)))
        .await
        .map_err(|e| e.to_string())?;

    let got = s
        .records_for_user(7, datetime!(2026-03-01 00:00:00))
        .await
        .map_err(|e| e.to_string())?;
    let ids: Vec<u64> = got.iter().map(|r| r.id).collect();
    if ids != [10, 11, 12] {
        return Err(format!("expected [10, 11, 12], got {ids:?}"));
    }
    Ok(())
}

async fn user_window_spans_month_buckets<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.put_record(make_record(10, 1, 7, datetime!(2026-02-27 09:00:00)))
        .await
        .map_err(|e| e.to_string())?;
    s.put_record(make_record(11, 1, 7, datetime!(2026-03-02 09:00:00)))
        .await
        .map_err(|e| e.to_string())?;

    let got = s
        .records_for_user(7, datetime!(2026-02-01 00:00:00))
        .await
        .map_err(|e| e.to_string())?;
    if got.len() != 2 {
        return Err(format!(
            "expected records from both months, got {:?}",
            got.iter().map(|r| r.id).collect::<Vec<_>>()
        ));
    }
    Ok(())
}

async fn write_creates_its_month_partition<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.put_record(make_record(10, 1, 7, T0))
        .await
        .map_err(|e| e.to_string())?;
    let partitions = s.partitions().await.map_err(|e| e.to_string())?;
    if !partitions.iter().any(|p| p == "records_2026_03") {
        return Err(format!(
            "expected records_2026_03 in partitions, got {partitions:?}"
        ));
    }
    Ok(())
}
