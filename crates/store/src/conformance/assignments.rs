use std::future::Future;

use super::{make_assignment, TestResult};
use crate::{CheckStore, StoreError};

pub(super) async fn run_assignment_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "assignments",
        "put_then_get_round_trips",
        put_then_get_round_trips(factory).await,
    ));
    results.push(TestResult::from_result(
        "assignments",
        "missing_id_is_not_found",
        missing_id_is_not_found(factory).await,
    ));
    results.push(TestResult::from_result(
        "assignments",
        "user_listing_filters_by_membership",
        user_listing_filters_by_membership(factory).await,
    ));
    results.push(TestResult::from_result(
        "assignments",
        "user_listing_excludes_inactive",
        user_listing_excludes_inactive(factory).await,
    ));
    results.push(TestResult::from_result(
        "assignments",
        "rewrite_replaces_in_place",
        rewrite_replaces_in_place(factory).await,
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
    let assignment = make_assignment(1, 1, vec![7]);
    s.put_assignment(assignment.clone())
        .await
        .map_err(|e| e.to_string())?;
    let got = s.assignment(1).await.map_err(|e| e.to_string())?;
    if got != assignment {
        return Err("stored assignment differs from the one written".to_string());
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
    match s.assignment(404).await {
        Err(StoreError::NotFound { entity, .. }) if entity == "assignment" => Ok(()),
        Err(other) => Err(format!("expected NotFound, got {other}")),
        Ok(_) => Err("expected NotFound, got an assignment".to_string()),
    }
}

async fn user_listing_filters_by_membership<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.put_assignment(make_assignment(1, 1, vec![7, 8]))
        .await
        .map_err(|e| e.to_string())?;
    s.put_assignment(make_assignment(2, 1, vec![8]))
        .await
        .map_err(|e| e.to_string())?;

    let ids: Vec<u64> = s
        .assignments_for_user(7)
        .await
        .map_err(|e| e.to_string())?
        .iter()
        .map(|a| a.id)
        .collect();
    if ids != [1] {
        return Err(format!("expected [1], got {ids:?}"));
    }
    Ok(())
}

async fn user_listing_excludes_inactive<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut retired = make_assignment(1, 1, vec![7]);
    retired.active = false;
    s.put_assignment(retired).await.map_err(|e| e.to_string())?;
    s.put_assignment(make_assignment(2, 1, vec![7]))
        .await
        .map_err(|e| e.to_string())?;

    let ids: Vec<u64> = s
        .assignments_for_user(7)
        .await
        .map_err(|e| e.to_string())?
        .iter()
        .map(|a| a.id)
        .collect();
    if ids != [2] {
        return Err(format!("expected [2], got {ids:?}"));
    }
    Ok(())
}

async fn rewrite_replaces_in_place<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.put_assignment(make_assignment(1, 1, vec![7]))
        .await
        .map_err(|e| e.to_string())?;
    let mut updated = make_assignment(1, 1, vec![7, 8]);
    updated.name = "widened".to_string();
    s.put_assignment(updated).await.map_err(|e| e.to_string())?;

    let got = s.assignment(1).await.map_err(|e| e.to_string())?;
    if got.name != "widened" || got.user_ids != [7, 8] {
        return Err(format!(
            "expected the rewritten assignment, got name \"{}\" users {:?}",
            got.name, got.user_ids
        ));
    }
    Ok(())
}
