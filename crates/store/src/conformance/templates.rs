use std::future::Future;

use super::{make_template, TestResult};
use crate::{CheckStore, StoreError};

pub(super) async fn run_template_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "templates",
        "put_then_get_round_trips",
        put_then_get_round_trips(factory).await,
    ));
    results.push(TestResult::from_result(
        "templates",
        "missing_id_is_not_found",
        missing_id_is_not_found(factory).await,
    ));
    results.push(TestResult::from_result(
        "templates",
        "lookup_by_code",
        lookup_by_code(factory).await,
    ));
    results.push(TestResult::from_result(
        "templates",
        "missing_code_is_not_found",
        missing_code_is_not_found(factory).await,
    ));
    results.push(TestResult::from_result(
        "templates",
        "newer_version_replaces",
        newer_version_replaces(factory).await,
    ));
    results.push(TestResult::from_result(
        "templates",
        "same_version_rewrite_conflicts",
        same_version_rewrite_conflicts(factory).await,
    ));
    results.push(TestResult::from_result(
        "templates",
        "older_version_rewrite_conflicts",
        older_version_rewrite_conflicts(factory).await,
    ));
    results.push(TestResult::from_result(
        "templates",
        "listing_is_active_first_then_by_id",
        listing_is_active_first_then_by_id(factory).await,
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
    let template = make_template(1, "QC001");
    s.put_template(template.clone())
        .await
        .map_err(|e| e.to_string())?;
    let got = s.template(1).await.map_err(|e| e.to_string())?;
    if got != template {
        return Err("stored template differs from the one written".to_string());
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
    match s.template(404).await {
        Err(StoreError::NotFound { entity, .. }) if entity == "template" => Ok(()),
        Err(other) => Err(format!("expected NotFound, got {other}")),
        Ok(_) => Err("expected NotFound, got a template".to_string()),
    }
}

async fn lookup_by_code<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.put_template(make_template(1, "QC001"))
        .await
        .map_err(|e| e.to_string())?;
    s.put_template(make_template(2, "QC002"))
        .await
        .map_err(|e| e.to_string())?;
    let got = s.template_by_code("QC002").await.map_err(|e| e.to_string())?;
    if got.id != 2 {
        return Err(format!("expected template 2, got {}", got.id));
    }
    Ok(())
}

async fn missing_code_is_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.template_by_code("QC999").await {
        Err(StoreError::NotFound { .. }) => Ok(()),
        Err(other) => Err(format!("expected NotFound, got {other}")),
        Ok(_) => Err("expected NotFound, got a template".to_string()),
    }
}

async fn newer_version_replaces<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.put_template(make_template(1, "QC001"))
        .await
        .map_err(|e| e.to_string())?;
    let mut v2 = make_template(1, "QC001");
    v2.version = 2;
    v2.name = "Renamed".to_string();
    s.put_template(v2).await.map_err(|e| e.to_string())?;
    let got = s.template(1).await.map_err(|e| e.to_string())?;
    if got.version != 2 || got.name != "Renamed" {
        return Err(format!(
            "expected version 2 \"Renamed\", got version {} \"{}\"",
            got.version, got.name
        ));
    }
    Ok(())
}

async fn same_version_rewrite_conflicts<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.put_template(make_template(1, "QC001"))
        .await
        .map_err(|e| e.to_string())?;
    match s.put_template(make_template(1, "QC001")).await {
        Err(StoreError::Conflict { entity, id }) if entity == "template" && id == "1" => Ok(()),
        Err(other) => Err(format!("expected Conflict, got {other}")),
        Ok(()) => Err("expected Conflict, write succeeded".to_string()),
    }
}

async fn older_version_rewrite_conflicts<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut v3 = make_template(1, "QC001");
    v3.version = 3;
    s.put_template(v3).await.map_err(|e| e.to_string())?;
    let mut v2 = make_template(1, "QC001");
    v2.version = 2;
    match s.put_template(v2).await {
        Err(StoreError::Conflict { .. }) => Ok(()),
        Err(other) => Err(format!("expected Conflict, got {other}")),
        Ok(()) => Err("expected Conflict, write succeeded".to_string()),
    }
}

async fn listing_is_active_first_then_by_id<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut retired = make_template(1, "QC001");
    retired.active = false;
    s.put_template(retired).await.map_err(|e| e.to_string())?;
    s.put_template(make_template(3, "QC003"))
        .await
        .map_err(|e| e.to_string())?;
    s.put_template(make_template(2, "QC002"))
        .await
        .map_err(|e| e.to_string())?;

    let ids: Vec<u64> = s
        .templates()
        .await
        .map_err(|e| e.to_string())?
        .iter()
        .map(|t| t.id)
        .collect();
    if ids != [2, 3, 1] {
        return Err(format!("expected order [2, 3, 1], got {ids:?}"));
    }
    Ok(())
}
