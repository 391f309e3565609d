//! Conformance test suite for `CheckStore` implementations.
//!
//! A backend-agnostic suite any `CheckStore` can run to verify it
//! honors the trait contract. The suite covers:
//!
//! - **Templates**: round-trips, code lookup, version conflicts,
//!   active-first ordering
//! - **Records**: round-trips, per-user windows, partition bucketing
//! - **Assignments**: round-trips, active-only membership filtering
//! - **Partitions**: explicit creation, idempotence, key ordering
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory that
//! creates a fresh, empty store per test:
//!
//! ```ignore
//! use caliper_store::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn memory_conformance() {
//!     let report = run_conformance_suite(|| async { MemoryStore::default() }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod assignments;
mod partitions;
mod records;
mod templates;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use time::macros::{datetime, time};
use time::PrimitiveDateTime;

use caliper_model::{
    AssignmentKind, FormContext, OverallResult, Record, RecordStatus, Schedule, TaskAssignment,
    Template,
};

use crate::CheckStore;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "templates", "records").
    pub category: String,
    /// Test name (e.g. "put_then_get_round_trips").
    pub name: String,
    /// Whether the test passed.
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn pass(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: true,
            message: None,
        }
    }

    fn fail(category: &str, name: &str, msg: String) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: false,
            message: Some(msg),
        }
    }

    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::pass(category, name),
            Err(msg) => Self::fail(category, name, msg),
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test to create a fresh,
/// empty store, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: CheckStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(templates::run_template_tests(&factory).await);
    results.extend(records::run_record_tests(&factory).await);
    results.extend(assignments::run_assignment_tests(&factory).await);
    results.extend(partitions::run_partition_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers: fixtures with sensible defaults ─────────────────────────────────

const T0: PrimitiveDateTime = datetime!(2026-03-02 12:00:00);

fn make_template(id: u64, code: &str) -> Template {
    Template {
        id,
        code: code.to_string(),
        name: format!("{code} checksheet"),
        description: None,
        context: FormContext::Machine,
        header_fields: Vec::new(),
        sections: Vec::new(),
        version: 1,
        active: true,
        requires_approval: false,
        allow_partial_save: false,
        company_id: None,
        scope: None,
    }
}

fn make_record(id: u64, template_id: u64, user_id: u64, created_at: PrimitiveDateTime) -> Record {
    Record {
        id,
        template_id,
        template_version: 1,
        machine_id: None,
        product_instance_id: None,
        production_step_id: None,
        header_data: BTreeMap::new(),
        status: RecordStatus::Submitted,
        overall_result: OverallResult::Pass,
        filled_by: user_id,
        values: Vec::new(),
        notes: None,
        created_at,
        submitted_at: Some(created_at),
        approved_at: None,
        approved_by: None,
        rejected_at: None,
        rejected_by: None,
        reject_reason: None,
    }
}

fn make_assignment(id: u64, template_id: u64, user_ids: Vec<u64>) -> TaskAssignment {
    TaskAssignment {
        id,
        template_id,
        kind: AssignmentKind::Recurring,
        name: format!("assignment-{id}"),
        machine_id: None,
        product_id: None,
        user_ids,
        schedules: vec![Schedule {
            id,
            day_of_week: Some(1),
            specific_date: None,
            start_time: time!(08:00),
            end_time: time!(16:00),
        }],
        active: true,
    }
}
