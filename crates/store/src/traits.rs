use async_trait::async_trait;
use time::PrimitiveDateTime;

use caliper_model::{AssignmentId, Record, RecordId, TaskAssignment, Template, TemplateId, UserId};

use crate::error::StoreError;

/// The storage trait for checksheet backends.
///
/// A `CheckStore` implementation holds the three durable collections
/// the engine operates on: templates, records, and task assignments,
/// plus the id counter and the monthly record partitions.
///
/// ## Versioned template writes
///
/// `put_template` is the persistence end of a definition sync. An
/// insert always succeeds; an update must carry a version strictly
/// greater than the stored one, otherwise the write is stale and the
/// method returns `Err(StoreError::Conflict { .. })`.
///
/// ## Partitions
///
/// Records live in per-month buckets keyed `records_YYYY_MM`. Writing
/// a record creates its bucket on demand; `ensure_partition` exists so
/// a maintenance job can create next month's bucket ahead of traffic.
/// It is idempotent.
///
/// ## Thread safety
///
/// Implementations must be `Send + Sync + 'static` to be shared across
/// async task boundaries.
#[async_trait]
pub trait CheckStore: Send + Sync + 'static {
    // ── Templates ─────────────────────────────────────────────────────────────

    /// Insert or update a template, rejecting stale versions.
    async fn put_template(&self, template: Template) -> Result<(), StoreError>;

    /// Fetch a template by id.
    ///
    /// Returns `Err(StoreError::NotFound)` if absent.
    async fn template(&self, id: TemplateId) -> Result<Template, StoreError>;

    /// Fetch a template by its business code (e.g. "QC001").
    async fn template_by_code(&self, code: &str) -> Result<Template, StoreError>;

    /// All templates, active ones first, deterministic order within
    /// each group (ascending id).
    async fn templates(&self) -> Result<Vec<Template>, StoreError>;

    // ── Records ───────────────────────────────────────────────────────────────

    /// Insert or replace a record.
    async fn put_record(&self, record: Record) -> Result<(), StoreError>;

    /// Fetch a record by id.
    async fn record(&self, id: RecordId) -> Result<Record, StoreError>;

    /// A user's records created at or after `since`, oldest first.
    ///
    /// This is the recent-records feed the duty matcher consumes.
    async fn records_for_user(
        &self,
        user_id: UserId,
        since: PrimitiveDateTime,
    ) -> Result<Vec<Record>, StoreError>;

    // ── Assignments ───────────────────────────────────────────────────────────

    /// Insert or replace a task assignment.
    async fn put_assignment(&self, assignment: TaskAssignment) -> Result<(), StoreError>;

    /// Fetch an assignment by id.
    async fn assignment(&self, id: AssignmentId) -> Result<TaskAssignment, StoreError>;

    /// Active assignments the user is a member of, ascending id.
    async fn assignments_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<TaskAssignment>, StoreError>;

    // ── Ids and partitions ────────────────────────────────────────────────────

    /// Allocate the next id from the store-wide sequence.
    async fn next_id(&self) -> Result<u64, StoreError>;

    /// Create the record bucket for the given month if it does not
    /// exist yet. Calling it again for the same month is a no-op.
    async fn ensure_partition(&self, year: i32, month: u8) -> Result<(), StoreError>;

    /// The partition keys currently present, sorted.
    async fn partitions(&self) -> Result<Vec<String>, StoreError>;
}

/// The bucket key for a record created at `at`: `records_YYYY_MM`.
pub fn partition_key(at: PrimitiveDateTime) -> String {
    partition_key_for(at.year(), u8::from(at.month()))
}

/// The bucket key for an explicit year/month pair.
pub fn partition_key_for(year: i32, month: u8) -> String {
    format!("records_{year:04}_{month:02}")
}
