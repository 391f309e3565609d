//! Monthly partition maintenance.
//!
//! Record buckets are created on demand, but a partitioned backend
//! wants next month's bucket in place before the first write of the
//! month lands. [`PartitionJob`] does exactly one thing: ensure the
//! partition for the month after `now`. A failed attempt is logged and
//! dropped; the next monthly tick retries it.

use std::sync::Arc;

use time::{Date, Month, PrimitiveDateTime};

use crate::traits::CheckStore;

pub struct PartitionJob<S> {
    store: Arc<S>,
}

impl<S: CheckStore> PartitionJob<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Ensure the partition for the month after `now` exists.
    ///
    /// Never propagates the store error: the job has no caller that
    /// could act on it, and the partition is retried next tick.
    pub async fn run_once(&self, now: PrimitiveDateTime) {
        let (year, month) = month_after(now);
        match self.store.ensure_partition(year, u8::from(month)).await {
            Ok(()) => {
                tracing::debug!(year, month = u8::from(month), "partition ensured");
            }
            Err(err) => {
                tracing::warn!(
                    year,
                    month = u8::from(month),
                    error = %err,
                    "partition maintenance failed; will retry next tick"
                );
            }
        }
    }
}

/// The first instant of the month after `now`.
pub fn next_tick(now: PrimitiveDateTime) -> PrimitiveDateTime {
    let (year, month) = month_after(now);
    // Day 1 of a valid month never fails.
    Date::from_calendar_date(year, month, 1)
        .expect("first of month")
        .midnight()
}

fn month_after(now: PrimitiveDateTime) -> (i32, Month) {
    match now.month() {
        Month::December => (now.year() + 1, Month::January),
        m => (now.year(), m.next()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn next_tick_is_first_instant_of_next_month() {
        assert_eq!(
            next_tick(datetime!(2026-03-02 12:00:00)),
            datetime!(2026-04-01 00:00:00)
        );
        assert_eq!(
            next_tick(datetime!(2026-03-31 23:59:59)),
            datetime!(2026-04-01 00:00:00)
        );
    }

    #[test]
    fn next_tick_rolls_over_the_year() {
        assert_eq!(
            next_tick(datetime!(2026-12-15 08:00:00)),
            datetime!(2027-01-01 00:00:00)
        );
    }

    #[tokio::test]
    async fn job_creates_next_months_partition() {
        use crate::memory::MemoryStore;
        use crate::traits::CheckStore as _;

        let store = Arc::new(MemoryStore::default());
        let job = PartitionJob::new(store.clone());
        job.run_once(datetime!(2026-03-02 12:00:00)).await;
        assert_eq!(
            store.partitions().await.unwrap(),
            vec!["records_2026_04".to_string()]
        );

        // Idempotent across repeated ticks.
        job.run_once(datetime!(2026-03-20 12:00:00)).await;
        assert_eq!(store.partitions().await.unwrap().len(), 1);
    }

    /// A backend whose `ensure_partition` can be toggled into a failure
    /// mode; everything else delegates to an in-memory store.
    struct FlakyStore {
        inner: crate::memory::MemoryStore,
        failing: std::sync::atomic::AtomicBool,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: crate::memory::MemoryStore::default(),
                failing: std::sync::atomic::AtomicBool::new(true),
            }
        }

        fn recover(&self) {
            self.failing
                .store(false, std::sync::atomic::Ordering::SeqCst);
        }
    }

    #[async_trait::async_trait]
    impl CheckStore for FlakyStore {
        async fn put_template(
            &self,
            template: caliper_model::Template,
        ) -> Result<(), crate::StoreError> {
            self.inner.put_template(template).await
        }

        async fn template(
            &self,
            id: caliper_model::TemplateId,
        ) -> Result<caliper_model::Template, crate::StoreError> {
            self.inner.template(id).await
        }

        async fn template_by_code(
            &self,
            code: &str,
        ) -> Result<caliper_model::Template, crate::StoreError> {
            self.inner.template_by_code(code).await
        }

        async fn templates(&self) -> Result<Vec<caliper_model::Template>, crate::StoreError> {
            self.inner.templates().await
        }

        async fn put_record(
            &self,
            record: caliper_model::Record,
        ) -> Result<(), crate::StoreError> {
            self.inner.put_record(record).await
        }

        async fn record(
            &self,
            id: caliper_model::RecordId,
        ) -> Result<caliper_model::Record, crate::StoreError> {
            self.inner.record(id).await
        }

        async fn records_for_user(
            &self,
            user_id: caliper_model::UserId,
            since: PrimitiveDateTime,
        ) -> Result<Vec<caliper_model::Record>, crate::StoreError> {
            self.inner.records_for_user(user_id, since).await
        }

        async fn put_assignment(
            &self,
            assignment: caliper_model::TaskAssignment,
        ) -> Result<(), crate::StoreError> {
            self.inner.put_assignment(assignment).await
        }

        async fn assignment(
            &self,
            id: caliper_model::AssignmentId,
        ) -> Result<caliper_model::TaskAssignment, crate::StoreError> {
            self.inner.assignment(id).await
        }

        async fn assignments_for_user(
            &self,
            user_id: caliper_model::UserId,
        ) -> Result<Vec<caliper_model::TaskAssignment>, crate::StoreError> {
            self.inner.assignments_for_user(user_id).await
        }

        async fn next_id(&self) -> Result<u64, crate::StoreError> {
            self.inner.next_id().await
        }

        async fn ensure_partition(&self, year: i32, month: u8) -> Result<(), crate::StoreError> {
            if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(crate::StoreError::Backend("partition backend down".into()));
            }
            self.inner.ensure_partition(year, month).await
        }

        async fn partitions(&self) -> Result<Vec<String>, crate::StoreError> {
            self.inner.partitions().await
        }
    }

    #[tokio::test]
    async fn failed_tick_is_swallowed_and_retried_next_tick() {
        let store = Arc::new(FlakyStore::new());
        let job = PartitionJob::new(store.clone());

        // The failing tick returns normally and leaves no partition.
        job.run_once(datetime!(2026-03-02 12:00:00)).await;
        assert!(store.partitions().await.unwrap().is_empty());

        // Backend back up: the next monthly tick creates the bucket.
        store.recover();
        let retry_at = next_tick(datetime!(2026-03-02 12:00:00));
        job.run_once(retry_at).await;
        assert_eq!(
            store.partitions().await.unwrap(),
            vec!["records_2026_05".to_string()]
        );
    }
}
