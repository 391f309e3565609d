//! In-memory `CheckStore` backend.
//!
//! Backs tests and single-process deployments. All collections sit
//! behind one `tokio::sync::RwLock`; partitions are real map buckets,
//! not a simulation, so partition maintenance is observable here the
//! same way it is against a partitioned database.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use time::PrimitiveDateTime;
use tokio::sync::RwLock;

use caliper_model::{AssignmentId, Record, RecordId, TaskAssignment, Template, TemplateId, UserId};

use crate::error::StoreError;
use crate::traits::{partition_key, partition_key_for, CheckStore};

/// Construction-time knobs for [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryStoreConfig {
    /// First value `next_id` hands out.
    pub id_seed: u64,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self { id_seed: 1 }
    }
}

#[derive(Default)]
struct Inner {
    templates: HashMap<TemplateId, Template>,
    /// Partition key -> records in that month bucket.
    records: BTreeMap<String, BTreeMap<RecordId, Record>>,
    assignments: BTreeMap<AssignmentId, TaskAssignment>,
    next_id: u64,
}

pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new(config: MemoryStoreConfig) -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: config.id_seed,
                ..Inner::default()
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(MemoryStoreConfig::default())
    }
}

#[async_trait]
impl CheckStore for MemoryStore {
    async fn put_template(&self, template: Template) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.templates.get(&template.id) {
            if existing.version >= template.version {
                return Err(StoreError::Conflict {
                    entity: "template",
                    id: template.id.to_string(),
                });
            }
        }
        inner.templates.insert(template.id, template);
        Ok(())
    }

    async fn template(&self, id: TemplateId) -> Result<Template, StoreError> {
        let inner = self.inner.read().await;
        inner
            .templates
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "template",
                id: id.to_string(),
            })
    }

    async fn template_by_code(&self, code: &str) -> Result<Template, StoreError> {
        let inner = self.inner.read().await;
        inner
            .templates
            .values()
            .filter(|t| t.code == code)
            .min_by_key(|t| t.id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "template",
                id: code.to_string(),
            })
    }

    async fn templates(&self) -> Result<Vec<Template>, StoreError> {
        let inner = self.inner.read().await;
        let mut out: Vec<Template> = inner.templates.values().cloned().collect();
        out.sort_by_key(|t| (!t.active, t.id));
        Ok(out)
    }

    async fn put_record(&self, record: Record) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let bucket = partition_key(record.created_at);
        inner
            .records
            .entry(bucket)
            .or_default()
            .insert(record.id, record);
        Ok(())
    }

    async fn record(&self, id: RecordId) -> Result<Record, StoreError> {
        let inner = self.inner.read().await;
        inner
            .records
            .values()
            .find_map(|bucket| bucket.get(&id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "record",
                id: id.to_string(),
            })
    }

    async fn records_for_user(
        &self,
        user_id: UserId,
        since: PrimitiveDateTime,
    ) -> Result<Vec<Record>, StoreError> {
        let inner = self.inner.read().await;
        let mut out: Vec<Record> = inner
            .records
            .values()
            .flat_map(|bucket| bucket.values())
            .filter(|r| r.filled_by == user_id && r.created_at >= since)
            .cloned()
            .collect();
        out.sort_by_key(|r| (r.created_at, r.id));
        Ok(out)
    }

    async fn put_assignment(&self, assignment: TaskAssignment) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.assignments.insert(assignment.id, assignment);
        Ok(())
    }

    async fn assignment(&self, id: AssignmentId) -> Result<TaskAssignment, StoreError> {
        let inner = self.inner.read().await;
        inner
            .assignments
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "assignment",
                id: id.to_string(),
            })
    }

    async fn assignments_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<TaskAssignment>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .assignments
            .values()
            .filter(|a| a.active && a.includes_user(user_id))
            .cloned()
            .collect())
    }

    async fn next_id(&self) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;
        Ok(id)
    }

    async fn ensure_partition(&self, year: i32, month: u8) -> Result<(), StoreError> {
        if !(1..=12).contains(&month) {
            return Err(StoreError::Backend(format!("invalid month: {month}")));
        }
        let mut inner = self.inner.write().await;
        inner
            .records
            .entry(partition_key_for(year, month))
            .or_default();
        Ok(())
    }

    async fn partitions(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.records.keys().cloned().collect())
    }
}
