//! Filled-out checksheet records and their submitted values.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::enums::{OverallResult, RecordStatus, ValueResult};
use crate::ids::{
    FieldId, MachineId, ProductInstanceId, ProductionStepId, RecordId, TemplateId, UserId,
};

/// The one populated payload slot of a submitted value.
///
/// Externally tagged on the wire (`{"number": "56.5"}`), which makes
/// "exactly one slot" a parse-time guarantee rather than a runtime check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    Text(String),
    Number(Decimal),
    Flag(bool),
    Structured(serde_json::Value),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Text(_) => PayloadKind::Text,
            Payload::Number(_) => PayloadKind::Number,
            Payload::Flag(_) => PayloadKind::Flag,
            Payload::Structured(_) => PayloadKind::Structured,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Payload::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Payload::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

/// Payload slot discriminant, used by strict grading and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Text,
    Number,
    Flag,
    Structured,
}

impl PayloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKind::Text => "text",
            PayloadKind::Number => "number",
            PayloadKind::Flag => "flag",
            PayloadKind::Structured => "structured",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submitted answer to one field within one record.
///
/// The tuple (`field_id`, `repeat_index`, `group_key`) is unique within
/// a record; record creation enforces it. `result` is computed by the
/// evaluator; `auto_evaluated` flips to false only when an approver
/// overrides the result by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordValue {
    pub field_id: FieldId,
    /// 0 for values in non-repeating sections, `0..repeat_count` otherwise.
    #[serde(default)]
    pub repeat_index: u32,
    /// Column key for matrix-style grouped sections.
    #[serde(default)]
    pub group_key: Option<String>,
    pub payload: Payload,
    pub result: ValueResult,
    pub auto_evaluated: bool,
}

/// One filled-out instance of a template.
///
/// A record pins the template version in force at creation; later
/// template edits never retroactively alter it. After creation the
/// values are immutable except for the `result`/`auto_evaluated` pair
/// on approver override; everything else that changes is status,
/// overall result, notes, and the lifecycle timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub template_id: TemplateId,
    pub template_version: u32,
    #[serde(default)]
    pub machine_id: Option<MachineId>,
    #[serde(default)]
    pub product_instance_id: Option<ProductInstanceId>,
    #[serde(default)]
    pub production_step_id: Option<ProductionStepId>,
    /// Header-field key -> submitted value. Open map: keys unknown to
    /// the current template version are tolerated (header capture may
    /// predate a template edit).
    #[serde(default)]
    pub header_data: BTreeMap<String, serde_json::Value>,
    pub status: RecordStatus,
    pub overall_result: OverallResult,
    pub filled_by: UserId,
    #[serde(default)]
    pub values: Vec<RecordValue>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: PrimitiveDateTime,
    #[serde(default)]
    pub submitted_at: Option<PrimitiveDateTime>,
    #[serde(default)]
    pub approved_at: Option<PrimitiveDateTime>,
    #[serde(default)]
    pub approved_by: Option<UserId>,
    #[serde(default)]
    pub rejected_at: Option<PrimitiveDateTime>,
    #[serde(default)]
    pub rejected_by: Option<UserId>,
    #[serde(default)]
    pub reject_reason: Option<String>,
}

impl Record {
    /// Find a value by its uniqueness tuple.
    pub fn value(
        &self,
        field_id: FieldId,
        repeat_index: u32,
        group_key: Option<&str>,
    ) -> Option<&RecordValue> {
        self.values.iter().find(|v| {
            v.field_id == field_id
                && v.repeat_index == repeat_index
                && v.group_key.as_deref() == group_key
        })
    }
}
