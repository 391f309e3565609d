use std::fmt;

use caliper_model::{FieldId, ModelError, RecordStatus, TemplateId};

/// Errors raised at the engine boundary.
///
/// The grading and matching paths never produce these in lenient mode;
/// they come from record construction, lifecycle transitions, sync, and
/// strict-mode type checking. Variants carry the offending ids and keys
/// so the caller can surface a precise not-found / bad-request
/// condition without re-deriving context.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A request names an entity id that does not exist.
    ReferenceNotFound { entity: &'static str, id: u64 },
    /// A submitted value names a field outside the record's bound
    /// template. Caller bug; rejected outright.
    SchemaMismatch {
        template: TemplateId,
        field_id: FieldId,
    },
    /// Two submissions share a (field, repeat_index, group_key) tuple.
    DuplicateValue {
        field_id: FieldId,
        repeat_index: u32,
        group_key: Option<String>,
    },
    /// A value's repeat index is outside its section's declared range.
    RepeatIndexOutOfRange {
        field_id: FieldId,
        repeat_index: u32,
        max: u32,
    },
    /// A required field has no value at submit time.
    RequiredValueMissing { section: String, field_key: String },
    /// The record is not in a state admitting the requested action.
    InvalidTransition {
        from: RecordStatus,
        action: &'static str,
    },
    /// DRAFT creation requested against a template that forbids it.
    PartialSaveDisabled { template: TemplateId },
    /// Rejection requires a non-empty reason.
    RejectReasonMissing,
    /// Strict mode only: the payload slot does not fit the field's
    /// input type.
    TypeMismatch {
        field_key: String,
        expected: &'static str,
        got: &'static str,
    },
    /// A model-level error (enum parsing, definition validation).
    Model(ModelError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::ReferenceNotFound { entity, id } => {
                write!(f, "{} not found: {}", entity, id)
            }
            EngineError::SchemaMismatch { template, field_id } => {
                write!(
                    f,
                    "field {} is not part of template {}",
                    field_id, template
                )
            }
            EngineError::DuplicateValue {
                field_id,
                repeat_index,
                group_key,
            } => {
                write!(
                    f,
                    "duplicate value for field {} at repeat {} (group {})",
                    field_id,
                    repeat_index,
                    group_key.as_deref().unwrap_or("-")
                )
            }
            EngineError::RepeatIndexOutOfRange {
                field_id,
                repeat_index,
                max,
            } => {
                write!(
                    f,
                    "repeat index {} for field {} outside range 0..{}",
                    repeat_index, field_id, max
                )
            }
            EngineError::RequiredValueMissing { section, field_key } => {
                write!(
                    f,
                    "required field '{}' in '{}' has no value",
                    field_key, section
                )
            }
            EngineError::InvalidTransition { from, action } => {
                write!(f, "cannot {} a record in status {}", action, from)
            }
            EngineError::PartialSaveDisabled { template } => {
                write!(f, "template {} does not allow partial save", template)
            }
            EngineError::RejectReasonMissing => {
                write!(f, "rejection requires a non-empty reason")
            }
            EngineError::TypeMismatch {
                field_key,
                expected,
                got,
            } => {
                write!(
                    f,
                    "field '{}' expects a {} payload, got {}",
                    field_key, expected, got
                )
            }
            EngineError::Model(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<ModelError> for EngineError {
    fn from(e: ModelError) -> Self {
        EngineError::Model(e)
    }
}
