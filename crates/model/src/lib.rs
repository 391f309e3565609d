//! Typed domain model for Caliper checksheets.
//!
//! These types are the shared vocabulary of the workspace: the engine
//! grades and syncs them, the store persists them, the CLI reads and
//! prints them. Everything here is plain data plus structural
//! validation -- no grading logic and no I/O.

pub mod assignment;
pub mod definition;
pub mod enums;
pub mod ids;
pub mod record;
pub mod template;

mod error;

pub use assignment::{Schedule, TaskAssignment};
pub use definition::{
    FieldDefinition, HeaderFieldDefinition, SectionDefinition, TemplateDefinition,
};
pub use enums::{
    AssignmentKind, FormContext, HeaderFieldType, InputType, OverallResult, RecordStatus,
    ValueResult,
};
pub use error::ModelError;
pub use ids::{
    AssignmentId, FieldId, HeaderFieldId, IdSequence, MachineId, ProductId, ProductInstanceId,
    ProductionStepId, RecordId, ScheduleId, SectionId, TemplateId, UserId,
};
pub use record::{Payload, PayloadKind, Record, RecordValue};
pub use template::{Field, HeaderField, Section, Template, TemplateScope};
