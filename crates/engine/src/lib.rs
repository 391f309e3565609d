//! The pure Caliper core: field grading, record aggregation, record
//! lifecycle, natural-key template sync, schedule matching, and
//! authoring lint.
//!
//! Everything here is synchronous, deterministic CPU work over the
//! model types. The surrounding layers (store, CLI, a web surface)
//! supply entities, a clock value, and the acting user id as explicit
//! parameters; nothing in this crate reads ambient state or performs
//! I/O.

pub mod aggregate;
pub mod duty;
pub mod evaluate;
pub mod lifecycle;
pub mod lint;
pub mod sync;

mod error;
mod merge;

pub use aggregate::overall_result;
pub use duty::due_assignments;
pub use error::EngineError;
pub use evaluate::{evaluate_value, evaluate_value_strict, Strictness};
pub use lifecycle::{
    approve, build_record, override_value_result, reject, submit, update_notes, RecordDraft,
    RecordOptions, RefCatalog, ValueSubmission,
};
pub use lint::{check_template, Finding, FindingSeverity};
pub use sync::{create_template, sync_template, ChangeAction, ChildChange, SyncOutcome};
