//! Record lifecycle: build, submit, approve, reject, override.
//!
//! `DRAFT -> SUBMITTED -> {APPROVED | REJECTED}`, with direct creation
//! at SUBMITTED as the common machine-floor path. Every function checks
//! admissibility before touching the record, so a failed call leaves it
//! unchanged (all-or-nothing). APPROVED and REJECTED are terminal;
//! re-submission means a new record.

use std::collections::{BTreeMap, BTreeSet};

use caliper_model::{
    FieldId, MachineId, OverallResult, Payload, ProductInstanceId, ProductionStepId, Record,
    RecordId, RecordStatus, RecordValue, Template, UserId, ValueResult,
};
use time::PrimitiveDateTime;

use crate::aggregate::overall_result;
use crate::error::EngineError;
use crate::evaluate::{evaluate_value, evaluate_value_strict, Strictness};

/// One submitted answer, before grading.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSubmission {
    pub field_id: FieldId,
    pub repeat_index: u32,
    pub group_key: Option<String>,
    pub payload: Payload,
}

/// Everything an operator hands in when filling out a checksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub filled_by: UserId,
    pub machine_id: Option<MachineId>,
    pub product_instance_id: Option<ProductInstanceId>,
    pub production_step_id: Option<ProductionStepId>,
    pub header_data: BTreeMap<String, serde_json::Value>,
    pub values: Vec<ValueSubmission>,
}

/// Creation options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordOptions {
    pub strictness: Strictness,
    /// Create at DRAFT instead of SUBMITTED; requires the template's
    /// `allow_partial_save`.
    pub save_as_draft: bool,
}

/// The context references the caller vouches for.
///
/// Each set is optional: `None` means the caller performs its own
/// existence checks (or none -- a file-driven CLI run has no catalog),
/// `Some` means the draft's references must be members.
#[derive(Debug, Clone, Default)]
pub struct RefCatalog {
    pub machines: Option<BTreeSet<MachineId>>,
    pub product_instances: Option<BTreeSet<ProductInstanceId>>,
    pub production_steps: Option<BTreeSet<ProductionStepId>>,
    pub users: Option<BTreeSet<UserId>>,
}

impl RefCatalog {
    /// A catalog that checks nothing.
    pub fn permissive() -> Self {
        RefCatalog::default()
    }
}

/// Build and grade a new record against a template.
///
/// Validates context references, maps every submission to a template
/// field, enforces the (field, repeat, group) uniqueness tuple and the
/// repeat range, grades each value, and rolls the results up. Any error
/// yields no record.
pub fn build_record(
    template: &Template,
    draft: &RecordDraft,
    refs: &RefCatalog,
    opts: RecordOptions,
    id: RecordId,
    now: PrimitiveDateTime,
) -> Result<Record, EngineError> {
    check_refs(draft, refs)?;

    if opts.save_as_draft && !template.allow_partial_save {
        return Err(EngineError::PartialSaveDisabled {
            template: template.id,
        });
    }

    let index = template.index();
    let mut seen: BTreeSet<(FieldId, u32, Option<&str>)> = BTreeSet::new();
    let mut values = Vec::with_capacity(draft.values.len());

    for submission in &draft.values {
        let (section, field) =
            index
                .field(submission.field_id)
                .ok_or(EngineError::SchemaMismatch {
                    template: template.id,
                    field_id: submission.field_id,
                })?;

        let max = section.repeat_limit();
        if submission.repeat_index >= max {
            return Err(EngineError::RepeatIndexOutOfRange {
                field_id: submission.field_id,
                repeat_index: submission.repeat_index,
                max,
            });
        }

        let tuple = (
            submission.field_id,
            submission.repeat_index,
            submission.group_key.as_deref(),
        );
        if !seen.insert(tuple) {
            return Err(EngineError::DuplicateValue {
                field_id: submission.field_id,
                repeat_index: submission.repeat_index,
                group_key: submission.group_key.clone(),
            });
        }

        let result = match opts.strictness {
            Strictness::Lenient => evaluate_value(field, &submission.payload),
            Strictness::Strict => evaluate_value_strict(field, &submission.payload)?,
        };

        values.push(RecordValue {
            field_id: submission.field_id,
            repeat_index: submission.repeat_index,
            group_key: submission.group_key.clone(),
            payload: submission.payload.clone(),
            result,
            auto_evaluated: true,
        });
    }

    // Drafts may be partial; required fields are enforced at submit.
    if !opts.save_as_draft {
        check_required(template, &draft.header_data, &values)?;
    }

    let status = if opts.save_as_draft {
        RecordStatus::Draft
    } else {
        RecordStatus::Submitted
    };
    let overall = overall_result(values.iter().map(|v| v.result));

    Ok(Record {
        id,
        template_id: template.id,
        template_version: template.version,
        machine_id: draft.machine_id,
        product_instance_id: draft.product_instance_id,
        production_step_id: draft.production_step_id,
        header_data: draft.header_data.clone(),
        status,
        overall_result: overall,
        filled_by: draft.filled_by,
        values,
        notes: None,
        created_at: now,
        submitted_at: (status == RecordStatus::Submitted).then_some(now),
        approved_at: None,
        approved_by: None,
        rejected_at: None,
        rejected_by: None,
        reject_reason: None,
    })
}

/// DRAFT -> SUBMITTED.
///
/// Re-validates required fields, re-grades every value still under
/// auto-evaluation, recomputes the overall result, and stamps
/// `submitted_at`.
pub fn submit(
    record: &mut Record,
    template: &Template,
    now: PrimitiveDateTime,
) -> Result<(), EngineError> {
    if record.status != RecordStatus::Draft {
        return Err(EngineError::InvalidTransition {
            from: record.status,
            action: "submit",
        });
    }
    check_required(template, &record.header_data, &record.values)?;

    let index = template.index();
    for value in &mut record.values {
        if value.auto_evaluated {
            if let Some((_, field)) = index.field(value.field_id) {
                value.result = evaluate_value(field, &value.payload);
            }
        }
    }
    record.overall_result = overall_result(record.values.iter().map(|v| v.result));
    record.status = RecordStatus::Submitted;
    record.submitted_at = Some(now);
    Ok(())
}

/// SUBMITTED -> APPROVED (terminal).
///
/// The overall result becomes the explicit override if given, else
/// PASS. The override is record-level only; individual value results
/// are untouched.
pub fn approve(
    record: &mut Record,
    approver: UserId,
    override_result: Option<OverallResult>,
    now: PrimitiveDateTime,
) -> Result<(), EngineError> {
    if record.status != RecordStatus::Submitted {
        return Err(EngineError::InvalidTransition {
            from: record.status,
            action: "approve",
        });
    }
    record.status = RecordStatus::Approved;
    record.overall_result = override_result.unwrap_or(OverallResult::Pass);
    record.approved_by = Some(approver);
    record.approved_at = Some(now);
    Ok(())
}

/// SUBMITTED -> REJECTED (terminal). Requires a non-empty reason; the
/// overall result becomes the override if given, else FAIL.
pub fn reject(
    record: &mut Record,
    rejecter: UserId,
    reason: &str,
    override_result: Option<OverallResult>,
    now: PrimitiveDateTime,
) -> Result<(), EngineError> {
    if record.status != RecordStatus::Submitted {
        return Err(EngineError::InvalidTransition {
            from: record.status,
            action: "reject",
        });
    }
    if reason.trim().is_empty() {
        return Err(EngineError::RejectReasonMissing);
    }
    record.status = RecordStatus::Rejected;
    record.overall_result = override_result.unwrap_or(OverallResult::Fail);
    record.rejected_by = Some(rejecter);
    record.rejected_at = Some(now);
    record.reject_reason = Some(reason.to_string());
    Ok(())
}

/// Replace the record's notes. Notes are annotation, not result data:
/// allowed in every status, terminal ones included.
pub fn update_notes(record: &mut Record, notes: Option<String>) {
    record.notes = notes;
}

/// Approver override of one value's grading result.
///
/// Marks the value as no longer auto-evaluated and recomputes the
/// record's overall result from the value results now in force. Only
/// admissible while the record is SUBMITTED.
pub fn override_value_result(
    record: &mut Record,
    field_id: FieldId,
    repeat_index: u32,
    group_key: Option<&str>,
    result: ValueResult,
) -> Result<(), EngineError> {
    if record.status != RecordStatus::Submitted {
        return Err(EngineError::InvalidTransition {
            from: record.status,
            action: "override value",
        });
    }
    let value = record
        .values
        .iter_mut()
        .find(|v| {
            v.field_id == field_id
                && v.repeat_index == repeat_index
                && v.group_key.as_deref() == group_key
        })
        .ok_or(EngineError::ReferenceNotFound {
            entity: "value",
            id: field_id,
        })?;
    value.result = result;
    value.auto_evaluated = false;
    record.overall_result = overall_result(record.values.iter().map(|v| v.result));
    Ok(())
}

fn check_refs(draft: &RecordDraft, refs: &RefCatalog) -> Result<(), EngineError> {
    if let Some(users) = &refs.users {
        if !users.contains(&draft.filled_by) {
            return Err(EngineError::ReferenceNotFound {
                entity: "user",
                id: draft.filled_by,
            });
        }
    }
    if let (Some(machines), Some(id)) = (&refs.machines, draft.machine_id) {
        if !machines.contains(&id) {
            return Err(EngineError::ReferenceNotFound {
                entity: "machine",
                id,
            });
        }
    }
    if let (Some(instances), Some(id)) = (&refs.product_instances, draft.product_instance_id) {
        if !instances.contains(&id) {
            return Err(EngineError::ReferenceNotFound {
                entity: "product instance",
                id,
            });
        }
    }
    if let (Some(steps), Some(id)) = (&refs.production_steps, draft.production_step_id) {
        if !steps.contains(&id) {
            return Err(EngineError::ReferenceNotFound {
                entity: "production step",
                id,
            });
        }
    }
    Ok(())
}

/// Required-field validation for submitted records: every active
/// required section field needs at least one value, every active
/// required header field needs a header entry.
fn check_required(
    template: &Template,
    header_data: &BTreeMap<String, serde_json::Value>,
    values: &[RecordValue],
) -> Result<(), EngineError> {
    for hf in &template.header_fields {
        if hf.active && hf.required && !header_data.contains_key(&hf.key) {
            return Err(EngineError::RequiredValueMissing {
                section: "header".to_string(),
                field_key: hf.key.clone(),
            });
        }
    }
    for section in template.sections.iter().filter(|s| s.active) {
        for field in section.fields.iter().filter(|f| f.active && f.required) {
            if !values.iter().any(|v| v.field_id == field.id) {
                return Err(EngineError::RequiredValueMissing {
                    section: section.name.clone(),
                    field_key: field.key.clone(),
                });
            }
        }
    }
    Ok(())
}
