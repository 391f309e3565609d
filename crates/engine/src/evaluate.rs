//! Field grading: one field definition, one submitted payload, one
//! result. Pure and total; all numeric comparisons in `Decimal`, so the
//! tolerance edge never suffers binary floating-point drift.

use caliper_model::{Field, InputType, Payload, ValueResult};

use crate::error::EngineError;

/// How record creation treats payloads the grading ladder has no rule
/// for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Historical behavior: no rule means PASS.
    #[default]
    Lenient,
    /// Payload/input-type disagreement is a `TypeMismatch` error before
    /// grading, so authoring mistakes surface at entry time.
    Strict,
}

/// Grade one submitted payload against one field definition.
///
/// First matching rule wins:
/// 1. numeric payload, field carries min and/or max: outside the hard
///    bounds is FAIL;
/// 2. numeric payload inside the bounds, field carries both target and
///    tolerance: deviation beyond the tolerance is WARNING (the
///    boundary itself passes);
/// 3. boolean payload on a PASS_FAIL field: `false` is FAIL;
/// 4. otherwise PASS. Absence of a rule is not a failure.
pub fn evaluate_value(field: &Field, payload: &Payload) -> ValueResult {
    if let Payload::Number(value) = payload {
        if field.min_value.is_some() || field.max_value.is_some() {
            if field.min_value.is_some_and(|min| *value < min)
                || field.max_value.is_some_and(|max| *value > max)
            {
                return ValueResult::Fail;
            }
        }
        if let (Some(target), Some(tolerance)) = (field.target_value, field.tolerance) {
            if (*value - target).abs() > tolerance {
                return ValueResult::Warning;
            }
        }
        return ValueResult::Pass;
    }

    if let Payload::Flag(flag) = payload {
        if field.input_type == InputType::PassFail {
            return if *flag {
                ValueResult::Pass
            } else {
                ValueResult::Fail
            };
        }
    }

    ValueResult::Pass
}

/// Strict companion to [`evaluate_value`]: refuse payloads whose slot
/// does not fit the field's input type instead of defaulting to PASS.
pub fn evaluate_value_strict(field: &Field, payload: &Payload) -> Result<ValueResult, EngineError> {
    let expected = field.input_type.expected_payload();
    let got = payload.kind();
    if got != expected {
        return Err(EngineError::TypeMismatch {
            field_key: field.key.clone(),
            expected: expected.as_str(),
            got: got.as_str(),
        });
    }
    Ok(evaluate_value(field, payload))
}
