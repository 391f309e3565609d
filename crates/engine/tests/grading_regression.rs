//! Grading regression suite.
//!
//! Exercises the field grading ladder and the aggregation lattice as a
//! grid of small cases, organized by category:
//!   A. Hard bounds
//!   B. Target/tolerance
//!   C. Rule priority (bounds over tolerance)
//!   D. Boolean and untyped payloads
//!   E. Aggregation lattice
//!
//! Each case builds a field inline and asserts the single result; the
//! lattice cases assert over whole result multisets.

use caliper_engine::{evaluate_value, overall_result};
use caliper_model::{Field, InputType, OverallResult, Payload, ValueResult};
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn field(input_type: InputType) -> Field {
    Field {
        id: 1,
        position: 0,
        key: "measurement".to_string(),
        label: "Measurement".to_string(),
        input_type,
        min_value: None,
        max_value: None,
        target_value: None,
        tolerance: None,
        decimal_places: None,
        required: false,
        fail_condition: None,
        unit: None,
        placeholder: None,
        width: None,
        options: Vec::new(),
        active: true,
    }
}

fn bounded(min: &str, max: &str) -> Field {
    let mut f = field(InputType::Number);
    f.min_value = Some(dec(min));
    f.max_value = Some(dec(max));
    f
}

fn toleranced(target: &str, tolerance: &str) -> Field {
    let mut f = field(InputType::Number);
    f.target_value = Some(dec(target));
    f.tolerance = Some(dec(tolerance));
    f
}

fn grade(f: &Field, value: &str) -> ValueResult {
    evaluate_value(f, &Payload::Number(dec(value)))
}

// ──────────────────────────────────────────────
// A. Hard bounds
// ──────────────────────────────────────────────

#[test]
fn a_bounds_inside_passes() {
    assert_eq!(grade(&bounded("10", "90"), "50"), ValueResult::Pass);
}

#[test]
fn a_bounds_are_inclusive() {
    assert_eq!(grade(&bounded("10", "90"), "10"), ValueResult::Pass);
    assert_eq!(grade(&bounded("10", "90"), "90"), ValueResult::Pass);
}

#[test]
fn a_bounds_below_min_fails() {
    assert_eq!(grade(&bounded("10", "90"), "9.999"), ValueResult::Fail);
}

#[test]
fn a_bounds_above_max_fails() {
    assert_eq!(grade(&bounded("10", "90"), "90.001"), ValueResult::Fail);
}

#[test]
fn a_negative_bounds() {
    assert_eq!(grade(&bounded("-5", "-1"), "-3"), ValueResult::Pass);
    assert_eq!(grade(&bounded("-5", "-1"), "0"), ValueResult::Fail);
}

#[test]
fn a_min_only() {
    let mut f = field(InputType::Number);
    f.min_value = Some(dec("0"));
    assert_eq!(evaluate_value(&f, &Payload::Number(dec("-0.01"))), ValueResult::Fail);
    assert_eq!(evaluate_value(&f, &Payload::Number(dec("1000000"))), ValueResult::Pass);
}

#[test]
fn a_max_only() {
    let mut f = field(InputType::Number);
    f.max_value = Some(dec("100"));
    assert_eq!(evaluate_value(&f, &Payload::Number(dec("100.5"))), ValueResult::Fail);
    assert_eq!(evaluate_value(&f, &Payload::Number(dec("-40"))), ValueResult::Pass);
}

// ──────────────────────────────────────────────
// B. Target/tolerance
// ──────────────────────────────────────────────

#[test]
fn b_within_tolerance_passes() {
    assert_eq!(grade(&toleranced("50", "5"), "52"), ValueResult::Pass);
    assert_eq!(grade(&toleranced("50", "5"), "47"), ValueResult::Pass);
}

#[test]
fn b_tolerance_edge_inclusive_both_sides() {
    assert_eq!(grade(&toleranced("50", "5"), "55"), ValueResult::Pass);
    assert_eq!(grade(&toleranced("50", "5"), "45"), ValueResult::Pass);
}

#[test]
fn b_one_unit_beyond_warns() {
    assert_eq!(grade(&toleranced("50", "5"), "56"), ValueResult::Warning);
    assert_eq!(grade(&toleranced("50", "5"), "44"), ValueResult::Warning);
}

#[test]
fn b_fractional_tolerance_exact_decimal() {
    // 2.5 +/- 0.1: 2.6 is the boundary, 2.61 is beyond it. Binary
    // floating point would blur the edge.
    assert_eq!(grade(&toleranced("2.5", "0.1"), "2.6"), ValueResult::Pass);
    assert_eq!(grade(&toleranced("2.5", "0.1"), "2.61"), ValueResult::Warning);
}

#[test]
fn b_zero_tolerance_requires_exact_target() {
    assert_eq!(grade(&toleranced("50", "0"), "50"), ValueResult::Pass);
    assert_eq!(grade(&toleranced("50", "0"), "50.000001"), ValueResult::Warning);
}

#[test]
fn b_target_without_tolerance_not_graded() {
    let mut f = field(InputType::Number);
    f.target_value = Some(dec("50"));
    assert_eq!(evaluate_value(&f, &Payload::Number(dec("9999"))), ValueResult::Pass);
}

#[test]
fn b_tolerance_without_target_not_graded() {
    let mut f = field(InputType::Number);
    f.tolerance = Some(dec("5"));
    assert_eq!(evaluate_value(&f, &Payload::Number(dec("9999"))), ValueResult::Pass);
}

// ──────────────────────────────────────────────
// C. Rule priority
// ──────────────────────────────────────────────

#[test]
fn c_out_of_bounds_fails_regardless_of_tolerance() {
    // min=0, max=10, target=5, tolerance=1: 11 is FAIL, never WARNING.
    let mut f = bounded("0", "10");
    f.target_value = Some(dec("5"));
    f.tolerance = Some(dec("1"));
    assert_eq!(grade(&f, "11"), ValueResult::Fail);
}

#[test]
fn c_inside_bounds_falls_through_to_tolerance() {
    let mut f = bounded("0", "10");
    f.target_value = Some(dec("5"));
    f.tolerance = Some(dec("1"));
    assert_eq!(grade(&f, "8"), ValueResult::Warning);
    assert_eq!(grade(&f, "5.5"), ValueResult::Pass);
}

// ──────────────────────────────────────────────
// D. Boolean and untyped payloads
// ──────────────────────────────────────────────

#[test]
fn d_pass_fail_field() {
    let f = field(InputType::PassFail);
    assert_eq!(evaluate_value(&f, &Payload::Flag(true)), ValueResult::Pass);
    assert_eq!(evaluate_value(&f, &Payload::Flag(false)), ValueResult::Fail);
}

#[test]
fn d_boolean_on_non_pass_fail_field_passes() {
    for ty in [InputType::Boolean, InputType::YesNo, InputType::Text] {
        let f = field(ty);
        assert_eq!(evaluate_value(&f, &Payload::Flag(false)), ValueResult::Pass);
    }
}

#[test]
fn d_unruled_payloads_pass() {
    let f = field(InputType::Text);
    assert_eq!(
        evaluate_value(&f, &Payload::Text("anything".to_string())),
        ValueResult::Pass
    );
    assert_eq!(
        evaluate_value(&f, &Payload::Structured(serde_json::json!(["a", "b"]))),
        ValueResult::Pass
    );
}

#[test]
fn d_numeric_payload_on_text_field_with_bounds_is_still_graded() {
    // The ladder keys on the payload being numeric, not the input type.
    let mut f = field(InputType::Text);
    f.min_value = Some(dec("0"));
    f.max_value = Some(dec("10"));
    assert_eq!(evaluate_value(&f, &Payload::Number(dec("11"))), ValueResult::Fail);
}

// ──────────────────────────────────────────────
// E. Aggregation lattice
// ──────────────────────────────────────────────

#[test]
fn e_lattice_over_all_two_element_multisets() {
    use OverallResult as O;
    use ValueResult as V;
    let cases = [
        (vec![V::Pass, V::Pass], O::Pass),
        (vec![V::Pass, V::Warning], O::Partial),
        (vec![V::Pass, V::Fail], O::Fail),
        (vec![V::Warning, V::Warning], O::Partial),
        (vec![V::Warning, V::Fail], O::Fail),
        (vec![V::Fail, V::Fail], O::Fail),
    ];
    for (results, expected) in cases {
        assert_eq!(
            overall_result(results.clone()),
            expected,
            "multiset {:?}",
            results
        );
        let reversed: Vec<_> = results.iter().rev().copied().collect();
        assert_eq!(
            overall_result(reversed),
            expected,
            "reversed multiset {:?}",
            results
        );
    }
}

#[test]
fn e_single_results() {
    assert_eq!(overall_result([ValueResult::Pass]), OverallResult::Pass);
    assert_eq!(overall_result([ValueResult::Warning]), OverallResult::Partial);
    assert_eq!(overall_result([ValueResult::Fail]), OverallResult::Fail);
}

#[test]
fn e_warning_never_escalates_past_partial() {
    let many_warnings = vec![ValueResult::Warning; 100];
    assert_eq!(overall_result(many_warnings), OverallResult::Partial);
}
