//! Record rollup: the aggregate is the worst value result present.
//!
//! FAIL > PARTIAL > PASS is a strict three-level lattice: a WARNING
//! never escalates past PARTIAL and is never masked by a later PASS.

use caliper_model::{OverallResult, ValueResult};

/// Roll per-value results up into one overall record result.
///
/// Any FAIL makes the record FAIL; otherwise any WARNING makes it
/// PARTIAL; otherwise PASS. Empty input is PASS. Order-independent and
/// idempotent; call it only after every value has been graded.
pub fn overall_result<I>(results: I) -> OverallResult
where
    I: IntoIterator<Item = ValueResult>,
{
    let mut overall = OverallResult::Pass;
    for result in results {
        match result {
            ValueResult::Fail => return OverallResult::Fail,
            ValueResult::Warning => overall = OverallResult::Partial,
            ValueResult::Pass => {}
        }
    }
    overall
}
