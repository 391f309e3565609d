//! Schedule matching: which assignments are due for a user right now.
//!
//! A pure query over in-memory data. It decides due-ness for the day --
//! time-of-day containment within the window is the caller's concern,
//! since a worker may check in at any point in the shift. It never
//! errors: an assignment or schedule that cannot be matched is simply
//! excluded.

use caliper_model::{AssignmentKind, Record, Schedule, TaskAssignment, UserId};
use time::PrimitiveDateTime;

/// The assignments currently due for `user_id` at `now`.
///
/// Per active assignment the user is a member of: the first schedule
/// whose day matches `now` AND whose window today is not already
/// covered by one of the user's records for the template makes the
/// assignment due. A window counts as covered when a record's
/// `created_at` falls strictly inside it; a covered window does not
/// veto later schedules on the same day. Output order follows input
/// order; membership is exact given identical inputs.
pub fn due_assignments<'a>(
    user_id: UserId,
    now: PrimitiveDateTime,
    assignments: &'a [TaskAssignment],
    recent_records: &[Record],
) -> Vec<&'a TaskAssignment> {
    assignments
        .iter()
        .filter(|a| a.active && a.includes_user(user_id))
        .filter(|a| is_due(a, user_id, now, recent_records))
        .collect()
}

fn is_due(
    assignment: &TaskAssignment,
    user_id: UserId,
    now: PrimitiveDateTime,
    recent_records: &[Record],
) -> bool {
    for schedule in &assignment.schedules {
        if !date_matches(assignment.kind, schedule, now) {
            continue;
        }
        let window_start = now.date().with_time(schedule.start_time);
        let window_end = now.date().with_time(schedule.end_time);
        let already_filled = recent_records.iter().any(|r| {
            r.filled_by == user_id
                && r.template_id == assignment.template_id
                && r.created_at > window_start
                && r.created_at < window_end
        });
        // A filled window only settles itself; a later schedule with an
        // unfilled window today still makes the assignment due.
        if !already_filled {
            return true;
        }
    }
    false
}

fn date_matches(kind: AssignmentKind, schedule: &Schedule, now: PrimitiveDateTime) -> bool {
    match kind {
        AssignmentKind::Recurring => {
            // ISO numbering, 1=Monday..7=Sunday.
            schedule.day_of_week == Some(now.weekday().number_from_monday())
        }
        AssignmentKind::Once => schedule.specific_date == Some(now.date()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caliper_model::{OverallResult, RecordStatus};
    use std::collections::BTreeMap;
    use time::macros::{date, datetime, time};

    fn schedule(id: u64, day_of_week: Option<u8>, specific_date: Option<time::Date>) -> Schedule {
        Schedule {
            id,
            day_of_week,
            specific_date,
            start_time: time!(08:00),
            end_time: time!(16:00),
        }
    }

    fn assignment(id: u64, kind: AssignmentKind, schedules: Vec<Schedule>) -> TaskAssignment {
        TaskAssignment {
            id,
            template_id: 7,
            kind,
            name: format!("assignment {}", id),
            machine_id: None,
            product_id: None,
            user_ids: vec![42],
            schedules,
            active: true,
        }
    }

    fn record_created_at(created_at: PrimitiveDateTime) -> Record {
        Record {
            id: 1,
            template_id: 7,
            template_version: 1,
            machine_id: None,
            product_instance_id: None,
            production_step_id: None,
            header_data: BTreeMap::new(),
            status: RecordStatus::Submitted,
            overall_result: OverallResult::Pass,
            filled_by: 42,
            values: Vec::new(),
            notes: None,
            created_at,
            submitted_at: Some(created_at),
            approved_at: None,
            approved_by: None,
            rejected_at: None,
            rejected_by: None,
            reject_reason: None,
        }
    }

    // 2026-03-02 is a Monday.
    const MONDAY_NOON: PrimitiveDateTime = datetime!(2026-03-02 12:00:00);

    #[test]
    fn recurring_matches_on_its_weekday() {
        let a = assignment(
            1,
            AssignmentKind::Recurring,
            vec![schedule(10, Some(1), None)],
        );
        let due = due_assignments(42, MONDAY_NOON, std::slice::from_ref(&a), &[]);
        assert_eq!(due.len(), 1);

        let tuesday = datetime!(2026-03-03 12:00:00);
        assert!(due_assignments(42, tuesday, std::slice::from_ref(&a), &[]).is_empty());
    }

    #[test]
    fn once_matches_on_its_date_only() {
        let a = assignment(
            1,
            AssignmentKind::Once,
            vec![schedule(10, None, Some(date!(2026-03-02)))],
        );
        assert_eq!(
            due_assignments(42, MONDAY_NOON, std::slice::from_ref(&a), &[]).len(),
            1
        );
        let next_day = datetime!(2026-03-03 12:00:00);
        assert!(due_assignments(42, next_day, std::slice::from_ref(&a), &[]).is_empty());
    }

    #[test]
    fn record_inside_window_dedups_the_assignment() {
        let a = assignment(
            1,
            AssignmentKind::Recurring,
            vec![schedule(10, Some(1), None)],
        );
        // Filled at 09:00 inside today's 08:00-16:00 window.
        let filled = record_created_at(datetime!(2026-03-02 09:00:00));
        assert!(due_assignments(42, MONDAY_NOON, std::slice::from_ref(&a), &[filled]).is_empty());
    }

    #[test]
    fn yesterdays_record_does_not_dedup() {
        let a = assignment(
            1,
            AssignmentKind::Recurring,
            vec![schedule(10, Some(1), None)],
        );
        let yesterday = record_created_at(datetime!(2026-03-01 09:00:00));
        assert_eq!(
            due_assignments(42, MONDAY_NOON, std::slice::from_ref(&a), &[yesterday]).len(),
            1
        );
    }

    #[test]
    fn window_boundaries_are_exclusive_for_dedup() {
        let a = assignment(
            1,
            AssignmentKind::Recurring,
            vec![schedule(10, Some(1), None)],
        );
        // Exactly at window start: not strictly inside, does not dedup.
        let at_start = record_created_at(datetime!(2026-03-02 08:00:00));
        assert_eq!(
            due_assignments(42, MONDAY_NOON, std::slice::from_ref(&a), &[at_start]).len(),
            1
        );
    }

    #[test]
    fn other_users_records_do_not_dedup() {
        let a = assignment(
            1,
            AssignmentKind::Recurring,
            vec![schedule(10, Some(1), None)],
        );
        let mut other = record_created_at(datetime!(2026-03-02 09:00:00));
        other.filled_by = 99;
        assert_eq!(
            due_assignments(42, MONDAY_NOON, std::slice::from_ref(&a), &[other]).len(),
            1
        );
    }

    #[test]
    fn other_templates_records_do_not_dedup() {
        let a = assignment(
            1,
            AssignmentKind::Recurring,
            vec![schedule(10, Some(1), None)],
        );
        let mut other = record_created_at(datetime!(2026-03-02 09:00:00));
        other.template_id = 8;
        assert_eq!(
            due_assignments(42, MONDAY_NOON, std::slice::from_ref(&a), &[other]).len(),
            1
        );
    }

    #[test]
    fn assignment_included_once_despite_multiple_matching_schedules() {
        let a = assignment(
            1,
            AssignmentKind::Recurring,
            vec![schedule(10, Some(1), None), schedule(11, Some(1), None)],
        );
        assert_eq!(
            due_assignments(42, MONDAY_NOON, std::slice::from_ref(&a), &[]).len(),
            1
        );
    }

    #[test]
    fn filled_window_does_not_veto_later_schedule_same_day() {
        // Morning round filled at 09:00; the evening window is still
        // open, so the assignment stays due for the evening round.
        let mut evening = schedule(11, Some(1), None);
        evening.start_time = time!(16:00);
        evening.end_time = time!(22:00);
        let a = assignment(
            1,
            AssignmentKind::Recurring,
            vec![schedule(10, Some(1), None), evening],
        );
        let filled = record_created_at(datetime!(2026-03-02 09:00:00));
        let evening_check = datetime!(2026-03-02 17:00:00);
        assert_eq!(
            due_assignments(42, evening_check, std::slice::from_ref(&a), &[filled]).len(),
            1
        );
    }

    #[test]
    fn all_windows_filled_excludes_assignment() {
        let mut evening = schedule(11, Some(1), None);
        evening.start_time = time!(16:00);
        evening.end_time = time!(22:00);
        let a = assignment(
            1,
            AssignmentKind::Recurring,
            vec![schedule(10, Some(1), None), evening],
        );
        let records = [
            record_created_at(datetime!(2026-03-02 09:00:00)),
            record_created_at(datetime!(2026-03-02 17:30:00)),
        ];
        let late_check = datetime!(2026-03-02 18:00:00);
        assert!(due_assignments(42, late_check, std::slice::from_ref(&a), &records).is_empty());
    }

    #[test]
    fn inactive_and_foreign_assignments_are_excluded() {
        let mut inactive = assignment(
            1,
            AssignmentKind::Recurring,
            vec![schedule(10, Some(1), None)],
        );
        inactive.active = false;
        let mut foreign = assignment(
            2,
            AssignmentKind::Recurring,
            vec![schedule(11, Some(1), None)],
        );
        foreign.user_ids = vec![99];
        let assignments = [inactive, foreign];
        assert!(due_assignments(42, MONDAY_NOON, &assignments, &[]).is_empty());
    }

    #[test]
    fn malformed_schedule_is_skipped_not_an_error() {
        // RECURRING schedule without a weekday never matches.
        let a = assignment(1, AssignmentKind::Recurring, vec![schedule(10, None, None)]);
        assert!(due_assignments(42, MONDAY_NOON, std::slice::from_ref(&a), &[]).is_empty());
    }

    #[test]
    fn output_follows_input_order() {
        let a1 = assignment(
            1,
            AssignmentKind::Recurring,
            vec![schedule(10, Some(1), None)],
        );
        let a2 = assignment(
            2,
            AssignmentKind::Recurring,
            vec![schedule(11, Some(1), None)],
        );
        let assignments = [a2, a1];
        let due = due_assignments(42, MONDAY_NOON, &assignments, &[]);
        let ids: Vec<u64> = due.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
