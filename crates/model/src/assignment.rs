//! Recurring and one-off task assignments with their due windows.

use serde::{Deserialize, Serialize};
use time::{Date, Time};

use crate::enums::AssignmentKind;
use crate::ids::{AssignmentId, MachineId, ProductId, ScheduleId, TemplateId, UserId};

fn default_true() -> bool {
    true
}

/// One due window on one day.
///
/// For RECURRING assignments `day_of_week` (1=Monday..7=Sunday, ISO) is
/// the meaningful side; for ONCE assignments it is `specific_date`. A
/// schedule missing the side its assignment kind needs is skipped by
/// the matcher, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    #[serde(default)]
    pub day_of_week: Option<u8>,
    #[serde(default)]
    pub specific_date: Option<Date>,
    pub start_time: Time,
    pub end_time: Time,
}

/// Binding of a template to the users who must fill it and the
/// schedules saying when. Administrator-owned; soft-deactivated, never
/// hard-deleted while records may reference the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub id: AssignmentId,
    pub template_id: TemplateId,
    pub kind: AssignmentKind,
    pub name: String,
    /// Advisory scope; machine and product may both be present.
    #[serde(default)]
    pub machine_id: Option<MachineId>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub user_ids: Vec<UserId>,
    pub schedules: Vec<Schedule>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl TaskAssignment {
    pub fn includes_user(&self, user_id: UserId) -> bool {
        self.user_ids.contains(&user_id)
    }
}
