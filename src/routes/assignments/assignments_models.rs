use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::assignment::{Assignment, TaskType};

// Assign a worker to a task on a date
#[derive(Debug, Deserialize)]
pub struct CreateAssignmentRequest {
    pub date: NaiveDate,
    pub task_type: TaskType,
    #[serde(default)]
    pub time_slot: Option<String>,
    pub worker_id: i64,
    #[serde(default)]
    pub is_commander: bool,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct GuardSlot {
    pub time_slot: &'static str,
    pub required_workers: u32,
    pub assignments: Vec<Assignment>,
}

// One day of assignments, guard duty by slot and the full-day tasks
#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub date: NaiveDate,
    pub guard_duty: Vec<GuardSlot>,
    pub kitchen: Vec<Assignment>,
    pub patrol_a: Vec<Assignment>,
    pub patrol_b: Vec<Assignment>,
}
