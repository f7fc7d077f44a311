use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection};

pub const TIME_SLOTS: [&str; 12] = [
    "07:00-09:00",
    "09:00-11:00",
    "11:00-13:00",
    "13:00-15:00",
    "15:00-17:00",
    "17:00-19:00",
    "19:00-21:00",
    "21:00-23:00",
    "23:00-01:00",
    "01:00-03:00",
    "03:00-05:00",
    "05:00-07:00",
];

const DAYTIME_SLOTS: [&str; 5] = [
    "07:00-09:00",
    "09:00-11:00",
    "11:00-13:00",
    "13:00-15:00",
    "15:00-17:00",
];

const NIGHT_SHIFT_SLOTS: [&str; 2] = ["01:00-03:00", "03:00-05:00"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    GuardDuty,
    PatrolA,
    PatrolB,
    Kitchen,
}

impl TaskType {
    pub const ALL: [TaskType; 4] = [
        TaskType::GuardDuty,
        TaskType::PatrolA,
        TaskType::PatrolB,
        TaskType::Kitchen,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::GuardDuty => "guard_duty",
            TaskType::PatrolA => "patrol_a",
            TaskType::PatrolB => "patrol_b",
            TaskType::Kitchen => "kitchen",
        }
    }

    pub fn parse(value: &str) -> Option<TaskType> {
        TaskType::ALL.into_iter().find(|t| t.as_str() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskType::GuardDuty => "Guard Duty",
            TaskType::PatrolA => "Patrol A",
            TaskType::PatrolB => "Patrol B",
            TaskType::Kitchen => "Kitchen",
        }
    }

    /// Guard duty is split into two-hour slots; the rest take the whole day.
    pub fn is_time_slotted(self) -> bool {
        self == TaskType::GuardDuty
    }
}

pub fn is_time_slot(value: &str) -> bool {
    TIME_SLOTS.contains(&value)
}

/// Guards needed in a slot: one by day, two otherwise.
pub fn required_workers_for_slot(time_slot: &str) -> u32 {
    if DAYTIME_SLOTS.contains(&time_slot) {
        1
    } else {
        2
    }
}

pub fn is_night_shift(task_type: TaskType, time_slot: Option<&str>) -> bool {
    task_type == TaskType::GuardDuty && time_slot.is_some_and(|slot| NIGHT_SHIFT_SLOTS.contains(&slot))
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Assignment {
    pub id: i64,
    pub date: NaiveDate,
    pub time_slot: Option<String>,
    pub task_type: String,
    pub worker_id: Option<i64>,
    pub worker_name: Option<String>,
    pub is_commander: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

pub const ASSIGNMENT_SELECT: &str = "
    SELECT a.id, a.date, a.time_slot, a.task_type, a.worker_id, w.name AS worker_name,
           a.is_commander, a.created_at, a.updated_at
    FROM assignments a
    LEFT JOIN workers w ON a.worker_id = w.id";

/// Guards of one slot that belong to a department.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotDepartments {
    /// At least two different departments share the slot
    pub mixed: bool,
    pub worker_ids: Vec<i64>,
}

pub async fn slot_departments(
    conn: &mut SqliteConnection,
    date: NaiveDate,
    time_slot: &str,
) -> Result<SlotDepartments, sqlx::Error> {
    let rows: Vec<(i64, String)> = sqlx::query_as(
        "SELECT DISTINCT w.id, w.department
         FROM assignments a
         JOIN workers w ON a.worker_id = w.id
         WHERE a.date = ? AND a.time_slot = ? AND a.task_type = 'guard_duty'
           AND w.department IS NOT NULL AND w.department != ''
         ORDER BY w.id",
    )
    .bind(date)
    .bind(time_slot)
    .fetch_all(&mut *conn)
    .await?;

    let first = rows.first().map(|(_, dept)| dept.as_str());
    let mixed = rows.iter().any(|(_, dept)| Some(dept.as_str()) != first);
    Ok(SlotDepartments {
        mixed,
        worker_ids: rows.into_iter().map(|(id, _)| id).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_types_round_trip_through_text() {
        for task_type in TaskType::ALL {
            assert_eq!(TaskType::parse(task_type.as_str()), Some(task_type));
        }
        assert_eq!(TaskType::parse("laundry"), None);
        assert_eq!(
            serde_json::to_string(&TaskType::PatrolA).unwrap(),
            "\"patrol_a\""
        );
    }

    #[test]
    fn only_guard_duty_uses_slots() {
        assert!(TaskType::GuardDuty.is_time_slotted());
        assert!(!TaskType::Kitchen.is_time_slotted());
        assert!(!TaskType::PatrolB.is_time_slotted());
    }

    #[test]
    fn night_shift_is_early_morning_guard_duty() {
        assert!(is_night_shift(TaskType::GuardDuty, Some("01:00-03:00")));
        assert!(is_night_shift(TaskType::GuardDuty, Some("03:00-05:00")));
        assert!(!is_night_shift(TaskType::GuardDuty, Some("23:00-01:00")));
        assert!(!is_night_shift(TaskType::GuardDuty, None));
        assert!(!is_night_shift(TaskType::Kitchen, Some("01:00-03:00")));
    }

    #[test]
    fn slots_need_one_guard_by_day_and_two_at_night() {
        assert_eq!(required_workers_for_slot("07:00-09:00"), 1);
        assert_eq!(required_workers_for_slot("15:00-17:00"), 1);
        assert_eq!(required_workers_for_slot("17:00-19:00"), 2);
        assert_eq!(required_workers_for_slot("05:00-07:00"), 2);
        assert!(is_time_slot("23:00-01:00"));
        assert!(!is_time_slot("23:00-02:00"));
    }
}
