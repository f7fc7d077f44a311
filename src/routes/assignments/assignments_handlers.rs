use actix_web::{web, HttpResponse, Responder};
use chrono::{NaiveDate, Utc};
use log::{error, info, warn};
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;

use super::assignments_models::{CreateAssignmentRequest, GuardSlot, ScheduleQuery, ScheduleResponse};
use crate::models::assignment::{
    is_night_shift, is_time_slot, required_workers_for_slot, slot_departments, Assignment, TaskType,
    ASSIGNMENT_SELECT, TIME_SLOTS,
};
use crate::models::task_queue;
use crate::routes::workers::workers_models::ErrorResponse;

#[derive(Debug, Error)]
enum AssignmentError {
    #[error("{0}")]
    Invalid(String),

    #[error("worker_not_found")]
    WorkerNotFound,

    #[error("assignment_not_found")]
    AssignmentNotFound,

    #[error("worker is already assigned to this task")]
    Duplicate,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AssignmentError {
    fn into_response(self) -> HttpResponse {
        let detail = ErrorResponse {
            detail: self.to_string(),
        };
        match self {
            AssignmentError::Invalid(_) => HttpResponse::UnprocessableEntity().json(detail),
            AssignmentError::WorkerNotFound | AssignmentError::AssignmentNotFound => {
                HttpResponse::NotFound().json(detail)
            }
            AssignmentError::Duplicate => HttpResponse::Conflict().json(detail),
            AssignmentError::Database(e) => {
                error!("Assignment query failed: {}", e);
                HttpResponse::InternalServerError().finish()
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Counter {
    HardChores,
    OuterPartner,
}

impl Counter {
    fn column(self) -> &'static str {
        match self {
            Counter::HardChores => "hard_chores_counter",
            Counter::OuterPartner => "outer_partner_counter",
        }
    }
}

// Counters never drop below zero
async fn adjust_counter(
    conn: &mut SqliteConnection,
    worker_id: i64,
    counter: Counter,
    delta: i64,
) -> Result<(), sqlx::Error> {
    let column = counter.column();
    sqlx::query(&format!(
        "UPDATE workers SET {column} = MAX(0, {column} + ?), updated_at = ? WHERE id = ?"
    ))
    .bind(delta)
    .bind(Utc::now().naive_utc())
    .bind(worker_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn fetch_assignment(
    conn: &mut SqliteConnection,
    assignment_id: i64,
) -> Result<Option<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!("{} WHERE a.id = ?", ASSIGNMENT_SELECT))
        .bind(assignment_id)
        .fetch_optional(&mut *conn)
        .await
}

fn check_slot(task_type: TaskType, time_slot: Option<&str>) -> Result<(), AssignmentError> {
    match (task_type.is_time_slotted(), time_slot) {
        (true, None) => Err(AssignmentError::Invalid(format!(
            "{} needs a time_slot",
            task_type.as_str()
        ))),
        (true, Some(slot)) if !is_time_slot(slot) => {
            Err(AssignmentError::Invalid(format!("unknown time_slot '{}'", slot)))
        }
        (false, Some(_)) => Err(AssignmentError::Invalid(format!(
            "{} lasts the whole day and takes no time_slot",
            task_type.as_str()
        ))),
        _ => Ok(()),
    }
}

async fn assign(pool: &SqlitePool, request: CreateAssignmentRequest) -> Result<Assignment, AssignmentError> {
    let time_slot = request.time_slot.filter(|slot| !slot.is_empty());
    let task_type = request.task_type;
    check_slot(task_type, time_slot.as_deref())?;

    let mut tx = pool.begin().await?;

    let known: Option<i64> = sqlx::query_scalar("SELECT id FROM workers WHERE id = ?")
        .bind(request.worker_id)
        .fetch_optional(&mut *tx)
        .await?;
    if known.is_none() {
        return Err(AssignmentError::WorkerNotFound);
    }

    let guard_slot = time_slot.as_deref().filter(|_| task_type == TaskType::GuardDuty);
    let before = match guard_slot {
        Some(slot) => Some(slot_departments(&mut tx, request.date, slot).await?),
        None => None,
    };

    let now = Utc::now().naive_utc();
    let inserted = sqlx::query_scalar::<_, i64>(
        "INSERT INTO assignments (date, time_slot, task_type, worker_id, is_commander, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)
         RETURNING id",
    )
    .bind(request.date)
    .bind(&time_slot)
    .bind(task_type.as_str())
    .bind(request.worker_id)
    .bind(request.is_commander)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await;

    let assignment_id = match inserted {
        Ok(id) => id,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(AssignmentError::Duplicate)
        }
        Err(e) => return Err(e.into()),
    };

    if is_night_shift(task_type, time_slot.as_deref()) {
        adjust_counter(&mut tx, request.worker_id, Counter::HardChores, 1).await?;
    }

    // A slot turning mixed credits every department guard in it; joining an
    // already mixed slot credits only the newcomer
    if let (Some(slot), Some(before)) = (guard_slot, before) {
        let after = slot_departments(&mut tx, request.date, slot).await?;
        if after.mixed && !before.mixed {
            for worker_id in &after.worker_ids {
                adjust_counter(&mut tx, *worker_id, Counter::OuterPartner, 1).await?;
            }
        } else if after.mixed && after.worker_ids.contains(&request.worker_id) {
            adjust_counter(&mut tx, request.worker_id, Counter::OuterPartner, 1).await?;
        }
    }

    task_queue::move_to_end(&mut tx, request.worker_id, task_type).await?;

    let assignment = fetch_assignment(&mut tx, assignment_id)
        .await?
        .ok_or(AssignmentError::AssignmentNotFound)?;
    tx.commit().await?;
    Ok(assignment)
}

async fn unassign(pool: &SqlitePool, assignment_id: i64) -> Result<(), AssignmentError> {
    let mut tx = pool.begin().await?;

    let assignment = fetch_assignment(&mut tx, assignment_id)
        .await?
        .ok_or(AssignmentError::AssignmentNotFound)?;
    let task_type = TaskType::parse(&assignment.task_type).ok_or_else(|| {
        AssignmentError::Invalid(format!("unknown task_type '{}'", assignment.task_type))
    })?;

    let guard_slot = assignment
        .time_slot
        .as_deref()
        .filter(|_| task_type == TaskType::GuardDuty);
    let before = match guard_slot {
        Some(slot) => Some(slot_departments(&mut tx, assignment.date, slot).await?),
        None => None,
    };

    sqlx::query("DELETE FROM assignments WHERE id = ?")
        .bind(assignment_id)
        .execute(&mut *tx)
        .await?;

    if let (Some(slot), Some(before)) = (guard_slot, before) {
        let after = slot_departments(&mut tx, assignment.date, slot).await?;
        if before.mixed && !after.mixed {
            for worker_id in &after.worker_ids {
                adjust_counter(&mut tx, *worker_id, Counter::OuterPartner, -1).await?;
            }
        }
        if let Some(worker_id) = assignment.worker_id {
            if before.mixed && before.worker_ids.contains(&worker_id) {
                adjust_counter(&mut tx, worker_id, Counter::OuterPartner, -1).await?;
            }
        }
    }

    // Unlinked when its worker was deleted; nothing left to rotate or refund
    if let Some(worker_id) = assignment.worker_id {
        task_queue::move_to_front(&mut tx, worker_id, task_type).await?;
        if is_night_shift(task_type, assignment.time_slot.as_deref()) {
            adjust_counter(&mut tx, worker_id, Counter::HardChores, -1).await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

async fn schedule_for(pool: &SqlitePool, date: NaiveDate) -> Result<ScheduleResponse, sqlx::Error> {
    let assignments = sqlx::query_as::<_, Assignment>(&format!(
        "{} WHERE a.date = ? ORDER BY a.time_slot, a.task_type, a.id",
        ASSIGNMENT_SELECT
    ))
    .bind(date)
    .fetch_all(pool)
    .await?;

    let of_type = |task_type: TaskType| -> Vec<Assignment> {
        assignments
            .iter()
            .filter(|a| a.task_type == task_type.as_str())
            .cloned()
            .collect()
    };

    let guard_duty = TIME_SLOTS
        .iter()
        .map(|&slot| GuardSlot {
            time_slot: slot,
            required_workers: required_workers_for_slot(slot),
            assignments: assignments
                .iter()
                .filter(|a| {
                    a.task_type == TaskType::GuardDuty.as_str() && a.time_slot.as_deref() == Some(slot)
                })
                .cloned()
                .collect(),
        })
        .collect();

    Ok(ScheduleResponse {
        date,
        guard_duty,
        kitchen: of_type(TaskType::Kitchen),
        patrol_a: of_type(TaskType::PatrolA),
        patrol_b: of_type(TaskType::PatrolB),
    })
}

// Handler to show one day of assignments, today when no date is given
pub async fn get_schedule(pool: web::Data<SqlitePool>, query: web::Query<ScheduleQuery>) -> impl Responder {
    let date = query
        .into_inner()
        .date
        .unwrap_or_else(|| Utc::now().date_naive());
    info!("Received request for the schedule of {}", date);

    match schedule_for(pool.get_ref(), date).await {
        Ok(schedule) => HttpResponse::Ok().json(schedule),
        Err(e) => {
            error!("Failed to fetch schedule for {}: {}", date, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

// Handler to assign a worker; updates counters and sends the worker to the back of the queue
pub async fn create_assignment(
    pool: web::Data<SqlitePool>,
    request: web::Json<CreateAssignmentRequest>,
) -> impl Responder {
    let request = request.into_inner();
    info!(
        "Received request to assign worker {} to {} on {}",
        request.worker_id,
        request.task_type.as_str(),
        request.date
    );

    match assign(pool.get_ref(), request).await {
        Ok(assignment) => {
            info!("Assignment {} created", assignment.id);
            HttpResponse::Created().json(assignment)
        }
        Err(e) => {
            warn!("Assignment rejected: {}", e);
            e.into_response()
        }
    }
}

// Handler to remove an assignment; reverses its counters and puts the worker back in front
pub async fn delete_assignment(pool: web::Data<SqlitePool>, path: web::Path<i64>) -> impl Responder {
    let assignment_id = path.into_inner();
    info!("Received request to delete assignment {}", assignment_id);

    match unassign(pool.get_ref(), assignment_id).await {
        Ok(()) => {
            info!("Assignment {} deleted", assignment_id);
            HttpResponse::NoContent().finish()
        }
        Err(e) => {
            warn!("Assignment {} not removed: {}", assignment_id, e);
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::{json, Value};

    use crate::db::memory_pool;
    use crate::routes::routes::{assignments_configure, queues_configure, workers_configure};

    macro_rules! app {
        ($pool:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($pool.clone()))
                    .configure(workers_configure)
                    .configure(assignments_configure)
                    .configure(queues_configure),
            )
            .await
        };
    }

    macro_rules! add_worker {
        ($app:expr, $body:expr) => {{
            let req = test::TestRequest::post().uri("/api/workers").set_json($body).to_request();
            let worker: Value = test::call_and_read_body_json(&$app, req).await;
            worker["id"].as_i64().unwrap()
        }};
    }

    macro_rules! assign {
        ($app:expr, $body:expr) => {{
            let req = test::TestRequest::post().uri("/api/assignments").set_json($body).to_request();
            test::call_service(&$app, req).await
        }};
    }

    macro_rules! unassign {
        ($app:expr, $id:expr) => {{
            let req = test::TestRequest::delete()
                .uri(&format!("/api/assignments/{}", $id))
                .to_request();
            test::call_service(&$app, req).await.status()
        }};
    }

    macro_rules! counters {
        ($app:expr, $id:expr) => {{
            let req = test::TestRequest::get()
                .uri(&format!("/api/workers/{}", $id))
                .to_request();
            let worker: Value = test::call_and_read_body_json(&$app, req).await;
            (
                worker["hard_chores_counter"].as_i64().unwrap(),
                worker["outer_partner_counter"].as_i64().unwrap(),
            )
        }};
    }

    macro_rules! queue {
        ($app:expr, $task:expr) => {{
            let req = test::TestRequest::get()
                .uri(&format!("/api/queues/{}", $task))
                .to_request();
            let queue: Value = test::call_and_read_body_json(&$app, req).await;
            queue["entries"]
                .as_array()
                .unwrap()
                .iter()
                .map(|e| e["worker_id"].as_i64().unwrap())
                .collect::<Vec<i64>>()
        }};
    }

    fn guard(worker_id: i64, slot: &str) -> Value {
        json!({ "date": "2024-05-01", "task_type": "guard_duty", "time_slot": slot, "worker_id": worker_id })
    }

    #[actix_web::test]
    async fn night_guard_shifts_count_as_hard_chores() {
        let pool = memory_pool().await;
        let app = app!(pool);
        let ann = add_worker!(app, json!({ "name": "Ann" }));

        for slot in ["01:00-03:00", "03:00-05:00", "09:00-11:00", "23:00-01:00"] {
            assert_eq!(assign!(app, guard(ann, slot)).status(), StatusCode::CREATED);
        }
        assert_eq!(counters!(app, ann), (2, 0));

        // Kitchen is never a night shift
        let res = assign!(app, json!({ "date": "2024-05-01", "task_type": "kitchen", "worker_id": ann }));
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(counters!(app, ann), (2, 0));
    }

    #[actix_web::test]
    async fn removing_a_night_shift_gives_the_chore_back_but_not_below_zero() {
        let pool = memory_pool().await;
        let app = app!(pool);
        let ann = add_worker!(app, json!({ "name": "Ann" }));

        let created: Value = test::read_body_json(assign!(app, guard(ann, "01:00-03:00"))).await;
        assert_eq!(counters!(app, ann), (1, 0));

        // Someone reset the counter by hand in the meantime
        let req = test::TestRequest::put()
            .uri(&format!("/api/workers/{}", ann))
            .set_json(json!({ "hard_chores_counter": 0 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        assert_eq!(unassign!(app, created["id"]), StatusCode::NO_CONTENT);
        assert_eq!(counters!(app, ann), (0, 0));
        assert_eq!(unassign!(app, created["id"]), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn mixed_department_slots_credit_outer_partners() {
        let pool = memory_pool().await;
        let app = app!(pool);
        let ann = add_worker!(app, json!({ "name": "Ann", "department": "north" }));
        let bob = add_worker!(app, json!({ "name": "Bob", "department": "south" }));
        let cid = add_worker!(app, json!({ "name": "Cid", "department": "north" }));
        let dan = add_worker!(app, json!({ "name": "Dan" }));
        let slot = "19:00-21:00";

        assert_eq!(assign!(app, guard(ann, slot)).status(), StatusCode::CREATED);
        assert_eq!(counters!(app, ann), (0, 0));

        let bob_assignment: Value = test::read_body_json(assign!(app, guard(bob, slot))).await;
        assert_eq!(counters!(app, ann), (0, 1));
        assert_eq!(counters!(app, bob), (0, 1));

        // Joining a slot that is already mixed credits only the newcomer
        assert_eq!(assign!(app, guard(cid, slot)).status(), StatusCode::CREATED);
        assert_eq!(assign!(app, guard(dan, slot)).status(), StatusCode::CREATED);
        assert_eq!(counters!(app, ann), (0, 1));
        assert_eq!(counters!(app, cid), (0, 1));
        assert_eq!(counters!(app, dan), (0, 0));

        // Without Bob the slot is single-department again
        assert_eq!(unassign!(app, bob_assignment["id"]), StatusCode::NO_CONTENT);
        assert_eq!(counters!(app, ann), (0, 0));
        assert_eq!(counters!(app, bob), (0, 0));
        assert_eq!(counters!(app, cid), (0, 0));
        assert_eq!(counters!(app, dan), (0, 0));
    }

    #[actix_web::test]
    async fn assigning_rotates_the_queue_and_removing_restores_the_front() {
        let pool = memory_pool().await;
        let app = app!(pool);
        let ann = add_worker!(app, json!({ "name": "Ann" }));
        let bob = add_worker!(app, json!({ "name": "Bob" }));
        let cid = add_worker!(app, json!({ "name": "Cid" }));
        assert_eq!(queue!(app, "patrol_a"), vec![ann, bob, cid]);

        let res = assign!(app, json!({ "date": "2024-05-01", "task_type": "patrol_a", "worker_id": ann }));
        let created: Value = test::read_body_json(res).await;
        assert_eq!(created["worker_name"], "Ann");
        assert_eq!(created["time_slot"], Value::Null);
        assert_eq!(queue!(app, "patrol_a"), vec![bob, cid, ann]);
        assert_eq!(queue!(app, "kitchen"), vec![ann, bob, cid]);

        let req = test::TestRequest::get().uri("/api/queues/patrol_a/next").to_request();
        let next: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(next["worker_id"].as_i64(), Some(bob));

        assert_eq!(unassign!(app, created["id"]), StatusCode::NO_CONTENT);
        assert_eq!(queue!(app, "patrol_a"), vec![ann, bob, cid]);
    }

    #[actix_web::test]
    async fn invalid_assignments_are_rejected() {
        let pool = memory_pool().await;
        let app = app!(pool);
        let ann = add_worker!(app, json!({ "name": "Ann" }));

        let cases = [
            (json!({ "date": "2024-05-01", "task_type": "guard_duty", "worker_id": ann }), StatusCode::UNPROCESSABLE_ENTITY),
            (guard(ann, "02:00-04:00"), StatusCode::UNPROCESSABLE_ENTITY),
            (
                json!({ "date": "2024-05-01", "task_type": "kitchen", "time_slot": "07:00-09:00", "worker_id": ann }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (json!({ "date": "2024-05-01", "task_type": "laundry", "worker_id": ann }), StatusCode::UNPROCESSABLE_ENTITY),
            (json!({ "date": "May 1st", "task_type": "kitchen", "worker_id": ann }), StatusCode::UNPROCESSABLE_ENTITY),
            (guard(ann + 100, "07:00-09:00"), StatusCode::NOT_FOUND),
        ];
        for (body, status) in cases {
            let res = assign!(app, body.clone());
            assert_eq!(res.status(), status, "{}", body);
            let error: Value = test::read_body_json(res).await;
            assert!(error["detail"].is_string());
        }

        assert_eq!(assign!(app, guard(ann, "07:00-09:00")).status(), StatusCode::CREATED);
        assert_eq!(assign!(app, guard(ann, "07:00-09:00")).status(), StatusCode::CONFLICT);

        let kitchen = json!({ "date": "2024-05-01", "task_type": "kitchen", "time_slot": "", "worker_id": ann });
        assert_eq!(assign!(app, kitchen.clone()).status(), StatusCode::CREATED);
        assert_eq!(assign!(app, kitchen).status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn schedule_groups_the_day_by_slot_and_task() {
        let pool = memory_pool().await;
        let app = app!(pool);
        let ann = add_worker!(app, json!({ "name": "Ann" }));
        assign!(app, guard(ann, "21:00-23:00"));
        assign!(app, json!({ "date": "2024-05-01", "task_type": "kitchen", "worker_id": ann }));
        assign!(app, json!({ "date": "2024-05-02", "task_type": "kitchen", "worker_id": ann }));

        let req = test::TestRequest::get().uri("/api/assignments?date=2024-05-01").to_request();
        let day: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(day["date"], "2024-05-01");

        let slots = day["guard_duty"].as_array().unwrap();
        assert_eq!(slots.len(), 12);
        assert_eq!(slots[0]["time_slot"], "07:00-09:00");
        assert_eq!(slots[0]["required_workers"], 1);
        assert_eq!(slots[7]["time_slot"], "21:00-23:00");
        assert_eq!(slots[7]["required_workers"], 2);
        assert_eq!(slots[7]["assignments"][0]["worker_name"], "Ann");
        assert_eq!(day["kitchen"].as_array().unwrap().len(), 1);
        assert!(day["patrol_b"].as_array().unwrap().is_empty());

        let req = test::TestRequest::get().uri("/api/assignments?date=soon").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
