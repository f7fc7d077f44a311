use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use log::{error, info, warn};
use sqlx::SqlitePool;

use super::workers_models::{CreateWorkerRequest, ErrorResponse, UpdateWorkerRequest};
use crate::models::{task_queue, worker::Worker};

const WORKER_COLUMNS: &str =
    "id, name, title, department, hard_chores_counter, outer_partner_counter, created_at, updated_at";

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse {
        detail: "worker_not_found".into(),
    })
}

fn empty_name() -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(ErrorResponse {
        detail: "name must not be empty".into(),
    })
}

async fn find_worker(pool: &SqlitePool, worker_id: i64) -> Result<Option<Worker>, sqlx::Error> {
    sqlx::query_as::<_, Worker>(&format!("SELECT {} FROM workers WHERE id = ?", WORKER_COLUMNS))
        .bind(worker_id)
        .fetch_optional(pool)
        .await
}

// Handler to list every worker, lowest id first
pub async fn list_workers(pool: web::Data<SqlitePool>) -> impl Responder {
    info!("Received request to list workers");
    let result = sqlx::query_as::<_, Worker>(&format!(
        "SELECT {} FROM workers ORDER BY id ASC",
        WORKER_COLUMNS
    ))
    .fetch_all(pool.get_ref())
    .await;

    match result {
        Ok(workers) => HttpResponse::Ok().json(workers),
        Err(e) => {
            error!("Failed to fetch workers: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

// Handler to add a worker
pub async fn create_worker(
    pool: web::Data<SqlitePool>,
    request: web::Json<CreateWorkerRequest>,
) -> impl Responder {
    let request = request.into_inner();
    info!("Received request to create worker: {}", request.name);

    if request.name.is_empty() {
        warn!("Rejected worker with empty name");
        return empty_name();
    }

    let now = Utc::now().naive_utc();
    let mut tx = match pool.begin().await {
        Ok(tx) => tx,
        Err(e) => {
            error!("Failed to start transaction: {}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    let inserted = sqlx::query_as::<_, Worker>(&format!(
        "INSERT INTO workers (name, title, department, hard_chores_counter, outer_partner_counter, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)
         RETURNING {}",
        WORKER_COLUMNS
    ))
    .bind(&request.name)
    .bind(&request.title)
    .bind(&request.department)
    .bind(request.hard_chores_counter)
    .bind(request.outer_partner_counter)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await;

    let worker = match inserted {
        Ok(worker) => worker,
        Err(e) => {
            error!("Failed to insert worker: {}", e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    // Every new worker joins the back of each task queue
    if let Err(e) = task_queue::initialize_for_worker(&mut *tx, worker.id).await {
        error!("Failed to queue worker {}: {}", worker.id, e);
        return HttpResponse::InternalServerError().finish();
    }

    match tx.commit().await {
        Ok(()) => {
            info!("Worker {} created with id {}", worker.name, worker.id);
            HttpResponse::Created().json(worker)
        }
        Err(e) => {
            error!("Failed to commit worker {}: {}", worker.name, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

// Handler to get a single worker
pub async fn get_worker(pool: web::Data<SqlitePool>, path: web::Path<i64>) -> impl Responder {
    let worker_id = path.into_inner();
    info!("Received request to get worker {}", worker_id);

    match find_worker(pool.get_ref(), worker_id).await {
        Ok(Some(worker)) => HttpResponse::Ok().json(worker),
        Ok(None) => {
            info!("Worker not found: {}", worker_id);
            not_found()
        }
        Err(e) => {
            error!("Failed to fetch worker {}: {}", worker_id, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

// Handler to update a worker; only the fields present in the body change
pub async fn update_worker(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    request: web::Json<UpdateWorkerRequest>,
) -> impl Responder {
    let worker_id = path.into_inner();
    let request = request.into_inner();
    info!("Received request to update worker {}", worker_id);

    if matches!(request.name.as_deref(), Some("")) {
        warn!("Rejected update of worker {} with empty name", worker_id);
        return empty_name();
    }

    let mut worker = match find_worker(pool.get_ref(), worker_id).await {
        Ok(Some(worker)) => worker,
        Ok(None) => {
            info!("Worker not found: {}", worker_id);
            return not_found();
        }
        Err(e) => {
            error!("Failed to fetch worker {}: {}", worker_id, e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Some(name) = request.name {
        worker.name = name;
    }
    if let Some(title) = request.title {
        worker.title = title;
    }
    if let Some(department) = request.department {
        worker.department = department;
    }
    if let Some(counter) = request.hard_chores_counter {
        worker.hard_chores_counter = counter;
    }
    if let Some(counter) = request.outer_partner_counter {
        worker.outer_partner_counter = counter;
    }
    worker.updated_at = Utc::now().naive_utc();

    let result = sqlx::query_as::<_, Worker>(&format!(
        "UPDATE workers
         SET name = ?, title = ?, department = ?, hard_chores_counter = ?, outer_partner_counter = ?, updated_at = ?
         WHERE id = ?
         RETURNING {}",
        WORKER_COLUMNS
    ))
    .bind(&worker.name)
    .bind(&worker.title)
    .bind(&worker.department)
    .bind(worker.hard_chores_counter)
    .bind(worker.outer_partner_counter)
    .bind(worker.updated_at)
    .bind(worker_id)
    .fetch_optional(pool.get_ref())
    .await;

    match result {
        Ok(Some(worker)) => {
            info!("Worker {} updated", worker_id);
            HttpResponse::Ok().json(worker)
        }
        // Deleted between the read and the write
        Ok(None) => not_found(),
        Err(e) => {
            error!("Failed to update worker {}: {}", worker_id, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

// Handler to delete a worker
pub async fn delete_worker(pool: web::Data<SqlitePool>, path: web::Path<i64>) -> impl Responder {
    let worker_id = path.into_inner();
    info!("Received request to delete worker {}", worker_id);

    let result = sqlx::query("DELETE FROM workers WHERE id = ?")
        .bind(worker_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => {
            info!("Worker not found: {}", worker_id);
            not_found()
        }
        Ok(_) => {
            info!("Worker {} deleted", worker_id);
            HttpResponse::NoContent().finish()
        }
        Err(e) => {
            error!("Failed to delete worker {}: {}", worker_id, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
