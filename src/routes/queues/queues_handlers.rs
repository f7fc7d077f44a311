use actix_web::{web, HttpResponse, Responder};
use log::{error, info, warn};
use sqlx::SqlitePool;

use super::queues_models::{InitializeQueuesResponse, QueueResponse};
use crate::models::assignment::TaskType;
use crate::models::task_queue;
use crate::routes::workers::workers_models::ErrorResponse;

fn unknown_task(task_type: &str) -> HttpResponse {
    warn!("Unknown task type: {}", task_type);
    HttpResponse::UnprocessableEntity().json(ErrorResponse {
        detail: format!("unknown task_type '{}'", task_type),
    })
}

async fn load_queue(pool: &SqlitePool, task_type: TaskType) -> Result<QueueResponse, sqlx::Error> {
    let mut conn = pool.acquire().await?;
    let entries = task_queue::queue_for_task(&mut conn, task_type).await?;
    Ok(QueueResponse {
        task_type: task_type.as_str(),
        label: task_type.label(),
        entries,
    })
}

// Handler to list the rotation of every task
pub async fn list_queues(pool: web::Data<SqlitePool>) -> impl Responder {
    info!("Received request to list task queues");
    let mut queues = Vec::with_capacity(TaskType::ALL.len());
    for task_type in TaskType::ALL {
        match load_queue(pool.get_ref(), task_type).await {
            Ok(queue) => queues.push(queue),
            Err(e) => {
                error!("Failed to fetch {} queue: {}", task_type.as_str(), e);
                return HttpResponse::InternalServerError().finish();
            }
        }
    }
    HttpResponse::Ok().json(queues)
}

// Handler to show one task's rotation, head first
pub async fn get_queue(pool: web::Data<SqlitePool>, path: web::Path<String>) -> impl Responder {
    let name = path.into_inner();
    let Some(task_type) = TaskType::parse(&name) else {
        return unknown_task(&name);
    };
    info!("Received request for the {} queue", name);

    match load_queue(pool.get_ref(), task_type).await {
        Ok(queue) => HttpResponse::Ok().json(queue),
        Err(e) => {
            error!("Failed to fetch {} queue: {}", name, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

// Handler to suggest the next worker for a task
pub async fn next_in_queue(pool: web::Data<SqlitePool>, path: web::Path<String>) -> impl Responder {
    let name = path.into_inner();
    let Some(task_type) = TaskType::parse(&name) else {
        return unknown_task(&name);
    };
    info!("Received request for the next worker for {}", name);

    let next = match pool.acquire().await {
        Ok(mut conn) => task_queue::next_worker(&mut conn, task_type).await,
        Err(e) => Err(e),
    };
    match next {
        Ok(Some(entry)) => HttpResponse::Ok().json(entry),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            detail: "queue_empty".into(),
        }),
        Err(e) => {
            error!("Failed to fetch next worker for {}: {}", name, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn initialize_all(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let worker_ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM workers ORDER BY id")
        .fetch_all(&mut *tx)
        .await?;
    let mut created = 0;
    for worker_id in worker_ids {
        created += task_queue::initialize_for_worker(&mut tx, worker_id).await?;
    }
    tx.commit().await?;
    Ok(created)
}

// Handler to put every worker missing from a queue at its back
pub async fn initialize_queues(pool: web::Data<SqlitePool>) -> impl Responder {
    info!("Received request to initialize task queues");
    match initialize_all(pool.get_ref()).await {
        Ok(created) => {
            info!("Added {} queue entries", created);
            HttpResponse::Ok().json(InitializeQueuesResponse { created })
        }
        Err(e) => {
            error!("Failed to initialize task queues: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
