use actix_web::{error::InternalError, web, HttpResponse};
use log::warn;
use serde_json::json;

use super::assignments::assignments_handlers;
use super::queues::queues_handlers;
use super::workers::{workers_handlers, workers_models::ErrorResponse};

fn unprocessable<E>(err: E) -> actix_web::Error
where
    E: std::fmt::Display + std::fmt::Debug + 'static,
{
    let detail = err.to_string();
    warn!("Rejected request: {}", detail);
    InternalError::from_response(err, HttpResponse::UnprocessableEntity().json(ErrorResponse { detail }))
        .into()
}

// Malformed bodies, ids and query strings answer 422 with a detail message, like validation failures
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| unprocessable(err))
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| unprocessable(err))
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| unprocessable(err))
}

pub fn health_configure(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/api/health",
        web::get().to(|| async { HttpResponse::Ok().json(json!({ "status": "ok" })) }),
    );
}

pub fn workers_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/workers")
            .app_data(json_config())
            .app_data(path_config())
            .route("", web::get().to(workers_handlers::list_workers))
            .route("", web::post().to(workers_handlers::create_worker))
            .route("/{worker_id}", web::get().to(workers_handlers::get_worker))
            .route("/{worker_id}", web::put().to(workers_handlers::update_worker))
            .route("/{worker_id}", web::delete().to(workers_handlers::delete_worker))
    );
}

pub fn assignments_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/assignments")
            .app_data(json_config())
            .app_data(path_config())
            .app_data(query_config())
            .route("", web::get().to(assignments_handlers::get_schedule))
            .route("", web::post().to(assignments_handlers::create_assignment))
            .route("/{assignment_id}", web::delete().to(assignments_handlers::delete_assignment))
    );
}

pub fn queues_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/queues")
            .app_data(path_config())
            .route("", web::get().to(queues_handlers::list_queues))
            .route("/initialize", web::post().to(queues_handlers::initialize_queues))
            .route("/{task_type}", web::get().to(queues_handlers::get_queue))
            .route("/{task_type}/next", web::get().to(queues_handlers::next_in_queue))
    );
}
