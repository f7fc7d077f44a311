use serde::Serialize;

use crate::models::task_queue::QueueEntry;

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub task_type: &'static str,
    pub label: &'static str,
    pub entries: Vec<QueueEntry>,
}

#[derive(Debug, Serialize)]
pub struct InitializeQueuesResponse {
    pub created: u64,
}
