// src/models/mod.rs

pub mod assignment;
pub mod task_queue;
pub mod worker;
