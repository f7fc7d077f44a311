pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod shell;
pub mod view;
