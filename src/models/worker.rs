use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Worker {
    pub id: i64,
    pub name: String,
    pub title: Option<String>,
    pub department: Option<String>,
    pub hard_chores_counter: i64,
    pub outer_partner_counter: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
