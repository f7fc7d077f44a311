use serde::{Deserialize, Deserializer, Serialize};

// Distinguishes a missing field (None) from an explicit null (Some(None))
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

// Create worker request
#[derive(Debug, Deserialize)]
pub struct CreateWorkerRequest {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub hard_chores_counter: i64,
    #[serde(default)]
    pub outer_partner_counter: i64,
}

// Update worker request, every field optional
#[derive(Debug, Default, Deserialize)]
pub struct UpdateWorkerRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub department: Option<Option<String>>,
    #[serde(default)]
    pub hard_chores_counter: Option<i64>,
    #[serde(default)]
    pub outer_partner_counter: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
