use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct MetaRow {
    pub key: String,
    pub value: Value,
    pub updated_at: DateTime<Utc>,
}
