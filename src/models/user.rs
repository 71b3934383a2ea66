use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// A user is nothing more than an opaque device identifier; the first request
// from a device creates its row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub device_id: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(device_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            device_id: device_id.to_string(),
            created_at: Utc::now(),
        }
    }
}
