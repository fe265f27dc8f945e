use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Worker,
    Admin,
}

impl Role {
    pub fn can_empty_bins(&self) -> bool {
        matches!(self, Role::Worker | Role::Admin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub eco_points: u64,
    pub created_at: DateTime<Utc>,
}
