use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub points_cost: u64,
    pub stock: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionStatus {
    Pending,
    Processing,
    Ready,
    Completed,
}

impl RedemptionStatus {
    /// Fulfilment only moves forward.
    pub fn can_advance_to(self, next: RedemptionStatus) -> bool {
        next > self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redemption {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub points_spent: u64,
    pub quantity: u32,
    pub status: RedemptionStatus,
    pub created_at: DateTime<Utc>,
}
