use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::bin::Bin;
use crate::models::waste::WasteType;

/// Ledger entry for one accepted deposit. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepositRecord {
    pub id: Uuid,
    pub bin_id: Uuid,
    pub waste_type: WasteType,
    pub mass_kg: f64,
    pub points_awarded: u32,
    pub timestamp: DateTime<Utc>,
}

/// Both effects of a deposit. Callers apply them together or not at all.
#[derive(Debug, Clone, Serialize)]
pub struct DepositOutcome {
    pub updated_bin: Bin,
    pub record: DepositRecord,
}

/// A deposit record attributed to the profile that made it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub record: DepositRecord,
}
