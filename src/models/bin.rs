use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::waste::WasteType;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bin {
    pub id: Uuid,
    pub station_id: Uuid,
    pub qr_code: String,
    pub waste_type: WasteType,
    pub current_mass_kg: f64,
    pub capacity_percentage: u8,
    pub needs_attention: bool,
    /// Bumped on every mutation of the fill state.
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

impl Bin {
    pub fn new(station_id: Uuid, waste_type: WasteType, qr_code: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            station_id,
            qr_code,
            waste_type,
            current_mass_kg: 0.0,
            capacity_percentage: 0,
            needs_attention: false,
            version: 0,
            updated_at: Utc::now(),
        }
    }
}
