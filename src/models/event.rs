use serde::Serialize;
use uuid::Uuid;

use crate::models::waste::WasteType;

/// Pushed to live subscribers whenever a bin's fill state changes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BinEvent {
    Deposited {
        bin_id: Uuid,
        station_id: Uuid,
        waste_type: WasteType,
        mass_kg: f64,
        points_awarded: u32,
        capacity_percentage: u8,
    },
    AttentionRaised {
        bin_id: Uuid,
        station_id: Uuid,
        capacity_percentage: u8,
    },
    Emptied {
        bin_id: Uuid,
        station_id: Uuid,
        emptied_by: Uuid,
    },
}
