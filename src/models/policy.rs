use serde::{Deserialize, Serialize};

use crate::models::waste::WasteType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PointRule {
    pub base_points: u32,
    pub points_per_kg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringPolicy {
    pub recyclable: PointRule,
    pub organic: PointRule,
    pub non_recyclable: PointRule,
}

impl ScoringPolicy {
    pub fn rule(&self, waste_type: WasteType) -> &PointRule {
        match waste_type {
            WasteType::Recyclable => &self.recyclable,
            WasteType::Organic => &self.organic,
            WasteType::NonRecyclable => &self.non_recyclable,
        }
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            recyclable: PointRule {
                base_points: 10,
                points_per_kg: 2.0,
            },
            organic: PointRule {
                base_points: 8,
                points_per_kg: 1.5,
            },
            non_recyclable: PointRule {
                base_points: 5,
                points_per_kg: 1.0,
            },
        }
    }
}
