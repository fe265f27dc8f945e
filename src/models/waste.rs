use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WasteType {
    Recyclable,
    Organic,
    NonRecyclable,
}

impl WasteType {
    pub const ALL: [WasteType; 3] = [
        WasteType::Recyclable,
        WasteType::Organic,
        WasteType::NonRecyclable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WasteType::Recyclable => "recyclable",
            WasteType::Organic => "organic",
            WasteType::NonRecyclable => "non_recyclable",
        }
    }

    /// Segment used inside bin QR codes.
    pub fn qr_tag(&self) -> &'static str {
        match self {
            WasteType::Recyclable => "RECYCLABLE",
            WasteType::Organic => "ORGANIC",
            WasteType::NonRecyclable => "NONRECYCLABLE",
        }
    }
}

impl fmt::Display for WasteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
