pub mod capacity;
pub mod commit;
pub mod deposit;
pub mod quiz;
pub mod redemption;
pub mod scoring;

use thiserror::Error;
use uuid::Uuid;

use crate::models::waste::WasteType;

/// Bins flag themselves for emptying at or above this fill percentage.
pub const ATTENTION_THRESHOLD_PCT: u8 = 80;

pub const DEFAULT_MAX_CAPACITY_KG: f64 = 120.0;

#[derive(Debug, Error, PartialEq)]
pub enum DepositError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("waste type {actual} does not match bin type {expected}")]
    TypeMismatch {
        expected: WasteType,
        actual: WasteType,
    },

    #[error("bin {bin_id} is full")]
    BinFull { bin_id: Uuid },
}

pub(crate) fn validate_mass(mass_kg: f64) -> Result<(), DepositError> {
    if !mass_kg.is_finite() {
        return Err(DepositError::InvalidInput(
            "mass_kg must be a finite number".to_string(),
        ));
    }

    if mass_kg <= 0.0 {
        return Err(DepositError::InvalidInput(
            "mass_kg must be greater than 0".to_string(),
        ));
    }

    Ok(())
}
