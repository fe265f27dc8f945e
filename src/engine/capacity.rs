use chrono::Utc;

use crate::engine::{validate_mass, DepositError, ATTENTION_THRESHOLD_PCT};
use crate::models::bin::Bin;

pub fn capacity_percentage(mass_kg: f64, max_capacity_kg: f64) -> u8 {
    let pct = (mass_kg / max_capacity_kg * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

pub fn needs_attention(capacity_percentage: u8) -> bool {
    capacity_percentage >= ATTENTION_THRESHOLD_PCT
}

/// Adds up to `mass_kg` to the bin, clamping at `max_capacity_kg`.
///
/// Returns the updated bin and the mass that was actually accepted. A bin
/// that is already at capacity rejects the deposit outright.
pub fn apply_deposit(
    bin: &Bin,
    mass_kg: f64,
    max_capacity_kg: f64,
) -> Result<(Bin, f64), DepositError> {
    validate_mass(mass_kg)?;
    if !max_capacity_kg.is_finite() || max_capacity_kg <= 0.0 {
        return Err(DepositError::InvalidInput(format!(
            "max capacity {max_capacity_kg} must be a positive number"
        )));
    }

    if bin.current_mass_kg >= max_capacity_kg {
        return Err(DepositError::BinFull { bin_id: bin.id });
    }

    let new_mass = (bin.current_mass_kg + mass_kg).min(max_capacity_kg);
    let mass_added = new_mass - bin.current_mass_kg;
    let pct = capacity_percentage(new_mass, max_capacity_kg);

    let mut updated = bin.clone();
    updated.current_mass_kg = new_mass;
    updated.capacity_percentage = pct;
    updated.needs_attention = needs_attention(pct);
    updated.version = bin.version.wrapping_add(1);
    updated.updated_at = Utc::now();

    Ok((updated, mass_added))
}

pub fn empty(bin: &Bin) -> Bin {
    let mut updated = bin.clone();
    updated.current_mass_kg = 0.0;
    updated.capacity_percentage = 0;
    updated.needs_attention = false;
    updated.version = bin.version.wrapping_add(1);
    updated.updated_at = Utc::now();
    updated
}
