use uuid::Uuid;

use crate::engine::capacity::apply_deposit;
use crate::engine::scoring::compute_points;
use crate::engine::{validate_mass, DepositError};
use crate::models::bin::Bin;
use crate::models::deposit::{DepositOutcome, DepositRecord};
use crate::models::policy::ScoringPolicy;
use crate::models::waste::WasteType;

/// Computes the bin update and ledger entry for one deposit without touching
/// any store.
///
/// Points are scored on the bin's own waste type and on the mass the bin
/// actually accepted, so a clamped deposit earns less than the mass offered.
pub fn record_deposit(
    bin: &Bin,
    waste_type: WasteType,
    mass_kg: f64,
    policy: &ScoringPolicy,
    max_capacity_kg: f64,
) -> Result<DepositOutcome, DepositError> {
    validate_mass(mass_kg)?;

    if waste_type != bin.waste_type {
        return Err(DepositError::TypeMismatch {
            expected: bin.waste_type,
            actual: waste_type,
        });
    }

    let (updated_bin, mass_added) = apply_deposit(bin, mass_kg, max_capacity_kg)?;
    if mass_added <= 0.0 {
        return Err(DepositError::InvalidInput(format!(
            "mass {mass_kg}kg is too small to register on a bin holding {}kg",
            bin.current_mass_kg
        )));
    }

    let points_awarded = compute_points(bin.waste_type, mass_added, policy)?;

    let record = DepositRecord {
        id: Uuid::new_v4(),
        bin_id: bin.id,
        waste_type: bin.waste_type,
        mass_kg: mass_added,
        points_awarded,
        timestamp: updated_bin.updated_at,
    };

    Ok(DepositOutcome {
        updated_bin,
        record,
    })
}
