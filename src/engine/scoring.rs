use crate::engine::{validate_mass, DepositError};
use crate::models::policy::ScoringPolicy;
use crate::models::waste::WasteType;

/// Points for depositing `mass_kg` of `waste_type`: base points plus the
/// per-kilogram rate, rounded half-up.
pub fn compute_points(
    waste_type: WasteType,
    mass_kg: f64,
    policy: &ScoringPolicy,
) -> Result<u32, DepositError> {
    validate_mass(mass_kg)?;

    let rule = policy.rule(waste_type);
    let raw = rule.base_points as f64 + mass_kg * rule.points_per_kg.max(0.0);

    // `round` goes half away from zero, which is half-up for non-negative input.
    let points = raw.round();
    if points > u32::MAX as f64 {
        return Err(DepositError::InvalidInput(format!(
            "mass_kg {mass_kg} yields more points than can be awarded"
        )));
    }

    Ok(points as u32)
}
