use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::product::{Product, Redemption, RedemptionStatus};
use crate::models::profile::Profile;
use crate::state::AppState;

pub fn check_redeemable(profile: &Profile, product: &Product) -> Result<(), AppError> {
    if profile.eco_points < product.points_cost {
        return Err(AppError::InsufficientPoints {
            required: product.points_cost,
            available: profile.eco_points,
        });
    }

    if product.stock < 1 {
        return Err(AppError::OutOfStock(product.name.clone()));
    }

    Ok(())
}

/// Exchanges one unit of a product for its points cost.
///
/// The profile and product entries are both held until the balance, the
/// stock and the redemption record have been written.
pub fn redeem(state: &AppState, product_id: Uuid, user_id: Uuid) -> Result<Redemption, AppError> {
    let mut profile = state
        .profiles
        .get_mut(&user_id)
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", user_id)))?;
    let mut product = state
        .products
        .get_mut(&product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {} not found", product_id)))?;

    check_redeemable(&profile, &product)?;

    profile.eco_points -= product.points_cost;
    product.stock -= 1;

    let redemption = Redemption {
        id: Uuid::new_v4(),
        user_id,
        product_id,
        points_spent: product.points_cost,
        quantity: 1,
        status: RedemptionStatus::Pending,
        created_at: Utc::now(),
    };
    state.redemptions.insert(redemption.id, redemption.clone());

    info!(
        user_id = %user_id,
        product_id = %product_id,
        points_spent = redemption.points_spent,
        remaining_points = profile.eco_points,
        "product redeemed"
    );

    Ok(redemption)
}

pub fn advance_status(
    state: &AppState,
    redemption_id: Uuid,
    next: RedemptionStatus,
) -> Result<Redemption, AppError> {
    let mut redemption = state
        .redemptions
        .get_mut(&redemption_id)
        .ok_or_else(|| AppError::NotFound(format!("redemption {} not found", redemption_id)))?;

    if !redemption.status.can_advance_to(next) {
        return Err(AppError::Conflict(format!(
            "redemption cannot move from {:?} to {:?}",
            redemption.status, next
        )));
    }

    redemption.status = next;
    info!(redemption_id = %redemption_id, status = ?next, "redemption status updated");

    Ok(redemption.clone())
}
