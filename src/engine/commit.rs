//! Applies engine outcomes to the in-memory store.
//!
//! Every bin mutation runs while the bin's map entry is held for writing, so
//! concurrent deposits on one bin are serialized and cannot overwrite each
//! other. All fallible steps happen before the first write: a deposit either
//! appends its ledger entry, credits the depositor and replaces the bin, or
//! changes nothing.

use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::capacity;
use crate::engine::deposit::record_deposit;
use crate::error::AppError;
use crate::models::bin::Bin;
use crate::models::deposit::Transaction;
use crate::models::event::BinEvent;
use crate::models::waste::WasteType;
use crate::state::AppState;

pub fn deposit(
    state: &AppState,
    bin_id: Uuid,
    user_id: Uuid,
    waste_type: Option<WasteType>,
    mass_kg: f64,
) -> Result<(Transaction, Bin), AppError> {
    let start = Instant::now();
    let result = commit_deposit(state, bin_id, user_id, waste_type, mass_kg);

    let outcome = match &result {
        Ok(_) => "success",
        Err(AppError::Conflict(_)) => "bin_full",
        Err(AppError::BadRequest(_)) => "invalid",
        Err(AppError::NotFound(_)) => "not_found",
        Err(_) => "error",
    };
    state
        .metrics
        .deposit_latency_seconds
        .with_label_values(&[outcome])
        .observe(start.elapsed().as_secs_f64());
    state
        .metrics
        .deposits_total
        .with_label_values(&[outcome])
        .inc();

    result
}

fn commit_deposit(
    state: &AppState,
    bin_id: Uuid,
    user_id: Uuid,
    waste_type: Option<WasteType>,
    mass_kg: f64,
) -> Result<(Transaction, Bin), AppError> {
    if !state.profiles.contains_key(&user_id) {
        return Err(AppError::NotFound(format!("user {} not found", user_id)));
    }

    let mut bin = state
        .bins
        .get_mut(&bin_id)
        .ok_or_else(|| AppError::NotFound(format!("bin {} not found", bin_id)))?;

    let waste_type = waste_type.unwrap_or(bin.waste_type);
    let outcome = record_deposit(
        &bin,
        waste_type,
        mass_kg,
        &state.policy,
        state.max_capacity_kg,
    )
    .map_err(|err| {
        warn!(bin_id = %bin_id, user_id = %user_id, mass_kg, error = %err, "deposit rejected");
        AppError::from(err)
    })?;

    let mut profile = state
        .profiles
        .get_mut(&user_id)
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", user_id)))?;

    let transaction = Transaction {
        user_id,
        record: outcome.record,
    };
    let points = transaction.record.points_awarded;

    state
        .transactions
        .insert(transaction.record.id, transaction.clone());
    profile.eco_points = profile.eco_points.saturating_add(u64::from(points));
    drop(profile);

    let attention_raised = !bin.needs_attention && outcome.updated_bin.needs_attention;
    *bin = outcome.updated_bin;
    let updated = bin.clone();

    // Bin gauges move while the entry is held so they follow commit order.
    state
        .metrics
        .bin_capacity_percentage
        .with_label_values(&[&updated.id.to_string()])
        .set(f64::from(updated.capacity_percentage));
    if attention_raised {
        state.metrics.bins_needing_attention.inc();
    }
    drop(bin);

    state
        .metrics
        .points_awarded_total
        .with_label_values(&[updated.waste_type.as_str()])
        .inc_by(u64::from(points));

    info!(
        bin_id = %updated.id,
        user_id = %user_id,
        mass_kg = transaction.record.mass_kg,
        points,
        capacity_percentage = updated.capacity_percentage,
        "deposit committed"
    );

    state.publish(BinEvent::Deposited {
        bin_id: updated.id,
        station_id: updated.station_id,
        waste_type: updated.waste_type,
        mass_kg: transaction.record.mass_kg,
        points_awarded: points,
        capacity_percentage: updated.capacity_percentage,
    });

    if attention_raised {
        warn!(
            bin_id = %updated.id,
            station_id = %updated.station_id,
            capacity_percentage = updated.capacity_percentage,
            "bin needs attention"
        );
        state.publish(BinEvent::AttentionRaised {
            bin_id: updated.id,
            station_id: updated.station_id,
            capacity_percentage: updated.capacity_percentage,
        });
    }

    Ok((transaction, updated))
}

pub fn empty(state: &AppState, bin_id: Uuid, worker_id: Uuid) -> Result<Bin, AppError> {
    let role = state
        .profiles
        .get(&worker_id)
        .map(|profile| profile.role)
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", worker_id)))?;

    if !role.can_empty_bins() {
        return Err(AppError::Forbidden(
            "only workers and admins can empty bins".to_string(),
        ));
    }

    let mut bin = state
        .bins
        .get_mut(&bin_id)
        .ok_or_else(|| AppError::NotFound(format!("bin {} not found", bin_id)))?;

    let was_flagged = bin.needs_attention;
    *bin = capacity::empty(&bin);
    let updated = bin.clone();

    if was_flagged {
        state.metrics.bins_needing_attention.dec();
    }
    state
        .metrics
        .bin_capacity_percentage
        .with_label_values(&[&updated.id.to_string()])
        .set(0.0);
    drop(bin);

    info!(bin_id = %updated.id, worker_id = %worker_id, "bin emptied");

    state.publish(BinEvent::Emptied {
        bin_id: updated.id,
        station_id: updated.station_id,
        emptied_by: worker_id,
    });

    Ok(updated)
}

/// Drops the bins of a removed station, keeping the attention gauge in step.
pub fn retire_station_bins(state: &AppState, station_id: Uuid) -> usize {
    let bin_ids: Vec<Uuid> = state
        .bins
        .iter()
        .filter(|entry| entry.value().station_id == station_id)
        .map(|entry| *entry.key())
        .collect();

    let mut removed = 0;
    for bin_id in bin_ids {
        if let Some((_, bin)) = state.bins.remove(&bin_id) {
            if bin.needs_attention {
                state.metrics.bins_needing_attention.dec();
            }
            let _ = state
                .metrics
                .bin_capacity_percentage
                .remove_label_values(&[&bin_id.to_string()]);
            removed += 1;
        }
    }

    removed
}
