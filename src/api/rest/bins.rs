use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::commit;
use crate::error::AppError;
use crate::models::bin::Bin;
use crate::models::deposit::Transaction;
use crate::models::waste::WasteType;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bins", get(list_bins))
        .route("/bins/:id", get(get_bin))
        .route("/bins/:id/deposits", post(create_deposit))
        .route("/bins/:id/empty", post(empty_bin))
        .route("/scan/:qr_code", get(scan_bin))
}

#[derive(Deserialize)]
pub struct BinFilter {
    pub needs_attention: Option<bool>,
    pub station_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct DepositRequest {
    pub user_id: Uuid,
    pub mass_kg: f64,
    /// Defaults to the bin's own type; a differing value is rejected.
    pub waste_type: Option<WasteType>,
}

#[derive(Serialize)]
pub struct DepositResponse {
    pub transaction: Transaction,
    pub bin: Bin,
}

#[derive(Deserialize)]
pub struct EmptyBinRequest {
    pub worker_id: Uuid,
}

async fn list_bins(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<BinFilter>,
) -> Json<Vec<Bin>> {
    let mut bins: Vec<Bin> = state
        .bins
        .iter()
        .map(|entry| entry.value().clone())
        .filter(|bin| {
            filter
                .needs_attention
                .is_none_or(|flag| bin.needs_attention == flag)
                && filter.station_id.is_none_or(|id| bin.station_id == id)
        })
        .collect();
    bins.sort_by(|a, b| b.capacity_percentage.cmp(&a.capacity_percentage));

    Json(bins)
}

async fn get_bin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Bin>, AppError> {
    let bin = state
        .bins
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("bin {} not found", id)))?;

    Ok(Json(bin.value().clone()))
}

async fn scan_bin(
    State(state): State<Arc<AppState>>,
    Path(qr_code): Path<String>,
) -> Result<Json<Bin>, AppError> {
    state
        .find_bin_by_qr(&qr_code)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("unknown QR code; scan a waste bin code".to_string()))
}

async fn create_deposit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DepositRequest>,
) -> Result<Json<DepositResponse>, AppError> {
    let (transaction, bin) = commit::deposit(
        &state,
        id,
        payload.user_id,
        payload.waste_type,
        payload.mass_kg,
    )?;

    Ok(Json(DepositResponse { transaction, bin }))
}

async fn empty_bin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EmptyBinRequest>,
) -> Result<Json<Bin>, AppError> {
    let bin = commit::empty(&state, id, payload.worker_id)?;
    Ok(Json(bin))
}
