use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{patch, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::engine::commit::retire_station_bins;
use crate::error::AppError;
use crate::models::bin::Bin;
use crate::models::station::{Station, StationWithBins};
use crate::models::waste::WasteType;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stations", post(create_station).get(list_stations))
        .route("/stations/:id", patch(update_station).delete(delete_station))
}

#[derive(Deserialize)]
pub struct CreateStationRequest {
    pub name: String,
    pub location: String,
}

#[derive(Deserialize)]
pub struct UpdateStationRequest {
    pub name: Option<String>,
    pub location: Option<String>,
}

fn qr_code(station_id: Uuid, waste_type: WasteType, offset: i64) -> String {
    format!(
        "ECOLOOP-{}-{}-{}",
        station_id,
        waste_type.qr_tag(),
        Utc::now().timestamp_millis() + offset
    )
}

fn station_with_bins(state: &AppState, station: Station) -> StationWithBins {
    let mut bins: Vec<Bin> = state
        .bins
        .iter()
        .filter(|entry| entry.value().station_id == station.id)
        .map(|entry| entry.value().clone())
        .collect();
    bins.sort_by_key(|bin| WasteType::ALL.iter().position(|t| *t == bin.waste_type));

    StationWithBins { station, bins }
}

async fn create_station(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateStationRequest>,
) -> Result<Json<StationWithBins>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    let station = Station {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_string(),
        location: payload.location.trim().to_string(),
        created_at: Utc::now(),
    };
    state.stations.insert(station.id, station.clone());

    let bins: Vec<Bin> = WasteType::ALL
        .iter()
        .zip(0..)
        .map(|(waste_type, offset)| {
            Bin::new(station.id, *waste_type, qr_code(station.id, *waste_type, offset))
        })
        .collect();
    for bin in &bins {
        state.bins.insert(bin.id, bin.clone());
    }

    info!(station_id = %station.id, name = %station.name, "station created with 3 bins");
    Ok(Json(StationWithBins { station, bins }))
}

async fn list_stations(State(state): State<Arc<AppState>>) -> Json<Vec<StationWithBins>> {
    let mut stations: Vec<Station> = state
        .stations
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    stations.sort_by(|a, b| a.name.cmp(&b.name));

    let stations = stations
        .into_iter()
        .map(|station| station_with_bins(&state, station))
        .collect();
    Json(stations)
}

async fn update_station(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStationRequest>,
) -> Result<Json<StationWithBins>, AppError> {
    let updated = {
        let mut station = state
            .stations
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("station {} not found", id)))?;

        if let Some(name) = payload.name {
            if name.trim().is_empty() {
                return Err(AppError::BadRequest("name cannot be empty".to_string()));
            }
            station.name = name.trim().to_string();
        }
        if let Some(location) = payload.location {
            station.location = location.trim().to_string();
        }

        station.clone()
    };

    Ok(Json(station_with_bins(&state, updated)))
}

async fn delete_station(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .stations
        .remove(&id)
        .ok_or_else(|| AppError::NotFound(format!("station {} not found", id)))?;

    let removed_bins = retire_station_bins(&state, id);
    info!(station_id = %id, removed_bins, "station deleted");

    Ok(StatusCode::NO_CONTENT)
}
