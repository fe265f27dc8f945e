use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{patch, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::redemption::{advance_status, redeem};
use crate::error::AppError;
use crate::models::product::{Product, Redemption, RedemptionStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", post(create_product).get(list_products))
        .route("/products/:id/redeem", post(redeem_product))
        .route("/redemptions/:id/status", patch(update_redemption_status))
}

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub points_cost: u64,
    pub stock: u32,
}

#[derive(Deserialize)]
pub struct RedeemRequest {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct UpdateRedemptionStatusRequest {
    pub status: RedemptionStatus,
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<Json<Product>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    if payload.points_cost == 0 {
        return Err(AppError::BadRequest("points_cost must be > 0".to_string()));
    }

    let product = Product {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_string(),
        description: payload.description,
        category: payload.category,
        points_cost: payload.points_cost,
        stock: payload.stock,
        created_at: Utc::now(),
    };

    state.products.insert(product.id, product.clone());
    Ok(Json(product))
}

async fn list_products(State(state): State<Arc<AppState>>) -> Json<Vec<Product>> {
    let mut products: Vec<Product> = state
        .products
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    products.sort_by(|a, b| a.points_cost.cmp(&b.points_cost));

    Json(products)
}

async fn redeem_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RedeemRequest>,
) -> Result<Json<Redemption>, AppError> {
    let redemption = redeem(&state, id, payload.user_id)?;
    Ok(Json(redemption))
}

async fn update_redemption_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRedemptionStatusRequest>,
) -> Result<Json<Redemption>, AppError> {
    let redemption = advance_status(&state, id, payload.status)?;
    Ok(Json(redemption))
}
