use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::deposit::Transaction;
use crate::models::product::Redemption;
use crate::models::profile::{Profile, Role};
use crate::models::quiz::QuizCompletion;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/:id", get(get_user))
        .route("/users/:id/role", patch(update_role))
        .route("/users/:id/transactions", get(list_transactions))
        .route("/users/:id/redemptions", get(list_redemptions))
        .route("/users/:id/quiz-completions", get(list_quiz_completions))
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub full_name: String,
    pub email: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

fn ensure_user(state: &AppState, id: Uuid) -> Result<(), AppError> {
    if state.profiles.contains_key(&id) {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("user {} not found", id)))
    }
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<Profile>, AppError> {
    if payload.full_name.trim().is_empty() {
        return Err(AppError::BadRequest("full_name cannot be empty".to_string()));
    }

    if !payload.email.contains('@') {
        return Err(AppError::BadRequest("email is not valid".to_string()));
    }

    let email = payload.email.trim().to_lowercase();
    let id = Uuid::new_v4();
    state.claim_email(&email, id)?;

    let profile = Profile {
        id,
        full_name: payload.full_name.trim().to_string(),
        email,
        role: payload.role,
        eco_points: 0,
        created_at: Utc::now(),
    };

    state.profiles.insert(profile.id, profile.clone());
    Ok(Json(profile))
}

async fn list_users(State(state): State<Arc<AppState>>) -> Json<Vec<Profile>> {
    let mut profiles: Vec<Profile> = state
        .profiles
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Json(profiles)
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Profile>, AppError> {
    let profile = state
        .profiles
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", id)))?;

    Ok(Json(profile.value().clone()))
}

async fn update_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<Profile>, AppError> {
    let mut profile = state
        .profiles
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", id)))?;

    profile.role = payload.role;

    Ok(Json(profile.clone()))
}

async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    ensure_user(&state, id)?;

    let mut transactions: Vec<Transaction> = state
        .transactions
        .iter()
        .filter(|entry| entry.value().user_id == id)
        .map(|entry| entry.value().clone())
        .collect();
    transactions.sort_by(|a, b| b.record.timestamp.cmp(&a.record.timestamp));

    Ok(Json(transactions))
}

async fn list_redemptions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Redemption>>, AppError> {
    ensure_user(&state, id)?;

    let mut redemptions: Vec<Redemption> = state
        .redemptions
        .iter()
        .filter(|entry| entry.value().user_id == id)
        .map(|entry| entry.value().clone())
        .collect();
    redemptions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(redemptions))
}

async fn list_quiz_completions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<QuizCompletion>>, AppError> {
    ensure_user(&state, id)?;

    let mut completions: Vec<QuizCompletion> = state
        .quiz_completions
        .iter()
        .filter(|entry| entry.key().0 == id)
        .map(|entry| entry.value().clone())
        .collect();
    completions.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));

    Ok(Json(completions))
}
