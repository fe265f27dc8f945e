use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::engine::quiz;
use crate::error::AppError;
use crate::models::quiz::{Quiz, QuizCompletion, QuizQuestion};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/quizzes", post(create_quiz).get(list_quizzes))
        .route("/quizzes/:id", delete(delete_quiz))
        .route("/quizzes/:id/completions", post(complete_quiz))
}

#[derive(Deserialize)]
pub struct CreateQuizRequest {
    pub title: String,
    pub description: Option<String>,
    pub points_reward: u32,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Deserialize)]
pub struct CompleteQuizRequest {
    pub user_id: Uuid,
    pub answers: Vec<usize>,
}

async fn create_quiz(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<Json<Quiz>, AppError> {
    if payload.title.trim().is_empty() {
        return Err(AppError::BadRequest("title cannot be empty".to_string()));
    }

    if payload.points_reward == 0 {
        return Err(AppError::BadRequest("points_reward must be > 0".to_string()));
    }

    if payload.questions.is_empty() {
        return Err(AppError::BadRequest(
            "a quiz needs at least one question".to_string(),
        ));
    }

    for (index, question) in payload.questions.iter().enumerate() {
        if question.options.len() < 2 {
            return Err(AppError::BadRequest(format!(
                "question {index} needs at least two options"
            )));
        }
        if question.correct_answer >= question.options.len() {
            return Err(AppError::BadRequest(format!(
                "question {index} has no option {}",
                question.correct_answer
            )));
        }
    }

    let quiz = Quiz {
        id: Uuid::new_v4(),
        title: payload.title.trim().to_string(),
        description: payload.description,
        points_reward: payload.points_reward,
        questions: payload.questions,
        created_at: Utc::now(),
    };

    state.quizzes.insert(quiz.id, quiz.clone());
    info!(quiz_id = %quiz.id, questions = quiz.questions.len(), "quiz published");

    Ok(Json(quiz))
}

async fn list_quizzes(State(state): State<Arc<AppState>>) -> Json<Vec<Quiz>> {
    let mut quizzes: Vec<Quiz> = state
        .quizzes
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    quizzes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Json(quizzes)
}

async fn delete_quiz(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .quizzes
        .remove(&id)
        .ok_or_else(|| AppError::NotFound(format!("quiz {} not found", id)))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn complete_quiz(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteQuizRequest>,
) -> Result<Json<QuizCompletion>, AppError> {
    let completion = quiz::complete(&state, id, payload.user_id, &payload.answers)?;
    Ok(Json(completion))
}
