use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`. Never sent back to clients.
    #[serde(skip_serializing)]
    pub correct_answer: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub points_reward: u32,
    pub questions: Vec<QuizQuestion>,
    pub created_at: DateTime<Utc>,
}

/// One per profile and quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizCompletion {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub score: u32,
    pub total_questions: u32,
    pub points_earned: u32,
    pub completed_at: DateTime<Utc>,
}
