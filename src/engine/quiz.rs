use chrono::Utc;
use dashmap::mapref::entry::Entry;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::profile::Role;
use crate::models::quiz::{Quiz, QuizCompletion};
use crate::state::AppState;

/// Reward scaled by the share of correct answers, rounded half-up.
pub fn quiz_points(score: u32, total_questions: u32, points_reward: u32) -> u32 {
    if total_questions == 0 {
        return 0;
    }

    let share = f64::from(score.min(total_questions)) / f64::from(total_questions);
    (share * f64::from(points_reward)).round() as u32
}

/// Counts correct answers; `answers[i]` is the option chosen for question `i`.
pub fn score_answers(quiz: &Quiz, answers: &[usize]) -> Result<u32, AppError> {
    if answers.len() != quiz.questions.len() {
        return Err(AppError::BadRequest(format!(
            "expected {} answers, got {}",
            quiz.questions.len(),
            answers.len()
        )));
    }

    let correct = quiz
        .questions
        .iter()
        .zip(answers)
        .filter(|(question, answer)| question.correct_answer == **answer)
        .count();

    Ok(correct as u32)
}

/// Records a profile's single completion of a quiz and credits its points.
///
/// The profile entry stays held until the completion is stored and the
/// balance credited, so a repeated submission sees the first one.
pub fn complete(
    state: &AppState,
    quiz_id: Uuid,
    user_id: Uuid,
    answers: &[usize],
) -> Result<QuizCompletion, AppError> {
    let quiz = state
        .quizzes
        .get(&quiz_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("quiz {} not found", quiz_id)))?;
    let score = score_answers(&quiz, answers)?;

    let mut profile = state
        .profiles
        .get_mut(&user_id)
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", user_id)))?;

    if profile.role != Role::User {
        return Err(AppError::Forbidden(
            "only users can complete quizzes".to_string(),
        ));
    }

    let total_questions = quiz.questions.len() as u32;
    let completion = match state.quiz_completions.entry((user_id, quiz_id)) {
        Entry::Occupied(_) => {
            return Err(AppError::Conflict(format!(
                "quiz {} already completed",
                quiz_id
            )));
        }
        Entry::Vacant(slot) => {
            let completion = QuizCompletion {
                id: Uuid::new_v4(),
                user_id,
                quiz_id,
                score,
                total_questions,
                points_earned: quiz_points(score, total_questions, quiz.points_reward),
                completed_at: Utc::now(),
            };
            slot.insert(completion.clone());
            completion
        }
    };

    profile.eco_points = profile
        .eco_points
        .saturating_add(u64::from(completion.points_earned));

    info!(
        user_id = %user_id,
        quiz_id = %quiz_id,
        score,
        total_questions,
        points = completion.points_earned,
        "quiz completed"
    );

    Ok(completion)
}
