// src/models/result.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

use crate::{
    models::{
        exam::{Exam, ExamView},
        user::User,
    },
    utils::object_id::validate_object_id,
};

/// Represents the 'results' table: one exam attempt's score and per-question outcomes.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    #[serde(rename = "_id")]
    pub id: String,

    pub point: f64,

    /// Question ids answered correctly, in answer order.
    pub true_arr: Json<Vec<String>>,

    /// Question ids answered incorrectly, in answer order.
    pub false_arr: Json<Vec<String>>,

    /// Question ids left unanswered.
    pub unfinish_question: Json<Vec<String>>,

    /// User id of the candidate.
    pub author: String,

    /// Exam id, when the attempt belongs to an exam.
    pub exam: Option<String>,

    /// User id of whoever last updated the record.
    pub user_update: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Correct/incorrect answer tallies for a single result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerCounts {
    pub true_count: usize,
    pub false_count: usize,
}

impl ExamResult {
    pub fn answer_counts(&self) -> AnswerCounts {
        AnswerCounts {
            true_count: self.true_arr.len(),
            false_count: self.false_arr.len(),
        }
    }
}

/// DTO for recording a new attempt.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewResult {
    /// Zero and NaN are rejected.
    #[serde(default)]
    pub point: f64,
    #[serde(default)]
    pub false_arr: Vec<String>,
    #[serde(default)]
    pub true_arr: Vec<String>,
    #[serde(rename = "examID")]
    #[validate(custom(function = validate_object_id))]
    pub exam_id: String,
    #[serde(default)]
    pub unfinish_question: Vec<String>,
    #[serde(rename = "userID")]
    #[validate(custom(function = validate_object_id))]
    pub user_id: String,
}

/// DTO for replacing the outcome fields of an existing attempt.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResultUpdate {
    #[serde(default)]
    pub point: f64,
    #[serde(default)]
    pub false_arr: Vec<String>,
    #[serde(default)]
    pub true_arr: Vec<String>,
    /// Accepted but never applied: updates keep the stored exam reference.
    #[serde(rename = "examID", default)]
    pub exam_id: Option<String>,
    /// Recorded as `userUpdate`.
    #[serde(rename = "userID")]
    #[validate(custom(function = validate_object_id))]
    pub user_id: String,
    #[serde(default)]
    pub unfinish_question: Vec<String>,
}

/// A result with `author` and `exam` expanded, as returned by list endpoints.
/// References to documents that no longer exist expand to `null`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedResult {
    #[serde(rename = "_id")]
    pub id: String,
    pub point: f64,
    pub true_arr: Vec<String>,
    pub false_arr: Vec<String>,
    pub unfinish_question: Vec<String>,
    pub author: Option<User>,
    pub exam: Option<ExamView>,
    pub user_update: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PopulatedResult {
    pub fn new(result: ExamResult, author: Option<User>, exam: Option<ExamView>) -> Self {
        Self {
            id: result.id,
            point: result.point,
            true_arr: result.true_arr.0,
            false_arr: result.false_arr.0,
            unfinish_question: result.unfinish_question.0,
            author,
            exam,
            user_update: result.user_update,
            created_at: result.created_at,
            updated_at: result.updated_at,
        }
    }
}

/// A single result with only its exam expanded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultWithExam {
    #[serde(rename = "_id")]
    pub id: String,
    pub point: f64,
    pub true_arr: Vec<String>,
    pub false_arr: Vec<String>,
    pub unfinish_question: Vec<String>,
    pub author: String,
    pub exam: Option<Exam>,
    pub user_update: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResultWithExam {
    pub fn new(result: ExamResult, exam: Option<Exam>) -> Self {
        Self {
            id: result.id,
            point: result.point,
            true_arr: result.true_arr.0,
            false_arr: result.false_arr.0,
            unfinish_question: result.unfinish_question.0,
            author: result.author,
            exam,
            user_update: result.user_update,
            created_at: result.created_at,
            updated_at: result.updated_at,
        }
    }
}

/// Aggregated row: a result joined with its exam plus answer tallies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub point: f64,
    pub true_arr: Vec<String>,
    pub false_arr: Vec<String>,
    pub unfinish_question: Vec<String>,
    pub author: String,
    pub exam: Exam,
    pub user_update: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub counts: AnswerCounts,
}

impl ResultSummary {
    pub fn new(result: ExamResult, exam: Exam) -> Self {
        let counts = result.answer_counts();
        Self {
            id: result.id,
            point: result.point,
            true_arr: result.true_arr.0,
            false_arr: result.false_arr.0,
            unfinish_question: result.unfinish_question.0,
            author: result.author,
            exam,
            user_update: result.user_update,
            created_at: result.created_at,
            updated_at: result.updated_at,
            counts,
        }
    }
}
