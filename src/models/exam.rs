// src/models/exam.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

/// Represents the 'exams' table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: Option<String>,

    /// Question ids making up the exam.
    pub questions: Json<Vec<String>>,

    /// Ids of results submitted against this exam.
    /// Appended on insert, never pruned on delete.
    #[sqlx(rename = "results")]
    pub result: Json<Vec<String>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Question projected down to its name.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionName {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

/// Back-reference entry. Results carry no name, so only the id survives projection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultRef {
    #[serde(rename = "_id")]
    pub id: String,
}

/// An exam with its questions and result back-references expanded for listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub questions: Vec<QuestionName>,
    pub result: Vec<ResultRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
