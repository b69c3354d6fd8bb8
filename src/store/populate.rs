// src/store/populate.rs

//! Reference expansion: turns stored ids into the documents they point at.
//! Each collection is read with one batched `IN (...)` query per call.

use std::collections::{BTreeSet, HashMap};

use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool, sqlite::SqliteRow};

use crate::models::{
    exam::{Exam, ExamView, QuestionName, ResultRef},
    result::{ExamResult, PopulatedResult},
    user::User,
};

const USER_SELECT: &str = "SELECT id, username, email, role, created_at FROM users";

pub(crate) const EXAM_SELECT: &str =
    "SELECT id, name, description, questions, results, created_at, updated_at FROM exams";

const QUESTION_SELECT: &str = "SELECT id, name FROM questions";

/// Runs `select` restricted to rows whose id is in `ids`.
async fn fetch_by_ids<T>(pool: &SqlitePool, select: &str, ids: &[String]) -> Result<Vec<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query_builder = QueryBuilder::<Sqlite>::new(select);
    query_builder.push(" WHERE id IN (");

    let mut separated = query_builder.separated(",");
    for id in ids {
        separated.push_bind(id.as_str());
    }
    separated.push_unseparated(")");

    query_builder.build_query_as::<T>().fetch_all(pool).await
}

fn unique_ids<'a>(ids: impl Iterator<Item = &'a String>) -> Vec<String> {
    ids.cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

pub(crate) async fn fetch_exams(
    pool: &SqlitePool,
    ids: &[String],
) -> Result<HashMap<String, Exam>, sqlx::Error> {
    let exams: Vec<Exam> = fetch_by_ids(pool, EXAM_SELECT, ids).await?;
    Ok(exams.into_iter().map(|exam| (exam.id.clone(), exam)).collect())
}

fn expand_exam(exam: &Exam, questions: &HashMap<String, QuestionName>) -> ExamView {
    ExamView {
        id: exam.id.clone(),
        name: exam.name.clone(),
        description: exam.description.clone(),
        // Ids with no matching question are dropped.
        questions: exam
            .questions
            .iter()
            .filter_map(|id| questions.get(id).cloned())
            .collect(),
        result: exam
            .result
            .iter()
            .map(|id| ResultRef { id: id.clone() })
            .collect(),
        created_at: exam.created_at,
        updated_at: exam.updated_at,
    }
}

/// Expands `author` and `exam` (with the exam's questions and results) for a page.
pub(crate) async fn populate_results(
    pool: &SqlitePool,
    results: Vec<ExamResult>,
) -> Result<Vec<PopulatedResult>, sqlx::Error> {
    let author_ids = unique_ids(results.iter().map(|r| &r.author));
    let exam_ids = unique_ids(results.iter().filter_map(|r| r.exam.as_ref()));

    let users: HashMap<String, User> = fetch_by_ids::<User>(pool, USER_SELECT, &author_ids)
        .await?
        .into_iter()
        .map(|user| (user.id.clone(), user))
        .collect();

    let exams = fetch_exams(pool, &exam_ids).await?;

    let question_ids = unique_ids(exams.values().flat_map(|exam| exam.questions.iter()));
    let questions: HashMap<String, QuestionName> =
        fetch_by_ids::<QuestionName>(pool, QUESTION_SELECT, &question_ids)
            .await?
            .into_iter()
            .map(|question| (question.id.clone(), question))
            .collect();

    tracing::debug!(
        "Populating {} results ({} authors, {} exams, {} questions)",
        results.len(),
        users.len(),
        exams.len(),
        questions.len()
    );

    Ok(results
        .into_iter()
        .map(|result| {
            let author = users.get(&result.author).cloned();
            let exam = result
                .exam
                .as_ref()
                .and_then(|id| exams.get(id))
                .map(|exam| expand_exam(exam, &questions));
            PopulatedResult::new(result, author, exam)
        })
        .collect())
}
