// src/store/result.rs

use chrono::Utc;
use sqlx::{SqlitePool, types::Json};
use validator::Validate;

use super::{EmptyPage, StoreError, StoreResult, db_err, populate};
use crate::{
    models::{
        exam::Exam,
        result::{ExamResult, NewResult, PopulatedResult, ResultSummary, ResultUpdate, ResultWithExam},
    },
    utils::object_id,
};

const RESULT_COLUMNS: &str = "id, point, true_arr, false_arr, unfinish_question, author, exam, user_update, created_at, updated_at";

/// Facade over the 'results' collection.
///
/// Cheap to clone: holds only the pool handle, which is injected at construction.
#[derive(Clone)]
pub struct ResultStore {
    pool: SqlitePool,
}

/// Mirrors loose truthiness of a score: zero and NaN count as "no score".
fn has_point(point: f64) -> bool {
    point != 0.0 && !point.is_nan()
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl ResultStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Records a new attempt and appends its id to the exam's result list.
    ///
    /// Both writes share one transaction: either the result exists and the exam
    /// references it, or neither happened. An exam id that matches no document is
    /// not an error; the push simply updates nothing.
    pub async fn insert(&self, new: NewResult) -> StoreResult<ExamResult> {
        if !has_point(new.point) || new.validate().is_err() {
            return Err(StoreError::ParamsInvalid);
        }
        let exam_id = object_id::normalize(&new.exam_id).ok_or(StoreError::ParamsInvalid)?;
        let author = object_id::normalize(&new.user_id).ok_or(StoreError::ParamsInvalid)?;

        let now = Utc::now();
        let result = ExamResult {
            id: object_id::new_id(),
            point: new.point,
            true_arr: Json(new.true_arr),
            false_arr: Json(new.false_arr),
            unfinish_question: Json(new.unfinish_question),
            author,
            exam: Some(exam_id),
            user_update: None,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await.map_err(db_err("begin insert"))?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO results
            (id, point, true_arr, false_arr, unfinish_question, author, exam, user_update, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&result.id)
        .bind(result.point)
        .bind(&result.true_arr)
        .bind(&result.false_arr)
        .bind(&result.unfinish_question)
        .bind(&result.author)
        .bind(&result.exam)
        .bind(&result.user_update)
        .bind(result.created_at)
        .bind(result.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err("insert result"))?;

        if inserted.rows_affected() == 0 {
            return Err(StoreError::WriteFailed("cannot_insert_point"));
        }

        let pushed = sqlx::query(
            r#"
            UPDATE exams
            SET results = json_insert(results, '$[#]', ?), updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&result.id)
        .bind(now)
        .bind(&result.exam)
        .execute(&mut *tx)
        .await
        .map_err(db_err("link result to exam"))?;

        tx.commit().await.map_err(db_err("commit insert"))?;

        if pushed.rows_affected() == 0 {
            tracing::warn!(
                "Result {} references exam {:?} which does not exist",
                result.id,
                result.exam
            );
        }
        tracing::info!("Inserted result {} for author {}", result.id, result.author);

        Ok(result)
    }

    /// Lists results newest first, with author and exam expanded.
    ///
    /// `page` is 1-based. An empty page is reported as `EmptyPage`, telling apart an
    /// empty collection from a page past the end.
    pub async fn get_list(&self, page: u64, page_size: u64) -> StoreResult<Vec<PopulatedResult>> {
        if page == 0 || page_size == 0 {
            return Err(StoreError::ParamsInvalid);
        }
        let offset = (page - 1).saturating_mul(page_size);

        let sql = format!(
            "SELECT {} FROM results ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
            RESULT_COLUMNS
        );
        let results: Vec<ExamResult> = sqlx::query_as(&sql)
            .bind(to_i64(page_size))
            .bind(to_i64(offset))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list results"))?;

        if results.is_empty() {
            let total = self.get_count().await?;
            let reason = if total == 0 {
                EmptyPage::NoData
            } else {
                EmptyPage::OutOfRange { page, total }
            };
            return Err(StoreError::EmptyPage(reason));
        }

        populate::populate_results(&self.pool, results)
            .await
            .map_err(db_err("populate results"))
    }

    /// Fetches one result with its exam attached. The exam is not expanded further.
    pub async fn get_info(&self, result_id: &str) -> StoreResult<ResultWithExam> {
        let id = object_id::normalize(result_id).ok_or(StoreError::ParamsInvalid)?;

        let result = self
            .find_by_id(&id)
            .await?
            .ok_or(StoreError::NotFound("cannot_get_info_data"))?;

        let exam = match result.exam.as_deref() {
            Some(exam_id) => {
                let sql = format!("{} WHERE id = ?", populate::EXAM_SELECT);
                sqlx::query_as::<_, Exam>(&sql)
                    .bind(exam_id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(db_err("fetch exam"))?
            }
            None => None,
        };

        Ok(ResultWithExam::new(result, exam))
    }

    /// Hard-deletes a result and returns what was removed.
    /// The owning exam keeps its reference to the deleted id.
    pub async fn remove(&self, result_id: &str) -> StoreResult<ExamResult> {
        let id = object_id::normalize(result_id).ok_or(StoreError::ParamsInvalid)?;

        let sql = format!("DELETE FROM results WHERE id = ? RETURNING {}", RESULT_COLUMNS);
        let removed = sqlx::query_as::<_, ExamResult>(&sql)
            .bind(&id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("remove result"))?
            .ok_or(StoreError::NotFound("cannot_remove_data"))?;

        tracing::info!("Removed result {}", removed.id);
        Ok(removed)
    }

    /// Replaces the outcome fields of a result and records who changed it.
    ///
    /// The stored exam reference is left as is, even when `changes.exam_id` is set.
    pub async fn update(&self, result_id: &str, changes: ResultUpdate) -> StoreResult<ExamResult> {
        let id = object_id::normalize(result_id).ok_or(StoreError::ParamsInvalid)?;
        if changes.validate().is_err() {
            return Err(StoreError::ParamsInvalid);
        }
        let user_update = object_id::normalize(&changes.user_id).ok_or(StoreError::ParamsInvalid)?;

        if let Some(exam_id) = &changes.exam_id {
            tracing::debug!("Ignoring exam {} on update of result {}", exam_id, id);
        }

        let sql = format!(
            r#"
            UPDATE results
            SET point = ?, false_arr = ?, true_arr = ?, unfinish_question = ?,
                user_update = ?, updated_at = ?
            WHERE id = ?
            RETURNING {}
            "#,
            RESULT_COLUMNS
        );
        let updated = sqlx::query_as::<_, ExamResult>(&sql)
            .bind(changes.point)
            .bind(Json(&changes.false_arr))
            .bind(Json(&changes.true_arr))
            .bind(Json(&changes.unfinish_question))
            .bind(&user_update)
            .bind(Utc::now())
            .bind(&id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("update result"))?
            .ok_or(StoreError::NotFound("cannot_update_data"))?;

        tracing::info!("Updated result {} by {}", updated.id, user_update);
        Ok(updated)
    }

    /// Results joined with their exam, each tagged with correct/incorrect tallies.
    ///
    /// Restricted to `exam_id` when it is a valid id; otherwise covers every result.
    /// Results without an existing exam are left out.
    pub async fn search_result_all(&self, exam_id: Option<&str>) -> StoreResult<Vec<ResultSummary>> {
        let filter = exam_id.and_then(object_id::normalize);

        let sql = format!(
            "SELECT {} FROM results WHERE (? IS NULL OR exam = ?) ORDER BY rowid",
            RESULT_COLUMNS
        );
        let results: Vec<ExamResult> = sqlx::query_as(&sql)
            .bind(&filter)
            .bind(&filter)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("search results"))?;

        let exam_ids: Vec<String> = results
            .iter()
            .filter_map(|r| r.exam.clone())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        let exams = populate::fetch_exams(&self.pool, &exam_ids)
            .await
            .map_err(db_err("join exams"))?;

        Ok(results
            .into_iter()
            .filter_map(|result| {
                let exam = result.exam.as_ref().and_then(|id| exams.get(id)).cloned()?;
                Some(ResultSummary::new(result, exam))
            })
            .collect())
    }

    /// Total number of stored results.
    pub async fn get_count(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM results")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("count results"))?;

        Ok(count.max(0) as u64)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<ExamResult>> {
        let sql = format!("SELECT {} FROM results WHERE id = ?", RESULT_COLUMNS);
        sqlx::query_as::<_, ExamResult>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("fetch result"))
    }
}
