// tests/result_store_tests.rs

use exam_results::{
    EmptyPage, ResultStore, StoreError,
    models::result::{NewResult, ResultUpdate},
    utils::object_id::new_id,
};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

/// Opens a fresh in-memory database with migrations applied.
async fn setup() -> ResultStore {
    // A single long-lived connection keeps the in-memory database alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    ResultStore::new(pool)
}

async fn seed_user(pool: &SqlitePool, username: &str, role: &str) -> String {
    let id = new_id();
    sqlx::query("INSERT INTO users (id, username, role) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(username)
        .bind(role)
        .execute(pool)
        .await
        .unwrap();
    id
}

async fn seed_question(pool: &SqlitePool, name: &str) -> String {
    let id = new_id();
    sqlx::query("INSERT INTO questions (id, name) VALUES (?, ?)")
        .bind(&id)
        .bind(name)
        .execute(pool)
        .await
        .unwrap();
    id
}

async fn seed_exam(pool: &SqlitePool, name: &str, question_ids: &[String]) -> String {
    let id = new_id();
    sqlx::query("INSERT INTO exams (id, name, questions) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(name)
        .bind(serde_json::to_string(question_ids).unwrap())
        .execute(pool)
        .await
        .unwrap();
    id
}

fn attempt(point: f64, exam_id: &str, user_id: &str) -> NewResult {
    NewResult {
        point,
        false_arr: vec!["q-wrong".to_string()],
        true_arr: vec!["q-right-1".to_string(), "q-right-2".to_string()],
        exam_id: exam_id.to_string(),
        unfinish_question: vec![],
        user_id: user_id.to_string(),
    }
}

#[tokio::test]
async fn insert_rejects_missing_point_without_writing() {
    let store = setup().await;
    let user = seed_user(store.pool(), "alice", "Student").await;
    let exam = seed_exam(store.pool(), "Rust basics", &[]).await;

    let err = store.insert(attempt(0.0, &exam, &user)).await.unwrap_err();
    assert!(matches!(err, StoreError::ParamsInvalid));

    let err = store.insert(attempt(f64::NAN, &exam, &user)).await.unwrap_err();
    assert!(matches!(err, StoreError::ParamsInvalid));

    assert_eq!(store.get_count().await.unwrap(), 0);
}

#[tokio::test]
async fn insert_rejects_malformed_ids_without_writing() {
    let store = setup().await;
    let user = seed_user(store.pool(), "alice", "Student").await;
    let exam = seed_exam(store.pool(), "Rust basics", &[]).await;

    let err = store.insert(attempt(5.0, "not-an-id", &user)).await.unwrap_err();
    assert!(matches!(err, StoreError::ParamsInvalid));

    let err = store.insert(attempt(5.0, &exam, "")).await.unwrap_err();
    assert!(matches!(err, StoreError::ParamsInvalid));
    assert_eq!(err.to_string(), "params_invalid");

    assert_eq!(store.get_count().await.unwrap(), 0);
}

#[tokio::test]
async fn insert_persists_author_and_links_exam() {
    let store = setup().await;
    let user = seed_user(store.pool(), "alice", "Student").await;
    let exam = seed_exam(store.pool(), "Rust basics", &[]).await;

    let inserted = store.insert(attempt(7.0, &exam, &user)).await.unwrap();
    assert_eq!(inserted.author, user);
    assert_eq!(inserted.exam.as_deref(), Some(exam.as_str()));
    assert!(inserted.user_update.is_none());

    let info = store.get_info(&inserted.id).await.unwrap();
    assert_eq!(info.author, user);
    assert_eq!(info.point, 7.0);
    assert_eq!(info.true_arr.len(), 2);

    let linked_exam = info.exam.expect("exam should be attached");
    assert_eq!(linked_exam.id, exam);
    assert_eq!(linked_exam.result.0, vec![inserted.id.clone()]);
}

#[tokio::test]
async fn insert_against_unknown_exam_still_succeeds() {
    let store = setup().await;
    let user = seed_user(store.pool(), "alice", "Student").await;

    let inserted = store.insert(attempt(3.0, &new_id(), &user)).await.unwrap();
    assert_eq!(store.get_count().await.unwrap(), 1);

    let info = store.get_info(&inserted.id).await.unwrap();
    assert!(info.exam.is_none());
}

#[tokio::test]
async fn count_tracks_inserts() {
    let store = setup().await;
    assert_eq!(store.get_count().await.unwrap(), 0);

    let user = seed_user(store.pool(), "alice", "Student").await;
    let exam = seed_exam(store.pool(), "Rust basics", &[]).await;
    store.insert(attempt(4.0, &exam, &user)).await.unwrap();

    assert_eq!(store.get_count().await.unwrap(), 1);
}

#[tokio::test]
async fn list_returns_newest_first_and_populates_references() {
    let store = setup().await;
    let user = seed_user(store.pool(), "alice", "Student").await;
    let q1 = seed_question(store.pool(), "What is ownership?").await;
    let q2 = seed_question(store.pool(), "What is borrowing?").await;
    let missing_question = new_id();
    let exam = seed_exam(store.pool(), "Rust basics", &[q1.clone(), q2.clone(), missing_question]).await;

    let first = store.insert(attempt(1.0, &exam, &user)).await.unwrap();
    let second = store.insert(attempt(2.0, &exam, &user)).await.unwrap();
    let third = store.insert(attempt(3.0, &exam, &user)).await.unwrap();

    let page = store.get_list(1, 2).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, third.id);
    assert_eq!(page[1].id, second.id);

    let author = page[0].author.as_ref().expect("author should be expanded");
    assert_eq!(author.username, "alice");

    let exam_view = page[0].exam.as_ref().expect("exam should be expanded");
    let names: Vec<&str> = exam_view.questions.iter().map(|q| q.name.as_str()).collect();
    assert_eq!(names, vec!["What is ownership?", "What is borrowing?"]);
    let result_ids: Vec<&str> = exam_view.result.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(result_ids, vec![first.id.as_str(), second.id.as_str(), third.id.as_str()]);

    let rest = store.get_list(2, 2).await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].id, first.id);
}

#[tokio::test]
async fn list_expands_missing_author_to_none() {
    let store = setup().await;
    let exam = seed_exam(store.pool(), "Rust basics", &[]).await;
    let ghost = new_id();

    store.insert(attempt(9.0, &exam, &ghost)).await.unwrap();

    let page = store.get_list(1, 10).await.unwrap();
    assert_eq!(page.len(), 1);
    assert!(page[0].author.is_none());
    assert!(page[0].exam.is_some());
}

#[tokio::test]
async fn empty_pages_say_why() {
    let store = setup().await;

    let err = store.get_list(1, 100).await.unwrap_err();
    assert!(matches!(err, StoreError::EmptyPage(EmptyPage::NoData)));

    let user = seed_user(store.pool(), "alice", "Student").await;
    let exam = seed_exam(store.pool(), "Rust basics", &[]).await;
    store.insert(attempt(5.0, &exam, &user)).await.unwrap();

    let err = store.get_list(2, 100).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::EmptyPage(EmptyPage::OutOfRange { page: 2, total: 1 })
    ));

    let err = store.get_list(0, 100).await.unwrap_err();
    assert!(matches!(err, StoreError::ParamsInvalid));
}

#[tokio::test]
async fn get_info_validates_and_reports_missing() {
    let store = setup().await;

    assert!(matches!(
        store.get_info("garbage").await.unwrap_err(),
        StoreError::ParamsInvalid
    ));

    let err = store.get_info(&new_id()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
    assert_eq!(err.to_string(), "cannot_get_info_data");
}

#[tokio::test]
async fn remove_deletes_but_keeps_exam_back_reference() {
    let store = setup().await;
    let user = seed_user(store.pool(), "alice", "Student").await;
    let exam = seed_exam(store.pool(), "Rust basics", &[]).await;

    let err = store.remove(&new_id()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound("cannot_remove_data")));

    assert!(matches!(
        store.remove("garbage").await.unwrap_err(),
        StoreError::ParamsInvalid
    ));

    let keep = store.insert(attempt(1.0, &exam, &user)).await.unwrap();
    let doomed = store.insert(attempt(2.0, &exam, &user)).await.unwrap();

    let removed = store.remove(&doomed.id).await.unwrap();
    assert_eq!(removed.id, doomed.id);
    assert_eq!(removed.point, 2.0);

    assert!(matches!(
        store.get_info(&doomed.id).await.unwrap_err(),
        StoreError::NotFound(_)
    ));
    assert_eq!(store.get_count().await.unwrap(), 1);

    let info = store.get_info(&keep.id).await.unwrap();
    let back_refs = info.exam.unwrap().result.0;
    assert!(back_refs.contains(&doomed.id));
}

#[tokio::test]
async fn update_replaces_fields_and_keeps_exam() {
    let store = setup().await;
    let user = seed_user(store.pool(), "alice", "Student").await;
    let editor = seed_user(store.pool(), "bob", "HRM").await;
    let exam = seed_exam(store.pool(), "Rust basics", &[]).await;
    let other_exam = seed_exam(store.pool(), "Advanced Rust", &[]).await;

    let inserted = store.insert(attempt(4.0, &exam, &user)).await.unwrap();

    let updated = store
        .update(
            &inserted.id,
            ResultUpdate {
                point: 9.5,
                false_arr: vec![],
                true_arr: vec!["a".to_string(), "b".to_string(), "c".to_string()],
                exam_id: Some(other_exam),
                user_id: editor.clone(),
                unfinish_question: vec!["d".to_string()],
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, inserted.id);
    assert_eq!(updated.point, 9.5);
    assert!(updated.false_arr.is_empty());
    assert_eq!(updated.true_arr.len(), 3);
    assert_eq!(updated.unfinish_question.0, vec!["d".to_string()]);
    assert_eq!(updated.user_update.as_deref(), Some(editor.as_str()));
    assert_eq!(updated.author, user);
    assert_eq!(updated.exam.as_deref(), Some(exam.as_str()));
    assert!(updated.updated_at >= inserted.updated_at);
}

#[tokio::test]
async fn update_validates_and_reports_missing() {
    let store = setup().await;
    let editor = new_id();

    let changes = ResultUpdate {
        point: 1.0,
        false_arr: vec![],
        true_arr: vec![],
        exam_id: None,
        user_id: editor,
        unfinish_question: vec![],
    };

    assert!(matches!(
        store.update("garbage", changes.clone()).await.unwrap_err(),
        StoreError::ParamsInvalid
    ));

    let err = store.update(&new_id(), changes.clone()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound("cannot_update_data")));

    let bad_user = ResultUpdate {
        user_id: "nobody".to_string(),
        ..changes
    };
    assert!(matches!(
        store.update(&new_id(), bad_user).await.unwrap_err(),
        StoreError::ParamsInvalid
    ));
}

#[tokio::test]
async fn search_joins_exams_and_counts_answers() {
    let store = setup().await;
    let user = seed_user(store.pool(), "alice", "Student").await;
    let exam_a = seed_exam(store.pool(), "Rust basics", &[]).await;
    let exam_b = seed_exam(store.pool(), "Advanced Rust", &[]).await;

    let a1 = store.insert(attempt(1.0, &exam_a, &user)).await.unwrap();
    let b1 = store
        .insert(NewResult {
            true_arr: vec![],
            false_arr: vec!["x".to_string(), "y".to_string(), "z".to_string()],
            ..attempt(2.0, &exam_b, &user)
        })
        .await
        .unwrap();
    // Points at an exam document that does not exist; dropped by the join.
    store.insert(attempt(3.0, &new_id(), &user)).await.unwrap();

    let all = store.search_result_all(None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, a1.id);
    assert_eq!(all[0].exam.name, "Rust basics");
    assert_eq!(all[0].counts.true_count, 2);
    assert_eq!(all[0].counts.false_count, 1);
    assert_eq!(all[1].id, b1.id);
    assert_eq!(all[1].counts.true_count, 0);
    assert_eq!(all[1].counts.false_count, 3);

    let only_b = store.search_result_all(Some(&exam_b)).await.unwrap();
    assert_eq!(only_b.len(), 1);
    assert_eq!(only_b[0].id, b1.id);

    // An invalid filter falls back to every result.
    let unfiltered = store.search_result_all(Some("garbage")).await.unwrap();
    assert_eq!(unfiltered.len(), 2);

    let json = serde_json::to_value(&only_b[0]).unwrap();
    assert_eq!(json["trueCount"], 0);
    assert_eq!(json["falseCount"], 3);
    assert_eq!(json["exam"]["_id"], exam_b);
}

#[tokio::test]
async fn insert_rolls_back_when_exam_link_fails() {
    let store = setup().await;
    let user = seed_user(store.pool(), "alice", "Student").await;
    let exam = seed_exam(store.pool(), "Rust basics", &[]).await;

    // The back-reference push cannot append to a non-JSON list.
    sqlx::query("UPDATE exams SET results = 'not json' WHERE id = ?")
        .bind(&exam)
        .execute(store.pool())
        .await
        .unwrap();

    let err = store.insert(attempt(6.0, &exam, &user)).await.unwrap_err();
    assert!(matches!(err, StoreError::Unexpected(_)));

    // The result row was rolled back with the failed push.
    assert_eq!(store.get_count().await.unwrap(), 0);
}

#[tokio::test]
async fn count_reports_store_failures() {
    let store = setup().await;

    sqlx::query("DROP TABLE results")
        .execute(store.pool())
        .await
        .unwrap();

    let err = store.get_count().await.unwrap_err();
    assert!(matches!(err, StoreError::Unexpected(_)));
}
