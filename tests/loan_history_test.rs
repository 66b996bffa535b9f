use circulation_storage::db;
use circulation_storage::infrastructure::SeaOrmRecordStore;
use circulation_storage::services::loan_service;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement, Value};
use serde_json::json;

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

// History rows are normally written by triggers; insert them directly to
// control their timestamps
async fn insert_history(db: &DatabaseConnection, row_id: &str, item_id: &str, created: &str) {
    let document = json!({
        "id": "a9d1c4e6-6a8f-4b0a-9e5e-3f1d2c7b8a90",
        "itemId": item_id,
        "userId": "c6b8d0a4-3c4b-4a6e-9a9f-2c1f4d0b7e11",
        "loanDate": "2017-03-01T22:34:11Z",
        "status": { "name": "Open" }
    });

    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "INSERT INTO audit_loan (id, jsonb, created_date) VALUES (?, ?, ?)",
        [
            Value::from(row_id),
            Value::from(document.to_string()),
            Value::from(created),
        ],
    ))
    .await
    .expect("Failed to insert history row");
}

async fn seeded_store() -> SeaOrmRecordStore {
    let db = setup_test_db().await;
    insert_history(&db, "h1", "t1", "2021-01-01T00:00:00.000Z").await;
    insert_history(&db, "h3", "t3", "2021-01-03T00:00:00.000Z").await;
    insert_history(&db, "h2", "t2", "2021-01-02T00:00:00.000Z").await;
    SeaOrmRecordStore::new(db)
}

fn items(loans: &circulation_storage::models::Loans) -> Vec<&str> {
    loans.loans.iter().map(|l| l.item_id.as_str()).collect()
}

#[tokio::test]
async fn test_history_without_query_is_newest_first() {
    let store = seeded_store().await;

    for query in [None, Some(""), Some("   ")] {
        let page = loan_service::list_loan_history(&store, query, 0, 10)
            .await
            .unwrap();
        assert_eq!(items(&page), vec!["t3", "t2", "t1"]);
        assert_eq!(page.total_records, 3);
    }
}

#[tokio::test]
async fn test_history_filter_keeps_newest_first() {
    let store = seeded_store().await;

    let page = loan_service::list_loan_history(&store, Some("itemId<>t2"), 0, 10)
        .await
        .unwrap();
    assert_eq!(items(&page), vec!["t3", "t1"]);
}

#[tokio::test]
async fn test_history_explicit_sort_wins() {
    let store = seeded_store().await;

    let page = loan_service::list_loan_history(
        &store,
        Some("cql.allRecords=1 sortBy itemId/sort.ascending"),
        0,
        10,
    )
    .await
    .unwrap();
    assert_eq!(items(&page), vec!["t1", "t2", "t3"]);
}

#[tokio::test]
async fn test_history_pages_after_ordering() {
    let store = seeded_store().await;

    let page = loan_service::list_loan_history(&store, None, 1, 1)
        .await
        .unwrap();
    assert_eq!(items(&page), vec!["t2"]);
    assert_eq!(page.total_records, 3);
}
