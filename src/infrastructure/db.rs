use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options.sqlx_logging(false);
    // Every pooled connection to `sqlite::memory:` is its own database
    if database_url.contains(":memory:") {
        options.max_connections(1);
    }

    let db = Database::connect(options).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        sql.to_owned(),
    ))
    .await?;
    Ok(())
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Every table holds one JSON document per row; `id` mirrors the
    // document's own "id" field
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS loan (
            id TEXT PRIMARY KEY NOT NULL,
            jsonb TEXT NOT NULL,
            created_date TEXT NOT NULL
        )
        "#,
    )
    .await?;

    // At most one open loan per item. The name is what conflict
    // classification keys on, keep it in sync with domain::conflict
    execute(
        db,
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS loan_itemid_idx_unique
        ON loan (json_extract(jsonb, '$.itemId'))
        WHERE json_extract(jsonb, '$.status.name') = 'Open'
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE INDEX IF NOT EXISTS loan_userid_idx
        ON loan (json_extract(jsonb, '$.userId'))
        "#,
    )
    .await?;

    // Loan history: one snapshot per insert/update of a loan
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS audit_loan (
            id TEXT PRIMARY KEY NOT NULL,
            jsonb TEXT NOT NULL,
            created_date TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE INDEX IF NOT EXISTS audit_loan_created_date_idx
        ON audit_loan (created_date)
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TRIGGER IF NOT EXISTS audit_loan_after_insert
        AFTER INSERT ON loan
        BEGIN
            INSERT INTO audit_loan (id, jsonb, created_date)
            VALUES (lower(hex(randomblob(16))), NEW.jsonb, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'));
        END
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TRIGGER IF NOT EXISTS audit_loan_after_update
        AFTER UPDATE ON loan
        BEGIN
            INSERT INTO audit_loan (id, jsonb, created_date)
            VALUES (lower(hex(randomblob(16))), NEW.jsonb, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'));
        END
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS request_policy (
            id TEXT PRIMARY KEY NOT NULL,
            jsonb TEXT NOT NULL,
            created_date TEXT NOT NULL
        )
        "#,
    )
    .await?;

    Ok(())
}
