//! SeaORM implementation of RecordStore
//!
//! Documents live in a `jsonb` TEXT column and are addressed with SQLite's
//! JSON functions.

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, SqlErr, Statement,
    TransactionTrait, Value,
};
use serde_json::Value as JsonValue;

use crate::domain::{
    Comparison, FieldPath, Mutation, Page, Predicate, RecordStore, SortField, SortKey, SortOrder,
    StoreError, StoreFilter, Table, Term,
};

const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

impl From<DbErr> for StoreError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => StoreError::UniqueViolation {
                constraint: violated_constraint(&message),
                message,
            },
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

/// Name of the index a SQLite unique violation refers to.
///
/// Expression indexes are reported as `index 'name'`, plain column indexes as
/// `table.column`.
fn violated_constraint(message: &str) -> String {
    let detail = message
        .rsplit_once("failed:")
        .map(|(_, rest)| rest.trim())
        .unwrap_or(message);

    detail
        .strip_prefix("index '")
        .and_then(|rest| rest.strip_suffix('\''))
        .unwrap_or(detail)
        .to_string()
}

#[derive(Debug, FromQueryResult)]
struct RecordRow {
    jsonb: String,
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    total: i64,
}

/// Accumulates a SQL fragment's bind values in placeholder order.
#[derive(Default)]
struct SqlBuilder {
    values: Vec<Value>,
    subqueries: usize,
}

fn json_field(alias: &str, field: &FieldPath) -> String {
    format!("json_extract({}.jsonb, '$.{}')", alias, field)
}

fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '%' | '_' | '\\' => {
                pattern.push('\\');
                pattern.push(c);
            }
            '*' => pattern.push('%'),
            '?' => pattern.push('_'),
            _ => pattern.push(c),
        }
    }
    pattern
}

fn clamp(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl SqlBuilder {
    fn bind(&mut self, value: impl Into<Value>) -> &'static str {
        self.values.push(value.into());
        "?"
    }

    fn bind_term(&mut self, term: &Term) -> &'static str {
        match term {
            Term::Text(text) => self.bind(text.clone()),
            Term::Integer(integer) => self.bind(*integer),
            Term::Float(float) => self.bind(*float),
        }
    }

    fn predicate(&mut self, predicate: &Predicate, alias: &str) -> String {
        match predicate {
            Predicate::All => "1 = 1".to_string(),
            Predicate::IdEquals(id) => format!("{}.id = {}", alias, self.bind(id.clone())),
            Predicate::Compare { field, op, value } => {
                let column = json_field(alias, field);
                match (op, value) {
                    (Comparison::Matches, Term::Text(text)) => format!(
                        "{} LIKE {} ESCAPE '\\'",
                        column,
                        self.bind(like_pattern(text))
                    ),
                    _ => {
                        let operator = match op {
                            Comparison::Equal | Comparison::Matches => "=",
                            Comparison::NotEqual => "<>",
                            Comparison::LessThan => "<",
                            Comparison::LessOrEqual => "<=",
                            Comparison::GreaterThan => ">",
                            Comparison::GreaterOrEqual => ">=",
                        };
                        format!("{} {} {}", column, operator, self.bind_term(value))
                    }
                }
            }
            Predicate::And(left, right) => {
                let left = self.predicate(left, alias);
                let right = self.predicate(right, alias);
                format!("({} AND {})", left, right)
            }
            Predicate::Or(left, right) => {
                let left = self.predicate(left, alias);
                let right = self.predicate(right, alias);
                format!("({} OR {})", left, right)
            }
            Predicate::Not(inner) => format!("NOT ({})", self.predicate(inner, alias)),
            Predicate::InSelection {
                field,
                table,
                selected,
                filter,
            } => {
                self.subqueries += 1;
                let inner_alias = format!("s{}", self.subqueries);
                let condition = self.predicate(filter, &inner_alias);
                format!(
                    "{} IN (SELECT {} FROM {} {} WHERE {})",
                    json_field(alias, field),
                    json_field(&inner_alias, selected),
                    table.name(),
                    inner_alias,
                    condition
                )
            }
        }
    }

    fn order_by(sort: &[SortKey], alias: &str) -> String {
        if sort.is_empty() {
            return String::new();
        }

        let keys: Vec<String> = sort
            .iter()
            .map(|key| {
                let column = match &key.field {
                    SortField::Document(field) => json_field(alias, field),
                    SortField::CreatedDate => format!("{}.created_date", alias),
                };
                let direction = match key.order {
                    SortOrder::Ascending => "ASC",
                    SortOrder::Descending => "DESC",
                };
                // created_date has millisecond resolution; rowid breaks ties
                // in insertion order
                match key.field {
                    SortField::CreatedDate => {
                        format!("{c} {d}, {a}.rowid {d}", c = column, d = direction, a = alias)
                    }
                    SortField::Document(_) => format!("{} {}", column, direction),
                }
            })
            .collect();

        format!(" ORDER BY {}", keys.join(", "))
    }

    fn statement(self, sql: String) -> Statement {
        Statement::from_sql_and_values(DbBackend::Sqlite, &sql, self.values)
    }
}

fn mutation_statement(mutation: &Mutation) -> Statement {
    match mutation {
        Mutation::RemoveField {
            table,
            field,
            filter,
        } => {
            let mut builder = SqlBuilder::default();
            let condition = builder.predicate(filter, table.name());
            let sql = format!(
                "UPDATE {t} SET jsonb = json_remove(jsonb, '$.{f}') WHERE {c}",
                t = table.name(),
                f = field,
                c = condition
            );
            builder.statement(sql)
        }
    }
}

/// SeaORM-based implementation of RecordStore
pub struct SeaOrmRecordStore {
    db: DatabaseConnection,
}

impl SeaOrmRecordStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn fetch(&self, statement: Statement) -> Result<Vec<JsonValue>, StoreError> {
        let rows = RecordRow::find_by_statement(statement)
            .all(&self.db)
            .await?;

        rows.into_iter()
            .map(|row| serde_json::from_str(&row.jsonb).map_err(StoreError::from))
            .collect()
    }
}

#[async_trait]
impl RecordStore for SeaOrmRecordStore {
    async fn list(
        &self,
        table: Table,
        filter: StoreFilter,
    ) -> Result<Page<JsonValue>, StoreError> {
        let t = table.name();
        let mut builder = SqlBuilder::default();
        let condition = builder.predicate(&filter.predicate, t);
        let count_values = builder.values.clone();

        let sql = format!(
            "SELECT {t}.jsonb FROM {t} WHERE {c}{o} LIMIT {l} OFFSET {of}",
            t = t,
            c = condition,
            o = SqlBuilder::order_by(&filter.sort, t),
            l = builder.bind(clamp(filter.limit)),
            of = builder.bind(clamp(filter.offset)),
        );
        let records = self.fetch(builder.statement(sql)).await?;

        let total_records = if filter.with_total {
            let count_sql = format!("SELECT COUNT(*) AS total FROM {t} WHERE {c}", t = t, c = condition);
            let count = CountRow::find_by_statement(Statement::from_sql_and_values(
                DbBackend::Sqlite,
                &count_sql,
                count_values,
            ))
            .one(&self.db)
            .await?;
            count.map(|row| row.total.max(0) as u64).unwrap_or(0)
        } else {
            records.len() as u64
        };

        Ok(Page {
            records,
            total_records,
        })
    }

    async fn get_by_id(&self, table: Table, id: &str) -> Result<Vec<JsonValue>, StoreError> {
        let mut builder = SqlBuilder::default();
        let sql = format!(
            "SELECT jsonb FROM {} WHERE id = {}",
            table.name(),
            builder.bind(id.to_string())
        );
        self.fetch(builder.statement(sql)).await
    }

    async fn create(&self, table: Table, id: &str, record: JsonValue) -> Result<String, StoreError> {
        let mut builder = SqlBuilder::default();
        let sql = format!(
            "INSERT INTO {} (id, jsonb, created_date) VALUES ({}, {}, {})",
            table.name(),
            builder.bind(id.to_string()),
            builder.bind(record.to_string()),
            NOW
        );
        self.db.execute(builder.statement(sql)).await?;

        tracing::debug!("Created {} record {}", table.name(), id);
        Ok(id.to_string())
    }

    async fn replace(
        &self,
        table: Table,
        record: JsonValue,
        filter: &Predicate,
    ) -> Result<(), StoreError> {
        let mut builder = SqlBuilder::default();
        let document = builder.bind(record.to_string());
        let condition = builder.predicate(filter, table.name());
        let sql = format!(
            "UPDATE {} SET jsonb = {} WHERE {}",
            table.name(),
            document,
            condition
        );
        let result = self.db.execute(builder.statement(sql)).await?;

        tracing::debug!(
            "Replaced {} {} record(s)",
            result.rows_affected(),
            table.name()
        );
        Ok(())
    }

    async fn delete(&self, table: Table, filter: &Predicate) -> Result<(), StoreError> {
        let mut builder = SqlBuilder::default();
        let condition = builder.predicate(filter, table.name());
        let sql = format!("DELETE FROM {} WHERE {}", table.name(), condition);
        self.db.execute(builder.statement(sql)).await?;
        Ok(())
    }

    async fn truncate(&self, table: Table) -> Result<(), StoreError> {
        self.db
            .execute(Statement::from_string(
                DbBackend::Sqlite,
                format!("DELETE FROM {}", table.name()),
            ))
            .await?;
        Ok(())
    }

    async fn mutate(&self, mutations: Vec<Mutation>) -> Result<u64, StoreError> {
        let txn = self.db.begin().await?;
        let mut rows = 0;

        for mutation in &mutations {
            rows += txn.execute(mutation_statement(mutation)).await?.rows_affected();
        }

        txn.commit().await?;
        Ok(rows)
    }
}
