use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number};
use sqlx::postgres::PgRow;
use sqlx::{Column, Connection, Executor, PgConnection, Row, TypeInfo};

use invochat_core::Value;

use crate::error::SqlError;
use crate::guard::check_read_only;
use crate::rewrite::rewrite_similarity;

/// Field-ordered result set with decimal and date values already stringified,
/// so the whole structure is lossless JSON.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

/// Runs guarded, rewritten queries against the relational store.
///
/// One connection per call: open, execute, close, regardless of outcome. No
/// connection or transaction ever spans more than a single tool invocation.
#[derive(Clone, Debug)]
pub struct QueryExecutor {
    database_url: String,
}

impl QueryExecutor {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// Validates, rewrites, and executes a single SELECT.
    pub async fn run(&self, sql: &str) -> Result<QueryOutput, SqlError> {
        check_read_only(sql)?;
        let rewritten = rewrite_similarity(sql);
        tracing::debug!(query = %rewritten, "executing rewritten query");

        let mut conn = PgConnection::connect(&self.database_url).await?;
        let outcome = fetch_normalized(&mut conn, &rewritten).await;
        if let Err(error) = conn.close().await {
            tracing::warn!(error = %error, "closing database connection failed");
        }
        outcome
    }
}

async fn fetch_normalized(
    conn: &mut PgConnection,
    rewritten: &str,
) -> Result<QueryOutput, SqlError> {
    let rows: Vec<PgRow> = sqlx::query(rewritten).fetch_all(&mut *conn).await?;

    let columns = match rows.first() {
        Some(row) => row
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect(),
        // Column order still matters for exports of empty result sets.
        None => conn
            .describe(rewritten)
            .await?
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect(),
    };

    let mut normalized = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut object = Map::new();
        for (index, column) in row.columns().iter().enumerate() {
            object.insert(column.name().to_string(), decode_value(row, index)?);
        }
        normalized.push(object);
    }

    Ok(QueryOutput {
        columns,
        rows: normalized,
    })
}

/// Decodes one cell into JSON, normalizing NUMERIC to a canonical decimal
/// string and temporal types to ISO-8601 strings.
fn decode_value(row: &PgRow, index: usize) -> Result<Value, SqlError> {
    let type_name = row.columns()[index].type_info().name().to_string();
    let value = match type_name.as_str() {
        "BOOL" => row.try_get::<Option<bool>, _>(index)?.map(Value::from),
        "INT2" => row.try_get::<Option<i16>, _>(index)?.map(Value::from),
        "INT4" => row.try_get::<Option<i32>, _>(index)?.map(Value::from),
        "INT8" => row.try_get::<Option<i64>, _>(index)?.map(Value::from),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(index)?
            .and_then(|v| Number::from_f64(f64::from(v)))
            .map(Value::Number),
        "FLOAT8" => row
            .try_get::<Option<f64>, _>(index)?
            .and_then(Number::from_f64)
            .map(Value::Number),
        "NUMERIC" => row
            .try_get::<Option<Decimal>, _>(index)?
            .map(|v| Value::String(v.to_string())),
        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(index)?
            .map(|v| Value::String(v.format("%Y-%m-%d").to_string())),
        "TIME" => row
            .try_get::<Option<NaiveTime>, _>(index)?
            .map(|v| Value::String(v.format("%H:%M:%S%.f").to_string())),
        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(index)?
            .map(|v| Value::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(index)?
            .map(|v| Value::String(v.to_rfc3339())),
        "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => {
            row.try_get::<Option<String>, _>(index)?.map(Value::String)
        }
        other => match row.try_get::<Option<String>, _>(index) {
            Ok(value) => value.map(Value::String),
            Err(error) => {
                tracing::warn!(
                    column_type = other,
                    error = %error,
                    "unsupported column type; emitting null"
                );
                None
            }
        },
    };
    Ok(value.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::SqlGuardError;

    // Guarding happens before any connection is opened, so rejection needs
    // no database.
    #[tokio::test]
    async fn rejected_statements_never_reach_the_database() {
        let executor = QueryExecutor::new("postgres://unreachable.invalid/db");

        let error = executor.run("UPDATE Invoices SET a = 1").await.unwrap_err();
        assert!(matches!(
            error,
            SqlError::Guard(SqlGuardError::NotASelect)
        ));

        let error = executor.run("SELECT 1; DROP TABLE X").await.unwrap_err();
        assert!(matches!(
            error,
            SqlError::Guard(SqlGuardError::MultipleStatements)
        ));
    }
}
