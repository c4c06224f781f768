//! Raw query path: rows decoded from driver-reported types, no hydration

use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Row, TypeInfo};

use crate::config::DebugOptions;
use crate::entity::quote_ident;
use crate::error::SessionError;
use crate::value::Value;

use super::log_statement;

/// Decode strategies for the PostgreSQL types the raw path knows natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PgType {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Text,
    Bytea,
    Date,
    Timestamp,
    Timestamptz,
    Other,
}

/// Map a driver-reported PostgreSQL type name to a decode strategy.
pub(crate) fn pg_type_from_name(pg_type: &str) -> PgType {
    let type_lower = pg_type.to_lowercase();

    match type_lower.as_str() {
        "bool" | "boolean" => PgType::Bool,
        "int2" | "smallint" => PgType::Int2,
        "int4" | "int" | "integer" => PgType::Int4,
        "int8" | "bigint" => PgType::Int8,
        "float4" | "real" => PgType::Float4,
        "float8" | "double precision" => PgType::Float8,
        "varchar" | "text" | "char" | "bpchar" | "name" => PgType::Text,
        "character varying" | "character" => PgType::Text,
        "bytea" => PgType::Bytea,
        "date" => PgType::Date,
        "timestamp" | "timestamp without time zone" => PgType::Timestamp,
        "timestamptz" | "timestamp with time zone" => PgType::Timestamptz,
        _ => PgType::Other,
    }
}

/// Column metadata exactly as the driver reports it.
#[derive(Debug, Clone)]
pub struct RawColumn {
    pub name: String,
    pub type_name: String,
}

/// One row from the raw path.
///
/// Values are decoded purely from the driver-reported column types; the
/// session's entity declarations are never consulted here.
#[derive(Debug, Clone)]
pub struct RawRow {
    columns: Vec<RawColumn>,
    values: Vec<Value>,
}

impl RawRow {
    pub(crate) fn decode(row: &PgRow) -> Self {
        let mut columns = Vec::with_capacity(row.len());
        let mut values = Vec::with_capacity(row.len());

        for (idx, column) in row.columns().iter().enumerate() {
            let type_name = column.type_info().name().to_string();
            values.push(decode_value(row, idx, pg_type_from_name(&type_name)));
            columns.push(RawColumn {
                name: column.name().to_string(),
                type_name,
            });
        }

        Self { columns, values }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c.name == column)
            .map(|idx| &self.values[idx])
    }

    pub fn columns(&self) -> &[RawColumn] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn decode_value(row: &PgRow, idx: usize, pg_type: PgType) -> Value {
    match pg_type {
        PgType::Bool => match row.try_get::<Option<bool>, _>(idx) {
            Ok(v) => v.map(Value::Bool).unwrap_or(Value::Null),
            Err(_) => fallback_text(row, idx),
        },
        PgType::Int2 => match row.try_get::<Option<i16>, _>(idx) {
            Ok(v) => v.map(Value::SmallInt).unwrap_or(Value::Null),
            Err(_) => fallback_text(row, idx),
        },
        PgType::Int4 => match row.try_get::<Option<i32>, _>(idx) {
            Ok(v) => v.map(Value::Int).unwrap_or(Value::Null),
            Err(_) => fallback_text(row, idx),
        },
        PgType::Int8 => match row.try_get::<Option<i64>, _>(idx) {
            Ok(v) => v.map(Value::BigInt).unwrap_or(Value::Null),
            Err(_) => fallback_text(row, idx),
        },
        PgType::Float4 => match row.try_get::<Option<f32>, _>(idx) {
            Ok(v) => v.map(Value::Real).unwrap_or(Value::Null),
            Err(_) => fallback_text(row, idx),
        },
        PgType::Float8 => match row.try_get::<Option<f64>, _>(idx) {
            Ok(v) => v.map(Value::Double).unwrap_or(Value::Null),
            Err(_) => fallback_text(row, idx),
        },
        PgType::Text => match row.try_get::<Option<String>, _>(idx) {
            Ok(v) => v.map(Value::Text).unwrap_or(Value::Null),
            Err(_) => fallback_text(row, idx),
        },
        PgType::Bytea => match row.try_get::<Option<Vec<u8>>, _>(idx) {
            Ok(v) => v.map(Value::Bytes).unwrap_or(Value::Null),
            Err(_) => fallback_text(row, idx),
        },
        PgType::Date => match row.try_get::<Option<chrono::NaiveDate>, _>(idx) {
            Ok(v) => v.map(Value::Date).unwrap_or(Value::Null),
            Err(_) => fallback_text(row, idx),
        },
        PgType::Timestamp => match row.try_get::<Option<chrono::NaiveDateTime>, _>(idx) {
            Ok(v) => v.map(Value::Timestamp).unwrap_or(Value::Null),
            Err(_) => fallback_text(row, idx),
        },
        PgType::Timestamptz => {
            match row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx) {
                Ok(v) => v.map(Value::Timestamptz).unwrap_or(Value::Null),
                Err(_) => fallback_text(row, idx),
            }
        }
        PgType::Other => fallback_text(row, idx),
    }
}

// Fallback: try to get as string
fn fallback_text(row: &PgRow, idx: usize) -> Value {
    match row.try_get::<Option<String>, _>(idx) {
        Ok(Some(v)) => Value::Text(v),
        _ => Value::Null,
    }
}

/// Raw statement execution against the session's pool.
pub struct RawQuery<'a> {
    pool: &'a PgPool,
    debug: DebugOptions,
}

impl<'a> RawQuery<'a> {
    pub(crate) fn new(pool: &'a PgPool, debug: DebugOptions) -> Self {
        Self { pool, debug }
    }

    /// Select every row of a table, bypassing hydration.
    #[tracing::instrument(name = "raw_select_all", skip(self), fields(rowmap.table = %table))]
    pub async fn select_all(&self, table: &str) -> Result<Vec<RawRow>, SessionError> {
        let sql = format!("SELECT * FROM {}", quote_ident(table));
        self.fetch(&sql).await
    }

    /// Execute arbitrary SQL and decode the result rows by driver-reported
    /// types.
    #[tracing::instrument(name = "raw_fetch", skip(self, sql))]
    pub async fn fetch(&self, sql: &str) -> Result<Vec<RawRow>, SessionError> {
        log_statement(&self.debug, sql, None);

        let rows = sqlx::query(sql).fetch_all(self.pool).await?;
        Ok(rows.iter().map(RawRow::decode).collect())
    }
}
