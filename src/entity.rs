//! Declarative entity metadata and the DDL generated from it

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::value::Value;

/// Column types the mapping layer knows how to declare, bind, and decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Auto-incrementing 32-bit integer, assigned by the database.
    Serial,
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Real,
    DoublePrecision,
    Text,
    Bytea,
    /// Calendar date, no time component.
    Date,
    /// Timestamp without timezone.
    Timestamp,
    /// Timestamp with timezone, stored and decoded as UTC.
    Timestamptz,
}

impl ColumnType {
    /// SQL type name used in generated DDL.
    pub fn sql(&self) -> &'static str {
        match self {
            ColumnType::Serial => "SERIAL",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::SmallInt => "SMALLINT",
            ColumnType::Integer => "INTEGER",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Real => "REAL",
            ColumnType::DoublePrecision => "DOUBLE PRECISION",
            ColumnType::Text => "TEXT",
            ColumnType::Bytea => "BYTEA",
            ColumnType::Date => "DATE",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Timestamptz => "TIMESTAMPTZ",
        }
    }

    /// Whether a non-null staged value matches this column type.
    ///
    /// Strict by intent: no widening, no date-to-timestamp coercion. The
    /// caller decides separately whether NULL is acceptable.
    pub(crate) fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ColumnType::Serial, Value::Int(_))
                | (ColumnType::Boolean, Value::Bool(_))
                | (ColumnType::SmallInt, Value::SmallInt(_))
                | (ColumnType::Integer, Value::Int(_))
                | (ColumnType::BigInt, Value::BigInt(_))
                | (ColumnType::Real, Value::Real(_))
                | (ColumnType::DoublePrecision, Value::Double(_))
                | (ColumnType::Text, Value::Text(_))
                | (ColumnType::Bytea, Value::Bytes(_))
                | (ColumnType::Date, Value::Date(_))
                | (ColumnType::Timestamp, Value::Timestamp(_))
                | (ColumnType::Timestamptz, Value::Timestamptz(_))
        )
    }
}

/// A single column declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
}

impl ColumnDef {
    /// Declare a NOT NULL column. Use [`ColumnDef::nullable`] to relax.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            primary_key: false,
        }
    }

    /// Declare the primary-key column.
    pub fn primary(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            primary_key: true,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    fn ddl(&self) -> String {
        let mut sql = format!("{} {}", quote_ident(&self.name), self.column_type.sql());
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        } else if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        sql
    }
}

/// A declared record type: table name plus ordered columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDef {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
}

impl EntityDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, def: ColumnDef) -> Self {
        self.columns.push(def);
        self
    }

    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.primary_key)
    }

    pub(crate) fn create_table_sql(&self) -> String {
        let columns: Vec<String> = self.columns.iter().map(ColumnDef::ddl).collect();
        format!(
            "CREATE TABLE {} ({})",
            quote_ident(&self.name),
            columns.join(", ")
        )
    }

    pub(crate) fn drop_table_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {} CASCADE", quote_ident(&self.name))
    }

    fn validate(&self) -> Result<(), SessionError> {
        if self.name.is_empty() {
            return Err(SessionError::Config("entity name must not be empty".into()));
        }
        if self.columns.is_empty() {
            return Err(SessionError::Config(format!(
                "entity '{}' declares no columns",
                self.name
            )));
        }
        for (i, column) in self.columns.iter().enumerate() {
            if column.name.is_empty() {
                return Err(SessionError::Config(format!(
                    "entity '{}' has a column with an empty name",
                    self.name
                )));
            }
            if self.columns[..i].iter().any(|c| c.name == column.name) {
                return Err(SessionError::Config(format!(
                    "entity '{}' declares column '{}' more than once",
                    self.name, column.name
                )));
            }
        }
        if self.columns.iter().filter(|c| c.primary_key).count() > 1 {
            return Err(SessionError::Config(format!(
                "entity '{}' declares more than one primary key",
                self.name
            )));
        }
        Ok(())
    }
}

/// Quote an identifier for safe interpolation into DDL and raw SQL.
pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// All entities declared for a session, validated once at init.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    entities: Vec<EntityDef>,
}

impl EntityRegistry {
    pub(crate) fn new(entities: Vec<EntityDef>) -> Result<Self, SessionError> {
        for (i, entity) in entities.iter().enumerate() {
            entity.validate()?;
            if entities[..i].iter().any(|e| e.name == entity.name) {
                return Err(SessionError::Config(format!(
                    "entity '{}' is declared more than once",
                    entity.name
                )));
            }
        }
        Ok(Self { entities })
    }

    pub fn get(&self, name: &str) -> Option<&EntityDef> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityDef> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
