//! Schema synchronization: create-or-reset tables from entity metadata

use sqlx::PgPool;

use crate::config::DebugOptions;
use crate::entity::EntityRegistry;
use crate::error::SessionError;

use super::log_statement;

/// Schema operations over the session's declared entities.
///
/// Every failure is surfaced immediately as [`SessionError::Schema`]; there
/// is no retry and no partial-success reporting.
pub struct SchemaManager<'a> {
    pool: &'a PgPool,
    registry: &'a EntityRegistry,
    debug: DebugOptions,
}

impl<'a> SchemaManager<'a> {
    pub(crate) fn new(pool: &'a PgPool, registry: &'a EntityRegistry, debug: DebugOptions) -> Self {
        Self {
            pool,
            registry,
            debug,
        }
    }

    /// Drop and recreate every declared table, leaving the schema exactly
    /// as the entity declarations describe it.
    #[tracing::instrument(name = "schema_refresh", skip(self))]
    pub async fn refresh(&self) -> Result<(), SessionError> {
        self.drop_all().await?;
        self.create_all().await?;

        tracing::info!(rowmap.entities = self.registry.len(), "schema refreshed");
        Ok(())
    }

    /// Create every declared table. Fails if any of them already exists.
    #[tracing::instrument(name = "schema_create_all", skip(self))]
    pub async fn create_all(&self) -> Result<(), SessionError> {
        for entity in self.registry.iter() {
            let sql = entity.create_table_sql();
            log_statement(&self.debug, &sql, None);

            sqlx::query(&sql)
                .execute(self.pool)
                .await
                .map_err(|e| SessionError::Schema(e.to_string()))?;
        }
        Ok(())
    }

    /// Drop every declared table that exists.
    #[tracing::instrument(name = "schema_drop_all", skip(self))]
    pub async fn drop_all(&self) -> Result<(), SessionError> {
        for entity in self.registry.iter() {
            let sql = entity.drop_table_sql();
            log_statement(&self.debug, &sql, None);

            sqlx::query(&sql)
                .execute(self.pool)
                .await
                .map_err(|e| SessionError::Schema(e.to_string()))?;
        }
        Ok(())
    }
}
