//! Mapping-session runtime
//!
//! [`MappingSession`] owns the connection pool and entity registry. Units of
//! work stage records and flush them transactionally; [`RawQuery`] executes
//! statements with no hydration at all, reporting rows exactly as the driver
//! types them.

mod raw;
mod schema;
mod unit_of_work;

pub use raw::{RawColumn, RawQuery, RawRow};
pub use schema::SchemaManager;
pub use unit_of_work::UnitOfWork;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::config::{DebugOptions, SessionConfig};
use crate::entity::EntityRegistry;
use crate::error::SessionError;
use crate::value::Value;

/// A live mapping session.
///
/// Created by [`MappingSession::init`], which consumes a
/// [`SessionConfig`]; consumed by [`MappingSession::close`].
pub struct MappingSession {
    pool: PgPool,
    registry: Arc<EntityRegistry>,
    debug: DebugOptions,
    global: Option<Mutex<UnitOfWork>>,
}

impl MappingSession {
    /// Validate the configuration, build the entity registry, and connect.
    ///
    /// Exactly one connection attempt is made; an unreachable database
    /// surfaces immediately as [`SessionError::Connection`].
    #[tracing::instrument(
        name = "session_init",
        skip(config),
        fields(rowmap.database = %config.database.redacted_url())
    )]
    pub async fn init(config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;

        let debug = config.debug_options();
        let registry = Arc::new(EntityRegistry::new(config.entities)?);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database.url())
            .await
            .map_err(|e| SessionError::Connection(e.to_string()))?;

        let global = config.allow_global_context.then(|| {
            Mutex::new(UnitOfWork::new(
                pool.clone(),
                Arc::clone(&registry),
                debug,
            ))
        });

        tracing::info!(
            rowmap.database = %config.database.redacted_url(),
            rowmap.entities = registry.len(),
            "mapping session initialized"
        );

        Ok(Self {
            pool,
            registry,
            debug,
            global,
        })
    }

    /// Schema operations for the declared entities.
    pub fn schema(&self) -> SchemaManager<'_> {
        SchemaManager::new(&self.pool, &self.registry, self.debug)
    }

    /// The shared global unit of work.
    ///
    /// Available only when the session was configured with
    /// [`SessionConfig::allow_global_context`]; every caller sees the same
    /// staging buffer, serialized by the returned guard.
    pub async fn context(&self) -> Result<MutexGuard<'_, UnitOfWork>, SessionError> {
        match &self.global {
            Some(context) => Ok(context.lock().await),
            None => Err(SessionError::GlobalContextDisabled),
        }
    }

    /// Fork an independent unit of work with its own staging buffer.
    pub fn fork(&self) -> UnitOfWork {
        UnitOfWork::new(self.pool.clone(), Arc::clone(&self.registry), self.debug)
    }

    /// Raw statement execution, bypassing entity hydration.
    pub fn raw(&self) -> RawQuery<'_> {
        RawQuery::new(&self.pool, self.debug)
    }

    /// The validated entity declarations this session manages.
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Close the session and release every pooled connection.
    ///
    /// Records still staged in the global context are flushed first; with
    /// `force` they are discarded instead. Forked units of work keep a
    /// handle to the pool but fail on first use once it is closed.
    #[tracing::instrument(name = "session_close", skip(self), fields(rowmap.force = force))]
    pub async fn close(self, force: bool) -> Result<(), SessionError> {
        if let Some(context) = self.global {
            let mut uow = context.into_inner();
            if force {
                let discarded = uow.pending();
                if discarded > 0 {
                    tracing::warn!(
                        rowmap.discarded = discarded,
                        "discarding staged records on forced close"
                    );
                }
                uow.clear();
            } else {
                uow.flush().await?;
            }
        }

        self.pool.close().await;
        tracing::info!("mapping session closed");
        Ok(())
    }
}

pub(crate) fn log_statement(debug: &DebugOptions, sql: &str, params: Option<&[(String, Value)]>) {
    if !(debug.query || debug.query_params) {
        return;
    }

    match params {
        Some(values) if debug.query_params => {
            let rendered = values
                .iter()
                .map(|(_, value)| value.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::debug!(rowmap.sql = %sql, rowmap.params = %rendered, "executing statement");
        }
        _ => tracing::debug!(rowmap.sql = %sql, "executing statement"),
    }
}
