//! Session lifecycle coverage: schema reset, close semantics, the global
//! context flag, and loud initialization failure.

use chrono::{TimeZone, Utc};
use rowmap::{
    ColumnDef, ColumnType, EntityDef, MappingSession, PgCoordinates, Record, SessionConfig,
    SessionError, Value,
};

use crate::pg::PgFixture;

fn user_entity() -> EntityDef {
    EntityDef::new("user")
        .column(ColumnDef::primary("id", ColumnType::Serial))
        .column(ColumnDef::new("birthday", ColumnType::Timestamptz))
}

fn user_config(fixture: &PgFixture) -> SessionConfig {
    SessionConfig::new(fixture.coordinates()).entity(user_entity())
}

/// Refresh is create-or-reset: rows written before a refresh are gone after.
#[tokio::test(flavor = "multi_thread")]
async fn test_schema_refresh_resets_rows() {
    let fixture = PgFixture::start().await;

    let session = MappingSession::init(user_config(&fixture))
        .await
        .expect("Failed to initialize mapping session");
    session
        .schema()
        .refresh()
        .await
        .expect("Failed to refresh schema");

    let birthday = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();
    let mut uow = session.fork();
    uow.create("user", Record::new().set("birthday", birthday))
        .expect("Failed to stage record");
    uow.flush().await.expect("Failed to flush record");
    assert_eq!(uow.find_all("user").await.unwrap().len(), 1);

    session
        .schema()
        .refresh()
        .await
        .expect("Failed to refresh schema a second time");
    assert_eq!(uow.find_all("user").await.unwrap().len(), 0);

    session.close(false).await.expect("Failed to close session");
    fixture.stop().await;
}

/// close(false) flushes records still staged in the global context; a
/// second session against the same database sees them.
#[tokio::test(flavor = "multi_thread")]
async fn test_close_flushes_pending_records() {
    let fixture = PgFixture::start().await;

    let config = user_config(&fixture).allow_global_context(true);
    let session = MappingSession::init(config)
        .await
        .expect("Failed to initialize mapping session");
    session
        .schema()
        .refresh()
        .await
        .expect("Failed to refresh schema");

    let birthday = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();
    {
        let mut context = session
            .context()
            .await
            .expect("Global context should be enabled");
        context
            .create("user", Record::new().set("birthday", birthday))
            .expect("Failed to stage record");
        assert_eq!(context.pending(), 1);
    }
    session.close(false).await.expect("Failed to close session");

    let session = MappingSession::init(user_config(&fixture))
        .await
        .expect("Failed to reinitialize mapping session");
    let rows = session.fork().find_all("user").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("birthday"), Some(&Value::Timestamptz(birthday)));
    session.close(false).await.expect("Failed to close session");

    fixture.stop().await;
}

/// close(true) discards staged records instead of flushing them.
#[tokio::test(flavor = "multi_thread")]
async fn test_forced_close_discards_pending_records() {
    let fixture = PgFixture::start().await;

    let config = user_config(&fixture).allow_global_context(true);
    let session = MappingSession::init(config)
        .await
        .expect("Failed to initialize mapping session");
    session
        .schema()
        .refresh()
        .await
        .expect("Failed to refresh schema");

    let birthday = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();
    {
        let mut context = session
            .context()
            .await
            .expect("Global context should be enabled");
        context
            .create("user", Record::new().set("birthday", birthday))
            .expect("Failed to stage record");
        assert_eq!(context.pending(), 1);
    }
    session.close(true).await.expect("Failed to close session");

    let session = MappingSession::init(user_config(&fixture))
        .await
        .expect("Failed to reinitialize mapping session");
    assert_eq!(session.fork().find_all("user").await.unwrap().len(), 0);
    session.close(false).await.expect("Failed to close session");

    fixture.stop().await;
}

/// The shared context is opt-in; forked units of work are always available.
#[tokio::test(flavor = "multi_thread")]
async fn test_global_context_requires_opt_in() {
    let fixture = PgFixture::start().await;

    let session = MappingSession::init(user_config(&fixture))
        .await
        .expect("Failed to initialize mapping session");

    assert!(matches!(
        session.context().await,
        Err(SessionError::GlobalContextDisabled)
    ));

    let uow = session.fork();
    assert_eq!(uow.pending(), 0);

    session.close(false).await.expect("Failed to close session");
    fixture.stop().await;
}

/// An unreachable database fails init immediately, with no retry.
#[tokio::test(flavor = "multi_thread")]
async fn test_init_fails_loudly_when_unreachable() {
    let fixture = PgFixture::start().await;
    let coordinates = PgCoordinates::new(
        fixture.host(),
        fixture.port(),
        fixture.database(),
        fixture.user(),
        fixture.password(),
    );
    fixture.stop().await;

    // The container is gone, so nothing listens on the mapped port anymore.
    let result = MappingSession::init(SessionConfig::new(coordinates).entity(user_entity())).await;
    assert!(matches!(result, Err(SessionError::Connection(_))));
}
