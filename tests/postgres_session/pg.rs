//! Ephemeral PostgreSQL fixture for integration tests.
//!
//! Each call to [`PgFixture::start`] creates a fresh, isolated container
//! and resolves its connection coordinates. Tests stop the container
//! explicitly via [`PgFixture::stop`]; if a test panics first, dropping the
//! fixture cleans the container up through testcontainers.

use rowmap::PgCoordinates;
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::testcontainers::{ContainerAsync, ImageExt};

// Explicit credentials rather than the image defaults, so the accessors
// below report plumbing the tests actually depend on.
const DB_NAME: &str = "rowmap_test";
const DB_USER: &str = "rowmap";
const DB_PASSWORD: &str = "rowmap";

/// A disposable PostgreSQL instance plus its resolved coordinates.
pub struct PgFixture {
    container: ContainerAsync<Postgres>,
    host: String,
    port: u16,
}

impl PgFixture {
    /// Start a fresh container and wait until it accepts connections.
    pub async fn start() -> Self {
        let container = Postgres::default()
            .with_db_name(DB_NAME)
            .with_user(DB_USER)
            .with_password(DB_PASSWORD)
            .with_tag("15-alpine")
            .start()
            .await
            .expect("Failed to start postgres container");

        let host = container
            .get_host()
            .await
            .expect("Failed to get container host")
            .to_string();
        let port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("Failed to get mapped postgres port");

        Self {
            container,
            host,
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn database(&self) -> &str {
        DB_NAME
    }

    pub fn user(&self) -> &str {
        DB_USER
    }

    pub fn password(&self) -> &str {
        DB_PASSWORD
    }

    /// Ready-to-use session coordinates for this container.
    pub fn coordinates(&self) -> PgCoordinates {
        PgCoordinates::new(
            self.host(),
            self.port(),
            self.database(),
            self.user(),
            self.password(),
        )
    }

    /// Stop the container.
    pub async fn stop(self) {
        self.container
            .stop()
            .await
            .expect("Failed to stop postgres container");
    }
}
