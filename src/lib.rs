pub mod config;
pub mod entity;
pub mod error;
pub mod session;
pub mod telemetry;
pub mod value;

pub use config::{DebugFlag, PgCoordinates, SessionConfig};
pub use entity::{ColumnDef, ColumnType, EntityDef, EntityRegistry};
pub use error::SessionError;
pub use session::{MappingSession, RawColumn, RawQuery, RawRow, SchemaManager, UnitOfWork};
pub use value::{Record, Value};
