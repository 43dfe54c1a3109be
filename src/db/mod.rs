// Database Module
// Administrative connections, server probes and statement rendering

pub mod connection;
pub mod drivers;
pub mod probe;
pub mod registry;
pub mod session;
pub mod statement;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{ConnectionDefaults, ConnectionParams, ResolvedConnection};
#[cfg(feature = "postgres")]
pub use drivers::PostgresDriver;
pub use registry::DriverRegistry;
pub use session::AdminSession;
pub use traits::{AdminConnection, ConnectionFactory, DatabaseError, Result, TextRow};
