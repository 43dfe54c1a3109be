// Driver Registry
// Capability check for the wire-protocol client, done once by the caller at startup

use crate::db::traits::{ConnectionFactory, DatabaseError, Result};
use std::sync::Arc;

pub const POSTGRES_DEPENDENCY: &str = "tokio-postgres";
pub const POSTGRES_REMEDY: &str =
    "Build pg-converge with the `postgres` feature (enabled by default) to include the PostgreSQL client.";

/// Hands out connection factories for the clients compiled into this build
pub struct DriverRegistry;

impl DriverRegistry {
    /// Whether the PostgreSQL client is available
    pub fn has_postgres() -> bool {
        cfg!(feature = "postgres")
    }

    /// Fail early, before any connection attempt, if the client is missing
    pub fn check() -> Result<()> {
        if Self::has_postgres() {
            Ok(())
        } else {
            tracing::error!(
                dependency = POSTGRES_DEPENDENCY,
                "PostgreSQL client library is not available"
            );
            Err(DatabaseError::MissingDependency {
                dependency: POSTGRES_DEPENDENCY,
                remedy: POSTGRES_REMEDY,
            })
        }
    }

    /// The PostgreSQL connection factory
    pub fn postgres() -> Result<Arc<dyn ConnectionFactory>> {
        Self::check()?;
        Self::postgres_driver()
    }

    #[cfg(feature = "postgres")]
    fn postgres_driver() -> Result<Arc<dyn ConnectionFactory>> {
        Ok(Arc::new(crate::db::drivers::PostgresDriver::new()))
    }

    #[cfg(not(feature = "postgres"))]
    fn postgres_driver() -> Result<Arc<dyn ConnectionFactory>> {
        Err(DatabaseError::MissingDependency {
            dependency: POSTGRES_DEPENDENCY,
            remedy: POSTGRES_REMEDY,
        })
    }
}
