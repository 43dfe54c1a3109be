//! Idempotent convergence of PostgreSQL databases.
//!
//! Given a [`ResourceDescriptor`] describing a database, [`ConvergenceController`]
//! creates it when absent, drops it when present, or runs a statement inside it,
//! reporting whether anything changed. Every probe and statement uses its own
//! short-lived administrative connection, which is always released.
//!
//! ```rust,ignore
//! use pg_converge::{ConvergenceController, DriverRegistry, ResourceDescriptor};
//!
//! let factory = DriverRegistry::postgres()?;
//! let controller = ConvergenceController::new(factory);
//!
//! let db = ResourceDescriptor::new("app_db").with_owner("app_user").with_encoding("UTF8");
//! let outcome = controller.create(&db).await?;
//! println!("changed: {}", outcome.changed);
//! ```

// Module declarations
pub mod config;
pub mod converge;
pub mod db;
#[cfg(feature = "logging")]
pub mod logging;
pub mod resource;

pub use config::ConvergeConfig;
pub use converge::{ConvergenceController, CurrentState, Outcome};
pub use db::{ConnectionDefaults, ConnectionParams, DatabaseError, DriverRegistry, Result};
pub use resource::{Action, ResourceDescriptor};
