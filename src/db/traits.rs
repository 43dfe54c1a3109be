// Administrative Connection Traits
// Defines the seam between the convergence logic and the wire-protocol client

use crate::db::connection::ResolvedConnection;

/// Common database error type
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query execution error: {0}")]
    QueryError(String),

    #[error("Unable to determine server version: {0}")]
    VersionError(String),

    #[error("Missing dependency: {dependency}. {remedy}")]
    MissingDependency {
        dependency: &'static str,
        remedy: &'static str,
    },

    #[error("Configuration error: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

/// One result row in text form; `None` is SQL NULL
pub type TextRow = Vec<Option<String>>;

/// A live administrative session against one database.
///
/// Handles are owned by a single convergence call and are never shared.
/// `close` consumes the handle so a released connection cannot be reused.
#[async_trait::async_trait]
pub trait AdminConnection: Send {
    /// Database this session is attached to
    fn database(&self) -> &str;

    /// Run a row-returning statement. Parameters are bound as text.
    async fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<TextRow>>;

    /// Run one or more statements that return no rows
    async fn execute(&mut self, sql: &str) -> Result<()>;

    /// Terminate the session
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Opens administrative connections. No pooling: every call is a new session.
#[async_trait::async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Driver name for diagnostics
    fn driver_name(&self) -> &'static str;

    /// Open a new session; the caller owns closing it
    async fn open(&self, target: &ResolvedConnection) -> Result<Box<dyn AdminConnection>>;
}
