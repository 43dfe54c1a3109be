// Administrative Session
// Scoped holder for the single connection a convergence call may have open

use crate::db::connection::{ConnectionDefaults, ConnectionParams};
use crate::db::traits::{AdminConnection, ConnectionFactory, Result};

/// Per-invocation connection holder.
///
/// At most one handle is open at a time: `open` releases the current handle
/// before connecting again. `release` never fails. Dropping the session drops
/// any handle still held, so an early return cannot leak a connection.
pub struct AdminSession<'a> {
    factory: &'a dyn ConnectionFactory,
    defaults: &'a ConnectionDefaults,
    params: &'a ConnectionParams,
    current: Option<Box<dyn AdminConnection>>,
}

impl<'a> AdminSession<'a> {
    pub fn new(
        factory: &'a dyn ConnectionFactory,
        defaults: &'a ConnectionDefaults,
        params: &'a ConnectionParams,
    ) -> Self {
        Self {
            factory,
            defaults,
            params,
            current: None,
        }
    }

    /// Bootstrap database used for catalog-level commands
    pub fn admin_database(&self) -> &'a str {
        &self.defaults.admin_database
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Connect to `database` (or the record's override), replacing any open handle
    pub async fn open(&mut self, database: &str) -> Result<&mut dyn AdminConnection> {
        self.release().await;

        let target = self.defaults.resolve(self.params, database);
        let conn = self.factory.open(&target).await?;
        Ok(self.current.insert(conn).as_mut())
    }

    /// Close the open handle, if any. Close errors are logged and discarded.
    pub async fn release(&mut self) {
        if let Some(conn) = self.current.take() {
            let database = conn.database().to_string();
            if let Err(e) = conn.close().await {
                tracing::warn!(database = %database, error = %e, "ignoring error while closing connection");
            }
        }
    }
}

impl Drop for AdminSession<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.current.take() {
            tracing::debug!(database = %conn.database(), "dropping connection still held by session");
        }
    }
}
