// PostgreSQL Driver
// Implements ConnectionFactory for PostgreSQL using tokio-postgres

use crate::db::connection::ResolvedConnection;
use crate::db::traits::{AdminConnection, ConnectionFactory, DatabaseError, Result, TextRow};
use tokio::task::JoinHandle;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Config, NoTls, SimpleQueryMessage};

/// Render a tokio-postgres error, keeping the server's SQLSTATE and message
fn describe(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => format!("{}: {}", db.code().code(), db.message()),
        None => err.to_string(),
    }
}

fn query_error(err: tokio_postgres::Error) -> DatabaseError {
    DatabaseError::QueryError(describe(&err))
}

/// PostgreSQL administrative session
pub struct PostgresConnection {
    database: String,
    client: Client,
    /// Drives the socket; finishes once the client is dropped
    task: JoinHandle<std::result::Result<(), tokio_postgres::Error>>,
}

#[async_trait::async_trait]
impl AdminConnection for PostgresConnection {
    fn database(&self) -> &str {
        &self.database
    }

    async fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<TextRow>> {
        if params.is_empty() {
            let messages = self.client.simple_query(sql).await.map_err(query_error)?;
            let rows = messages
                .into_iter()
                .filter_map(|message| match message {
                    SimpleQueryMessage::Row(row) => {
                        Some((0..row.len()).map(|i| row.get(i).map(str::to_string)).collect())
                    }
                    _ => None,
                })
                .collect();
            return Ok(rows);
        }

        let bound: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        let rows = self.client.query(sql, &bound).await.map_err(query_error)?;

        rows.iter()
            .map(|row| {
                (0..row.len())
                    .map(|i| row.try_get::<_, Option<String>>(i))
                    .collect::<std::result::Result<TextRow, _>>()
                    .map_err(query_error)
            })
            .collect()
    }

    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.client.batch_execute(sql).await.map_err(query_error)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let PostgresConnection { client, task, .. } = *self;
        drop(client);

        match task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(DatabaseError::ConnectionFailed(describe(&e))),
            Err(e) => Err(DatabaseError::ConnectionFailed(format!(
                "connection task did not finish cleanly: {}",
                e
            ))),
        }
    }
}

/// PostgreSQL driver implementation
pub struct PostgresDriver;

impl PostgresDriver {
    /// Create a new PostgreSQL driver
    pub fn new() -> Self {
        Self
    }

    /// Build a tokio-postgres Config from a resolved target
    fn to_pg_config(target: &ResolvedConnection) -> Config {
        let mut config = Config::new();
        config
            .host(&target.host)
            .port(target.port)
            .user(&target.username)
            .dbname(&target.database);

        if let Some(password) = &target.password {
            config.password(password);
        }

        config
    }
}

impl Default for PostgresDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ConnectionFactory for PostgresDriver {
    fn driver_name(&self) -> &'static str {
        "PostgreSQL"
    }

    async fn open(&self, target: &ResolvedConnection) -> Result<Box<dyn AdminConnection>> {
        tracing::debug!(
            database = %target.database,
            host = %target.host,
            port = target.port,
            user = %target.username,
            "connecting"
        );

        let (client, connection) = Self::to_pg_config(target)
            .connect(NoTls)
            .await
            .map_err(|e| {
                DatabaseError::ConnectionFailed(format!(
                    "PostgreSQL connection to {} failed: {}",
                    target,
                    describe(&e)
                ))
            })?;

        let task = tokio::spawn(connection);

        Ok(Box::new(PostgresConnection {
            database: target.database.clone(),
            client,
            task,
        }))
    }
}
