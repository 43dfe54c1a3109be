// Convergence Controller
// Brings one database to its described state: create, drop, or run a query

use crate::db::connection::ConnectionDefaults;
use crate::db::probe;
use crate::db::session::AdminSession;
use crate::db::statement;
use crate::db::traits::{ConnectionFactory, Result};
use crate::resource::{Action, ResourceDescriptor};
use serde::Serialize;
use std::sync::Arc;
use tracing::Instrument;

/// Result of one convergence call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub action: Action,
    pub database: String,
    pub changed: bool,
    /// Statement that was executed, or would have been under dry-run
    pub statement: Option<String>,
    pub dry_run: bool,
}

/// Observed state of the described database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentState {
    pub database_name: String,
    pub exists: bool,
}

pub struct ConvergenceController {
    factory: Arc<dyn ConnectionFactory>,
    defaults: ConnectionDefaults,
    dry_run: bool,
}

impl ConvergenceController {
    pub fn new(factory: Arc<dyn ConnectionFactory>) -> Self {
        Self {
            factory,
            defaults: ConnectionDefaults::default(),
            dry_run: false,
        }
    }

    pub fn with_defaults(mut self, defaults: ConnectionDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Check existence and report what would change, without executing anything
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    fn session<'a>(&'a self, descriptor: &'a ResourceDescriptor) -> AdminSession<'a> {
        AdminSession::new(self.factory.as_ref(), &self.defaults, &descriptor.connection)
    }

    /// Run `action` against `descriptor`
    pub async fn converge(&self, action: Action, descriptor: &ResourceDescriptor) -> Result<Outcome> {
        let span = tracing::debug_span!(
            "converge",
            action = %action,
            database = %descriptor.database_name,
            invocation = %uuid::Uuid::new_v4()
        );

        let result: Result<Outcome> = async {
            descriptor.validate(action)?;
            match action {
                Action::Create => self.run_create(descriptor).await,
                Action::Drop => self.run_drop(descriptor).await,
                Action::Query => self.run_query(descriptor).await,
            }
        }
        .instrument(span)
        .await;
        result
    }

    /// Create the database unless it already exists
    pub async fn create(&self, descriptor: &ResourceDescriptor) -> Result<Outcome> {
        self.converge(Action::Create, descriptor).await
    }

    /// Drop the database if it exists
    pub async fn drop(&self, descriptor: &ResourceDescriptor) -> Result<Outcome> {
        self.converge(Action::Drop, descriptor).await
    }

    /// Run the descriptor's `sql_query` inside the database, if it exists.
    /// A missing database is not an error.
    pub async fn query(&self, descriptor: &ResourceDescriptor) -> Result<Outcome> {
        self.converge(Action::Query, descriptor).await
    }

    pub async fn current_state(&self, descriptor: &ResourceDescriptor) -> Result<CurrentState> {
        descriptor.validate(Action::Create)?;
        let mut session = self.session(descriptor);
        let exists = probe::database_exists(&mut session, &descriptor.database_name).await?;
        Ok(CurrentState {
            database_name: descriptor.database_name.clone(),
            exists,
        })
    }

    /// Version number of the server the descriptor points at
    pub async fn server_version(&self, descriptor: &ResourceDescriptor) -> Result<i64> {
        let mut session = self.session(descriptor);
        probe::server_version(&mut session).await
    }

    pub async fn version_greater_than(
        &self,
        descriptor: &ResourceDescriptor,
        threshold: i64,
    ) -> Result<bool> {
        let mut session = self.session(descriptor);
        probe::version_greater_than(&mut session, threshold).await
    }

    async fn run_create(&self, descriptor: &ResourceDescriptor) -> Result<Outcome> {
        let mut session = self.session(descriptor);
        if probe::database_exists(&mut session, &descriptor.database_name).await? {
            return Ok(self.unchanged(Action::Create, descriptor));
        }

        tracing::debug!("creating database {}", descriptor.database_name);
        let admin = session.admin_database();
        let sql = statement::build_create(descriptor);
        self.apply(&mut session, Action::Create, descriptor, admin, sql).await
    }

    async fn run_drop(&self, descriptor: &ResourceDescriptor) -> Result<Outcome> {
        let mut session = self.session(descriptor);
        if !probe::database_exists(&mut session, &descriptor.database_name).await? {
            return Ok(self.unchanged(Action::Drop, descriptor));
        }

        tracing::debug!("dropping database {}", descriptor.database_name);
        let admin = session.admin_database();
        let sql = statement::build_drop(descriptor);
        self.apply(&mut session, Action::Drop, descriptor, admin, sql).await
    }

    async fn run_query(&self, descriptor: &ResourceDescriptor) -> Result<Outcome> {
        let mut session = self.session(descriptor);
        if !probe::database_exists(&mut session, &descriptor.database_name).await? {
            return Ok(self.unchanged(Action::Query, descriptor));
        }

        // validate() guarantees the query is present
        let sql = descriptor.sql_query.clone().unwrap_or_default();
        self.apply(&mut session, Action::Query, descriptor, &descriptor.database_name, sql)
            .await
    }

    /// Execute `sql` on a fresh connection to `database`, releasing it afterwards
    async fn apply(
        &self,
        session: &mut AdminSession<'_>,
        action: Action,
        descriptor: &ResourceDescriptor,
        database: &str,
        sql: String,
    ) -> Result<Outcome> {
        if self.dry_run {
            tracing::info!(sql = %sql, "dry run, would perform query");
            return Ok(Outcome {
                action,
                database: descriptor.database_name.clone(),
                changed: true,
                statement: Some(sql),
                dry_run: true,
            });
        }

        tracing::debug!(sql = %sql, "performing query");
        let result: Result<()> = async { session.open(database).await?.execute(&sql).await }.await;
        session.release().await;
        result?;

        tracing::info!("{} {} succeeded", action, descriptor);
        Ok(Outcome {
            action,
            database: descriptor.database_name.clone(),
            changed: true,
            statement: Some(sql),
            dry_run: false,
        })
    }

    fn unchanged(&self, action: Action, descriptor: &ResourceDescriptor) -> Outcome {
        tracing::debug!("{} {}: nothing to do", action, descriptor);
        Outcome {
            action,
            database: descriptor.database_name.clone(),
            changed: false,
            statement: None,
            dry_run: self.dry_run,
        }
    }
}
