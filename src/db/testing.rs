// In-memory stand-in for a PostgreSQL server, used by unit tests

use crate::db::connection::ResolvedConnection;
use crate::db::statement::{EXISTS_SQL, SERVER_VERSION_NUM_SQL, VERSION_SQL};
use crate::db::traits::{AdminConnection, ConnectionFactory, DatabaseError, Result, TextRow};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct State {
    databases: HashSet<String>,
    statements: Vec<(String, String)>,
    targets: Vec<String>,
    passwords: Vec<Option<String>>,
    opened: usize,
    closed: usize,
    open_now: usize,
    max_open: usize,
    fail_connect: bool,
    fail_exists: bool,
    fail_close: bool,
    fail_execute: Option<String>,
    version_num: Option<String>,
    version_banner: Option<String>,
}

#[derive(Clone, Default)]
pub struct FakeServer {
    state: Arc<Mutex<State>>,
}

impl FakeServer {
    pub fn new() -> Self {
        let server = Self::default();
        server.with_state(|s| {
            s.databases.insert("template1".to_string());
            s.version_num = Some("150004".to_string());
            s.version_banner = Some("PostgreSQL 15.4 on x86_64-pc-linux-gnu".to_string());
        });
        server
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    pub fn add_database(&self, name: &str) {
        self.with_state(|s| s.databases.insert(name.to_string()));
    }

    pub fn has_database(&self, name: &str) -> bool {
        self.with_state(|s| s.databases.contains(name))
    }

    pub fn fail_connect(&self) {
        self.with_state(|s| s.fail_connect = true);
    }

    pub fn fail_exists(&self) {
        self.with_state(|s| s.fail_exists = true);
    }

    pub fn fail_close(&self) {
        self.with_state(|s| s.fail_close = true);
    }

    pub fn fail_execute(&self, message: &str) {
        self.with_state(|s| s.fail_execute = Some(message.to_string()));
    }

    /// `None` makes `SHOW server_version_num` fail like a pre-8.2 server
    pub fn set_version_num(&self, value: Option<&str>) {
        self.with_state(|s| s.version_num = value.map(str::to_string));
    }

    pub fn set_version_banner(&self, value: Option<&str>) {
        self.with_state(|s| s.version_banner = value.map(str::to_string));
    }

    /// `(database, sql)` for every statement run through `execute`
    pub fn statements(&self) -> Vec<(String, String)> {
        self.with_state(|s| s.statements.clone())
    }

    /// Database named in every successful connect, in order
    pub fn targets(&self) -> Vec<String> {
        self.with_state(|s| s.targets.clone())
    }

    /// Password presented on every successful connect
    pub fn passwords(&self) -> Vec<Option<String>> {
        self.with_state(|s| s.passwords.clone())
    }

    pub fn opened(&self) -> usize {
        self.with_state(|s| s.opened)
    }

    pub fn closed(&self) -> usize {
        self.with_state(|s| s.closed)
    }

    pub fn open_connections(&self) -> usize {
        self.with_state(|s| s.open_now)
    }

    pub fn max_concurrent(&self) -> usize {
        self.with_state(|s| s.max_open)
    }
}

#[async_trait::async_trait]
impl ConnectionFactory for FakeServer {
    fn driver_name(&self) -> &'static str {
        "fake"
    }

    async fn open(&self, target: &ResolvedConnection) -> Result<Box<dyn AdminConnection>> {
        self.with_state(|s| {
            if s.fail_connect {
                return Err(DatabaseError::ConnectionFailed(format!(
                    "connection to {} refused",
                    target
                )));
            }
            s.opened += 1;
            s.open_now += 1;
            s.max_open = s.max_open.max(s.open_now);
            s.targets.push(target.database.clone());
            s.passwords.push(target.password.clone());
            Ok(())
        })?;

        Ok(Box::new(FakeConnection {
            database: target.database.clone(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct FakeConnection {
    database: String,
    state: Arc<Mutex<State>>,
}

fn quoted_name(sql: &str, prefix: &str) -> Option<String> {
    let rest = sql.strip_prefix(prefix)?;
    rest.split('"').next().map(str::to_string)
}

#[async_trait::async_trait]
impl AdminConnection for FakeConnection {
    fn database(&self) -> &str {
        &self.database
    }

    async fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<TextRow>> {
        let s = self.state.lock().unwrap();
        match sql {
            EXISTS_SQL if s.fail_exists => Err(DatabaseError::QueryError(
                "42501: permission denied for table pg_database".to_string(),
            )),
            EXISTS_SQL => Ok(params
                .first()
                .filter(|name| s.databases.contains(**name))
                .map(|name| vec![vec![Some(name.to_string())]])
                .unwrap_or_default()),
            SERVER_VERSION_NUM_SQL => match &s.version_num {
                Some(v) => Ok(vec![vec![Some(v.clone())]]),
                None => Err(DatabaseError::QueryError(
                    "42704: unrecognized configuration parameter \"server_version_num\"".to_string(),
                )),
            },
            VERSION_SQL => match &s.version_banner {
                Some(v) => Ok(vec![vec![Some(v.clone())]]),
                None => Err(DatabaseError::QueryError("42883: function version() does not exist".to_string())),
            },
            other => Err(DatabaseError::QueryError(format!("42601: unsupported query {}", other))),
        }
    }

    async fn execute(&mut self, sql: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        if let Some(message) = &s.fail_execute {
            return Err(DatabaseError::QueryError(message.clone()));
        }

        if let Some(name) = quoted_name(sql, "CREATE DATABASE \"") {
            if !s.databases.insert(name.clone()) {
                return Err(DatabaseError::QueryError(format!(
                    "42P04: database \"{}\" already exists",
                    name
                )));
            }
        } else if let Some(name) = quoted_name(sql, "DROP DATABASE \"") {
            if !s.databases.remove(&name) {
                return Err(DatabaseError::QueryError(format!(
                    "3D000: database \"{}\" does not exist",
                    name
                )));
            }
        }

        s.statements.push((self.database.clone(), sql.to_string()));
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        if self.state.lock().unwrap().fail_close {
            return Err(DatabaseError::ConnectionFailed("server closed the connection unexpectedly".to_string()));
        }
        Ok(())
    }
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        if let Ok(mut s) = self.state.lock() {
            s.closed += 1;
            s.open_now -= 1;
        }
    }
}
