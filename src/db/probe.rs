// Server Probes
// Read-only existence and version checks against the administrative database

use crate::db::session::AdminSession;
use crate::db::statement::{EXISTS_SQL, SERVER_VERSION_NUM_SQL, VERSION_SQL};
use crate::db::traits::{DatabaseError, Result, TextRow};

fn first_cell(rows: &[TextRow]) -> Option<&str> {
    rows.first()?.first()?.as_deref()
}

/// Whether `name` is present in `pg_database`. The connection is released on every path.
pub async fn database_exists(session: &mut AdminSession<'_>, name: &str) -> Result<bool> {
    let admin = session.admin_database();
    tracing::debug!(database = %name, "checking if database exists");

    let result: Result<bool> = async {
        let rows = session.open(admin).await?.query(EXISTS_SQL, &[name]).await?;
        Ok(!rows.is_empty())
    }
    .await;
    session.release().await;

    match &result {
        Ok(true) => tracing::debug!(database = %name, "database exists"),
        Ok(false) => tracing::debug!(database = %name, "database does not exist"),
        Err(e) => tracing::debug!(database = %name, error = %e, "existence check failed"),
    }
    result
}

/// Leading integer of the second field of a `version()` banner.
///
/// `PostgreSQL 8.1.23 on x86_64-...` yields 8.
pub fn parse_version_banner(banner: &str) -> Option<i64> {
    let field = banner.split_whitespace().nth(1)?;
    let digits: String = field.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

async fn version_from_setting(session: &mut AdminSession<'_>, admin: &str) -> Result<i64> {
    let rows = session
        .open(admin)
        .await?
        .query(SERVER_VERSION_NUM_SQL, &[])
        .await?;
    let value = first_cell(&rows).unwrap_or_default();
    value.trim().parse().map_err(|_| {
        DatabaseError::VersionError(format!("unexpected server_version_num value '{}'", value))
    })
}

async fn version_from_banner(session: &mut AdminSession<'_>, admin: &str) -> Result<i64> {
    let rows = session.open(admin).await?.query(VERSION_SQL, &[]).await?;
    let banner = first_cell(&rows).unwrap_or_default();
    parse_version_banner(banner).ok_or_else(|| {
        DatabaseError::VersionError(format!("unexpected version() banner '{}'", banner))
    })
}

/// Server version number.
///
/// Reads `server_version_num`; servers too old to have it fall back to the
/// `version()` banner on a fresh connection. Connection failures are returned
/// as-is, anything else from both strategies becomes `VersionError`.
pub async fn server_version(session: &mut AdminSession<'_>) -> Result<i64> {
    let admin = session.admin_database();

    let result: Result<i64> = async {
        match version_from_setting(session, admin).await {
            Ok(version) => Ok(version),
            Err(e @ DatabaseError::ConnectionFailed(_)) => Err(e),
            Err(primary) => {
                tracing::debug!(error = %primary, "server_version_num unavailable, trying version()");
                version_from_banner(session, admin).await.map_err(|fallback| match fallback {
                    DatabaseError::ConnectionFailed(_) => fallback,
                    other => DatabaseError::VersionError(format!(
                        "server_version_num: {}; version(): {}",
                        primary, other
                    )),
                })
            }
        }
    }
    .await;
    session.release().await;

    if let Ok(version) = &result {
        tracing::debug!(version = *version, "detected server version");
    }
    result
}

/// Whether the server's version number is strictly greater than `threshold`
pub async fn version_greater_than(session: &mut AdminSession<'_>, threshold: i64) -> Result<bool> {
    Ok(server_version(session).await? > threshold)
}
