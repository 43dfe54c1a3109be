// Statement Builder
// Renders the administrative SQL for a desired database state. Pure, no I/O.
//
// Values are wrapped in quotes but embedded quote characters are not escaped.

use crate::resource::ResourceDescriptor;

/// Catalog lookup used by the existence probe; the name is bound as `$1`
pub const EXISTS_SQL: &str = "SELECT datname FROM pg_database WHERE datname = $1";

/// Numeric version indicator (8.2 and later)
pub const SERVER_VERSION_NUM_SQL: &str = "SHOW server_version_num";

/// Generic version banner, e.g. `PostgreSQL 8.1.23 on x86_64-...`
pub const VERSION_SQL: &str = "SELECT version()";

const DEFAULT_ENCODING: &str = "DEFAULT";

/// `CREATE DATABASE` with a clause for every supplied field.
///
/// Clause order: template, encoding, tablespace, collation, connection limit, owner.
pub fn build_create(descriptor: &ResourceDescriptor) -> String {
    let mut sql = format!("CREATE DATABASE \"{}\"", descriptor.database_name);

    if let Some(template) = &descriptor.template {
        sql.push_str(&format!(" TEMPLATE = {}", template));
    }
    if let Some(encoding) = &descriptor.encoding {
        if encoding == DEFAULT_ENCODING {
            sql.push_str(" ENCODING = DEFAULT");
        } else {
            sql.push_str(&format!(" ENCODING = '{}'", encoding));
        }
    }
    if let Some(tablespace) = &descriptor.tablespace {
        sql.push_str(&format!(" TABLESPACE = {}", tablespace));
    }
    if let Some(collation) = &descriptor.collation {
        sql.push_str(&format!(
            " LC_CTYPE = '{}' LC_COLLATE = '{}'",
            collation, collation
        ));
    }
    if let Some(limit) = descriptor.connection_limit {
        sql.push_str(&format!(" CONNECTION LIMIT = {}", limit));
    }
    if let Some(owner) = &descriptor.owner {
        sql.push_str(&format!(" OWNER = \"{}\"", owner));
    }

    sql
}

pub fn build_drop(descriptor: &ResourceDescriptor) -> String {
    format!("DROP DATABASE \"{}\"", descriptor.database_name)
}
