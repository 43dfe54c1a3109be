use crate::db::connection::{ConnectionDefaults, ADMIN_DATABASE, DEFAULT_HOST};
use anyhow::{anyhow, Result};
use config::Config;
use std::collections::HashMap;
use std::path::Path;

const ENV_PREFIX: &str = "PG_CONVERGE";

/// Settings resolved above the convergence core and handed to it as
/// [`ConnectionDefaults`].
#[derive(Debug, Clone)]
pub struct ConvergeConfig {
    /// Host used when a descriptor's connection record names none
    pub default_host: String,

    /// Password used when a descriptor's connection record carries none
    pub default_password: Option<String>,

    /// Bootstrap database for CREATE/DROP and the probes
    pub admin_database: String,
}

pub const SAMPLE_CONFIG: &str = r#"### pg-converge configuration file

### host used when a resource does not name one
# default_host = "localhost"

### password for the administrative user when a resource does not carry one
# default_password = ""

### bootstrap database for catalog-level commands
# admin_database = "template1"
"#;

impl Default for ConvergeConfig {
    fn default() -> Self {
        Self {
            default_host: DEFAULT_HOST.to_string(),
            default_password: None,
            admin_database: ADMIN_DATABASE.to_string(),
        }
    }
}

impl ConvergeConfig {
    /// Load from an optional TOML file, then `PG_CONVERGE_*` environment variables.
    ///
    /// E.g. `PG_CONVERGE_DEFAULT_PASSWORD=secret` sets the default password.
    pub fn new(path: &Option<String>) -> Result<ConvergeConfig> {
        let mut builder = Config::builder();

        if let Some(p) = path {
            let path = Path::new(p.as_str());
            if !path.exists() {
                return Err(anyhow!("Configuration file {} does not exist", p));
            }
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Ok(Self::from_map(&config))
    }

    fn from_map(config: &HashMap<String, String>) -> ConvergeConfig {
        let non_empty = |key: &str| config.get(key).filter(|v| !v.is_empty()).cloned();

        ConvergeConfig {
            default_host: non_empty("default_host").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            default_password: non_empty("default_password"),
            admin_database: non_empty("admin_database")
                .unwrap_or_else(|| ADMIN_DATABASE.to_string()),
        }
    }

    pub fn connection_defaults(&self) -> ConnectionDefaults {
        ConnectionDefaults {
            host: self.default_host.clone(),
            password: self.default_password.clone(),
            admin_database: self.admin_database.clone(),
        }
    }
}
