use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skyisle_core::{IslandRules, IsleError, IsleResult};
use url::Url;

const DEFAULT_CONFIG_NAME: &str = "skyisle.json";
const DEFAULT_DATABASE: &str = "skyisle";

/// Backend selection, tagged by driver name.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "driver", rename_all = "lowercase")]
pub enum DatabaseConfig {
    Sqlite { database: String },
    H2 { database: String },
    Mysql(NetworkConfig),
    Mariadb(NetworkConfig),
    Postgresql(NetworkConfig),
    Sqlserver(NetworkConfig),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    pub database: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub use_ssl: bool,
}

fn default_host() -> String {
    "localhost".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolConfig {
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub connect_timeout_ms: Option<u64>,
    pub acquire_timeout_ms: Option<u64>,
    pub idle_timeout_ms: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IsleConfig {
    pub database: DatabaseConfig,
    pub pool: Option<PoolConfig>,
    #[serde(default)]
    pub rules: IslandRules,
}

impl IsleConfig {
    pub fn default_sqlite(database: impl Into<String>) -> Self {
        Self {
            database: DatabaseConfig::Sqlite {
                database: database.into(),
            },
            pool: None,
            rules: IslandRules::default(),
        }
    }

    pub fn load_or_init(base_dir: &Path) -> IsleResult<Self> {
        fs::create_dir_all(base_dir)
            .map_err(|err| IsleError::configuration(format!("create config dir: {err}")))?;
        let config_path = base_dir.join(DEFAULT_CONFIG_NAME);
        if config_path.exists() {
            let raw = fs::read_to_string(&config_path)
                .map_err(|err| IsleError::configuration(format!("read config: {err}")))?;
            return Self::from_json(&raw);
        }
        let default = IsleConfig::default_sqlite(DEFAULT_DATABASE);
        let payload = serde_json::to_string_pretty(&default)
            .map_err(|err| IsleError::configuration(format!("serialize config: {err}")))?;
        fs::write(&config_path, payload)
            .map_err(|err| IsleError::configuration(format!("write config: {err}")))?;
        Ok(default)
    }

    pub fn from_json(raw: &str) -> IsleResult<Self> {
        serde_json::from_str(raw)
            .map_err(|err| IsleError::configuration(format!("parse config: {err}")))
    }
}

impl DatabaseConfig {
    pub fn driver_name(&self) -> &'static str {
        match self {
            DatabaseConfig::Sqlite { .. } => "sqlite",
            DatabaseConfig::H2 { .. } => "h2",
            DatabaseConfig::Mysql(_) => "mysql",
            DatabaseConfig::Mariadb(_) => "mariadb",
            DatabaseConfig::Postgresql(_) => "postgresql",
            DatabaseConfig::Sqlserver(_) => "sqlserver",
        }
    }

    /// Database file for the embedded backend. The name always ends in
    /// `.db` and relative names live under `base_dir`.
    pub fn sqlite_path(&self, base_dir: &Path) -> IsleResult<PathBuf> {
        match self {
            DatabaseConfig::Sqlite { database } => {
                let file = if database.ends_with(".db") {
                    database.clone()
                } else {
                    format!("{database}.db")
                };
                let candidate = PathBuf::from(file);
                if candidate.is_absolute() {
                    Ok(candidate)
                } else {
                    Ok(base_dir.join(candidate))
                }
            }
            _ => Err(IsleError::configuration("config is not sqlite backend")),
        }
    }

    /// Address string handed to the driver. Fails for drivers the stack
    /// cannot serve.
    pub fn connection_url(&self, base_dir: &Path) -> IsleResult<String> {
        match self {
            DatabaseConfig::Sqlite { .. } => {
                let path = std::path::absolute(self.sqlite_path(base_dir)?).map_err(|err| {
                    IsleError::configuration(format!("cannot resolve sqlite path: {err}"))
                })?;
                let file = Url::from_file_path(&path).map_err(|_| {
                    IsleError::configuration(format!(
                        "sqlite path '{}' cannot be addressed",
                        path.display()
                    ))
                })?;
                Ok(format!("sqlite://{}?mode=rwc", file.path()))
            }
            DatabaseConfig::Mysql(net) | DatabaseConfig::Mariadb(net) => {
                let ssl_mode = if net.use_ssl { "REQUIRED" } else { "DISABLED" };
                network_url("mysql", net, 3306, ("ssl-mode", ssl_mode))
            }
            DatabaseConfig::Postgresql(net) => {
                let ssl_mode = if net.use_ssl { "require" } else { "disable" };
                network_url("postgres", net, 5432, ("sslmode", ssl_mode))
            }
            DatabaseConfig::H2 { .. } | DatabaseConfig::Sqlserver(_) => Err(
                IsleError::configuration(format!("unsupported driver: {}", self.driver_name())),
            ),
        }
    }
}

fn network_url(
    scheme: &str,
    net: &NetworkConfig,
    default_port: u16,
    tls: (&str, &str),
) -> IsleResult<String> {
    let port = net.port.unwrap_or(default_port);
    let mut url = Url::parse(&format!("{scheme}://{}:{port}", net.host))
        .map_err(|err| IsleError::configuration(format!("invalid host '{}': {err}", net.host)))?;
    url.set_path(&format!("/{}", net.database));
    if let Some(username) = &net.username {
        url.set_username(username)
            .map_err(|_| IsleError::configuration("username not accepted for this host"))?;
    }
    if let Some(password) = &net.password {
        url.set_password(Some(password))
            .map_err(|_| IsleError::configuration("password not accepted for this host"))?;
    }
    url.query_pairs_mut().append_pair(tls.0, tls.1);
    Ok(url.to_string())
}
