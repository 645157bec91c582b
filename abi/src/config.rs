use std::fs;

use serde::{Deserialize, Serialize};

use crate::{EmployeeId, Error};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub booking: BookingPolicy,
    #[serde(default)]
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    #[serde(default = "default_pool_size")]
    pub max_connections: u32,
}

fn default_pool_size() -> u32 {
    5
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// run the embedded migrations before accepting requests
    #[serde(default)]
    pub migrate: bool,
}

/// who a booking is attributed to when the caller has no profile of that kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPolicy {
    #[serde(default = "default_client_email")]
    pub default_client_email: String,
    #[serde(default)]
    pub default_employee_id: Option<EmployeeId>,
}

fn default_client_email() -> String {
    "guest@hotel.local".to_string()
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            default_client_email: default_client_email(),
            default_employee_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_notify_enabled")]
    pub enabled: bool,
    #[serde(default = "default_notify_from")]
    pub from: String,
    #[serde(default = "default_notify_timeout")]
    pub timeout_ms: u64,
}

fn default_notify_enabled() -> bool {
    true
}

fn default_notify_from() -> String {
    "reservations@hotel.local".to_string()
}

fn default_notify_timeout() -> u64 {
    2000
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: default_notify_enabled(),
            from: default_notify_from(),
            timeout_ms: default_notify_timeout(),
        }
    }
}

impl Config {
    pub fn load(filename: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let config = fs::read_to_string(filename.as_ref()).map_err(|_| Error::ConfigReadError)?;
        serde_yaml::from_str(&config).map_err(|_| Error::ConfigParseError)
    }
}

impl DbConfig {
    pub fn url(&self) -> String {
        format!("{}/{}", self.server_url(), self.dbname)
    }

    pub fn server_url(&self) -> String {
        if self.password.is_empty() {
            format!("postgres://{}@{}:{}", self.user, self.host, self.port)
        } else {
            format!(
                "postgres://{}:{}@{}:{}",
                self.user, self.password, self.host, self.port
            )
        }
    }
}

impl ServerConfig {
    pub fn url(&self, https: bool) -> String {
        if https {
            format!("https://{}:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_should_be_loaded() {
        let config = Config::load("../service/fixtures/config.yml").unwrap();
        assert_eq!(
            config,
            Config {
                db: DbConfig {
                    host: "localhost".to_string(),
                    port: 5432,
                    user: "postgres".to_string(),
                    password: "postgres".to_string(),
                    dbname: "hotel".to_string(),
                    max_connections: 5,
                },
                server: ServerConfig {
                    host: "0.0.0.0".to_string(),
                    port: 8080,
                    migrate: true,
                },
                booking: BookingPolicy {
                    default_client_email: "guest@hotel.local".to_string(),
                    default_employee_id: Some(1),
                },
                notify: NotifyConfig::default(),
            }
        );
    }

    #[test]
    fn missing_sections_should_use_defaults() {
        let config: Config = serde_yaml::from_str(
            "db: {host: db, port: 5432, user: app, password: '', dbname: hotel}\nserver: {host: localhost, port: 3000}\n",
        )
        .unwrap();
        assert_eq!(config.db.max_connections, 5);
        assert!(!config.server.migrate);
        assert_eq!(config.booking, BookingPolicy::default());
        assert_eq!(config.notify.timeout_ms, 2000);
    }

    #[test]
    fn db_url_should_omit_empty_password() {
        let db = DbConfig {
            host: "db".to_string(),
            port: 5433,
            user: "app".to_string(),
            password: "".to_string(),
            dbname: "hotel".to_string(),
            max_connections: 5,
        };
        assert_eq!(db.url(), "postgres://app@db:5433/hotel");
        let db = DbConfig {
            password: "secret".to_string(),
            ..db
        };
        assert_eq!(db.server_url(), "postgres://app:secret@db:5433");
    }

    #[test]
    fn unknown_file_should_fail_to_read() {
        assert_eq!(
            Config::load("./no/such/hotel.yml").unwrap_err(),
            Error::ConfigReadError
        );
    }
}
