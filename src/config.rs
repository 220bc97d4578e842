use std::collections::HashMap;
use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::application::order_service::Timeouts;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Runtime settings, read from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub kafka_brokers: String,
    pub kafka_topic: String,
    pub timeouts: Timeouts,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| vars.get(name).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL")
            .cloned()
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = match get("PORT") {
            Some(v) => v.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "a valid port number",
                value: v.clone(),
            })?,
            None => 8080,
        };

        Ok(Settings {
            database_url,
            host: get("HOST").cloned().unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            kafka_brokers: get("KAFKA_BROKERS")
                .cloned()
                .unwrap_or_else(|| "localhost:9092".to_string()),
            kafka_topic: get("KAFKA_TOPIC")
                .cloned()
                .unwrap_or_else(|| "inventory-order-items".to_string()),
            timeouts: Timeouts {
                repository: millis(get("REPOSITORY_TIMEOUT_MS"), "REPOSITORY_TIMEOUT_MS")?,
                publish: millis(get("PUBLISH_TIMEOUT_MS"), "PUBLISH_TIMEOUT_MS")?,
            },
        })
    }
}

fn millis(value: Option<&String>, name: &'static str) -> Result<Duration, ConfigError> {
    let Some(value) = value else {
        return Ok(Duration::from_millis(5000));
    };
    match value.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::Invalid {
            name,
            expected: "a positive number of milliseconds",
            value: value.clone(),
        }),
    }
}
