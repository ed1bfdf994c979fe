//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("{0} must be set when USE_PERSISTENT_STORES is enabled")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// Use PostgreSQL instead of the in-memory store.
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    /// Seed a demo company with one account per role.
    pub seed_demo_data: bool,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = raw_addr.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: raw_addr.clone(),
        })?;

        let use_persistent_stores = flag(&lookup, "USE_PERSISTENT_STORES")?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if use_persistent_stores && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(Self {
            bind_addr,
            use_persistent_stores,
            database_url,
            seed_demo_data: flag(&lookup, "SEED_DEMO_DATA")?,
        })
    }

    /// In-memory store, no demo data, ephemeral port.
    pub fn for_tests() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            use_persistent_stores: false,
            database_url: None,
            seed_demo_data: false,
        }
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<bool, ConfigError> {
    match lookup(name) {
        None => Ok(false),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(ConfigError::Invalid { name, value: raw }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_to_in_memory_on_port_8080() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert!(!cfg.use_persistent_stores);
        assert!(!cfg.seed_demo_data);
    }

    #[test]
    fn persistent_stores_need_a_database_url() {
        assert_eq!(
            config(&[("USE_PERSISTENT_STORES", "true")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        );

        let cfg = config(&[
            ("USE_PERSISTENT_STORES", "1"),
            ("DATABASE_URL", "postgres://localhost/tracker"),
        ])
        .unwrap();
        assert!(cfg.use_persistent_stores);
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(
            config(&[("BIND_ADDR", "nowhere")]),
            Err(ConfigError::Invalid { name: "BIND_ADDR", .. })
        ));
        assert!(matches!(
            config(&[("SEED_DEMO_DATA", "maybe")]),
            Err(ConfigError::Invalid { name: "SEED_DEMO_DATA", .. })
        ));
    }
}
