use figment::{Figment, providers::Env};
use serde::Deserialize;
use std::sync::LazyLock;

/// Runtime configuration, sourced from the process environment.
///
/// Managed-database mode requires all four of `INSTANCE_CONNECTION_NAME`,
/// `DB_USER`, `DB_PASS`, `DB_NAME`; anything less selects the local
/// single-file engine at `DATABASE_URL`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub instance_connection_name: Option<String>,
    pub db_user: Option<String>,
    pub db_pass: Option<String>,
    pub db_name: Option<String>,
    /// Presence (non-empty) selects the instance's private network path.
    pub private_ip: Option<String>,
    pub secret_key: String,
    pub database_url: String,
    /// Pool checkout timeout in seconds; a stuck connection attempt blocks
    /// the request until this elapses.
    pub acquire_timeout_secs: u64,
    pub bind: String,
    pub loglevel: String,
    pub seed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            instance_connection_name: None,
            db_user: None,
            db_pass: None,
            db_name: None,
            private_ip: None,
            secret_key: "fallback-dev-key".to_string(),
            database_url: "sqlite://contacts.db?mode=rwc".to_string(),
            acquire_timeout_secs: 30,
            bind: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            seed: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, figment::Error> {
        Figment::new().merge(Env::raw()).extract()
    }

    /// The four managed-database values, iff all of them are set.
    pub fn managed(&self) -> Option<ManagedConfig<'_>> {
        Some(ManagedConfig {
            instance_connection_name: self.instance_connection_name.as_deref()?,
            db_user: self.db_user.as_deref()?,
            db_pass: self.db_pass.as_deref()?,
            db_name: self.db_name.as_deref()?,
        })
    }

    pub fn private_ip(&self) -> bool {
        self.private_ip.as_deref().is_some_and(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ManagedConfig<'a> {
    pub instance_connection_name: &'a str,
    pub db_user: &'a str,
    pub db_pass: &'a str,
    pub db_name: &'a str,
}

pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().unwrap_or_else(|e| {
        eprintln!("invalid environment configuration ({e}), using defaults");
        Config::default()
    })
});
