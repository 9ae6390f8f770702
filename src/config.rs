use anyhow::{anyhow, bail, Context, Result};
use std::{env, fmt::Display, str::FromStr};
use strum::{Display as StrumDisplay, EnumString};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AppEnv {
    Local,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub app_env: AppEnv,
    /// Keys that were missing and fell back to a default, with the value used.
    pub defaulted: Vec<(&'static str, &'static str)>,
}

impl Config {
    /// Reads the process environment. Call after `dotenv` has run.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut vars = Vars { lookup, defaulted: Vec::new() };

        let backend: StorageBackend = vars.load("STORAGE_BACKEND", "postgres")?;
        let database_url = (vars.lookup)("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if backend == StorageBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORAGE_BACKEND=postgres");
        }
        let port = vars.load("PORT", "8080")?;
        let max_connections = vars.load("DATABASE_MAX_CONNECTIONS", "10")?;
        let app_env = vars.load("APP_ENV", "local")?;

        Ok(Self {
            port,
            backend,
            database_url,
            max_connections,
            app_env,
            defaulted: vars.defaulted,
        })
    }

    /// Configuration is read before the subscriber exists, so defaults are
    /// reported once tracing is up.
    pub fn log_defaults(&self) {
        for (key, default) in &self.defaulted {
            info!("{key} not set, using default: {default}");
        }
    }
}

struct Vars<F> {
    lookup: F,
    defaulted: Vec<(&'static str, &'static str)>,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn load<T>(&mut self, key: &'static str, default: &'static str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = match (self.lookup)(key) {
            Some(raw) => raw,
            None => {
                self.defaulted.push((key, default));
                default.to_string()
            }
        };
        raw.trim()
            .parse()
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("Invalid {key} value: {raw:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let config = load(&[("STORAGE_BACKEND", "memory")]).unwrap();
        assert_eq!(config.backend, StorageBackend::Memory);
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.app_env, AppEnv::Local);
    }

    #[test]
    fn postgres_requires_database_url() {
        assert!(load(&[]).is_err());
        let config = load(&[("DATABASE_URL", "postgres://localhost/market"), ("PORT", "3000")])
            .unwrap();
        assert_eq!(config.backend, StorageBackend::Postgres);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn missing_keys_are_recorded_as_defaulted() {
        let config = load(&[("STORAGE_BACKEND", "memory"), ("PORT", "3000")]).unwrap();
        assert_eq!(
            config.defaulted,
            vec![("DATABASE_MAX_CONNECTIONS", "10"), ("APP_ENV", "local")]
        );
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(load(&[("STORAGE_BACKEND", "memory"), ("PORT", "eighty")]).is_err());
        assert!(load(&[("STORAGE_BACKEND", "mongo")]).is_err());
        assert!(load(&[("STORAGE_BACKEND", "memory"), ("APP_ENV", "staging")]).is_err());
    }
}
