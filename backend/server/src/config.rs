use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{Context, Result, ensure};
use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub database_path: PathBuf,
    pub cors_origin: String,
    pub pool_size: u32,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| {
            env::var(key)
                .map_err(|_| {
                    warn!("Environment variable {key} not found, using default");
                })
                .ok()
        })
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_path: String = try_load(&lookup, "DATABASE_PATH", "./tempo.db")?;
        let pool_size: u32 = try_load(&lookup, "DATABASE_POOL_SIZE", "8")?;
        ensure!(pool_size > 0, "Invalid DATABASE_POOL_SIZE value: must be at least 1");

        Ok(Self {
            port: try_load(&lookup, "TEMPO_PORT", "3000")?,
            database_path: PathBuf::from(
                database_path
                    .strip_prefix("file:")
                    .unwrap_or(database_path.as_str()),
            ),
            cors_origin: try_load(&lookup, "CORS_ORIGIN", "http://localhost:8081")?,
            pool_size,
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T>
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Invalid {key} value: {raw}"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.database_path, PathBuf::from("./tempo.db"));
        assert_eq!(config.cors_origin, "http://localhost:8081");
        assert_eq!(config.pool_size, 8);
    }

    #[test]
    fn test_overrides_and_file_prefix() {
        let config = Config::from_lookup(lookup(&[
            ("TEMPO_PORT", "8080"),
            ("DATABASE_PATH", "file:/data/tempo.db"),
            ("CORS_ORIGIN", "https://tempo.app"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, PathBuf::from("/data/tempo.db"));
        assert_eq!(config.cors_origin, "https://tempo.app");
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let result = Config::from_lookup(lookup(&[("TEMPO_PORT", "eighty")]));

        assert!(result.is_err());
        assert!(format!("{:#}", result.err().unwrap()).contains("TEMPO_PORT"));
    }

    #[test]
    fn test_empty_pool_is_an_error() {
        let result = Config::from_lookup(lookup(&[("DATABASE_POOL_SIZE", "0")]));

        assert!(format!("{:#}", result.err().unwrap()).contains("DATABASE_POOL_SIZE"));
    }
}
