//! Runtime configuration.
//!
//! Built once at startup and handed to the components that need it.

use thiserror::Error;

use crate::auth::password::{DEFAULT_BCRYPT_COST, MAX_BCRYPT_COST, MIN_BCRYPT_COST};

/// Default SQLite database location.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://resa.db";

/// Default size of the connection pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("bcrypt cost must be between {min} and {max}, got {0}", min = MIN_BCRYPT_COST, max = MAX_BCRYPT_COST)]
    BcryptCostOutOfRange(u32),
}

/// Configuration for the Resa core.
#[derive(Clone, Debug)]
pub struct ResaConfig {
    /// SQLite connection URL (e.g. "sqlite://resa.db").
    pub database_url: String,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// bcrypt work factor for every password hash.
    pub bcrypt_cost: u32,
}

impl Default for ResaConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

impl ResaConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable               | Default             |
    /// |------------------------|---------------------|
    /// | `DATABASE_URL`         | `sqlite://resa.db`  |
    /// | `RESA_MAX_CONNECTIONS` | `5`                 |
    /// | `RESA_BCRYPT_COST`     | `12`                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build and validate the configuration from `var`, which maps a variable
    /// name to its value. Callers with their own overrides (command-line
    /// flags) layer them into `var` so validation sees the final values.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            database_url: var("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: parse_var(&var, "RESA_MAX_CONNECTIONS")?
                .unwrap_or(defaults.max_connections),
            bcrypt_cost: parse_var(&var, "RESA_BCRYPT_COST")?.unwrap_or(defaults.bcrypt_cost),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the rest of the crate cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            return Err(ConfigError::BcryptCostOutOfRange(self.bcrypt_cost));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_connections",
                value: "0".into(),
            });
        }
        Ok(())
    }
}

fn parse_var<F>(var: &F, key: &'static str) -> Result<Option<u32>, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    match var(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ResaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bcrypt_cost, DEFAULT_BCRYPT_COST);
    }

    #[test]
    fn bcrypt_cost_below_minimum_is_rejected() {
        let config = ResaConfig {
            bcrypt_cost: 3,
            ..ResaConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BcryptCostOutOfRange(3))
        ));
    }

    #[test]
    fn zero_connections_is_rejected() {
        let config = ResaConfig {
            max_connections: 0,
            ..ResaConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key: "max_connections", .. })
        ));
    }

    #[test]
    fn bcrypt_cost_bounds_are_inclusive() {
        for cost in [MIN_BCRYPT_COST, MAX_BCRYPT_COST] {
            let config = ResaConfig {
                bcrypt_cost: cost,
                ..ResaConfig::default()
            };
            assert!(config.validate().is_ok(), "cost {cost}");
        }
        let config = ResaConfig {
            bcrypt_cost: MAX_BCRYPT_COST + 1,
            ..ResaConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn vars_fill_in_over_defaults() {
        let config = ResaConfig::from_vars(|key| match key {
            "DATABASE_URL" => Some("sqlite::memory:".into()),
            "RESA_BCRYPT_COST" => Some(" 4 ".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!("sqlite::memory:", config.database_url);
        assert_eq!(4, config.bcrypt_cost);
        assert_eq!(DEFAULT_MAX_CONNECTIONS, config.max_connections);
    }

    #[test]
    fn unparsable_var_is_rejected() {
        let err = ResaConfig::from_vars(|key| {
            (key == "RESA_MAX_CONNECTIONS").then(|| "many".to_string())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "RESA_MAX_CONNECTIONS", .. }
        ));
    }
}
