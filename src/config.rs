// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Settings are read from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH0_DOMAIN` | Auth0 tenant domain | Required |
//! | `API_AUDIENCE` | Expected JWT audience claim | Required |
//! | `ALGORITHMS` | Comma-separated signing algorithm allow-list | `RS256` |
//! | `JWKS_URL` | JWKS endpoint override | `https://{AUTH0_DOMAIN}/.well-known/jwks.json` |
//! | `JWKS_CACHE_TTL_SECS` | How long fetched keys are trusted | `300` |
//! | `JWKS_FETCH_TIMEOUT_SECS` | HTTP timeout for JWKS fetches | `10` |
//! | `JWKS_MIN_REFRESH_SECS` | Minimum gap before refetching keys for an unknown `kid`, and back-off after a failed fetch | `30` |
//! | `JWT_LEEWAY_SECS` | Clock skew tolerance for `exp` | `0` |
//! | `DATABASE_PATH` | redb database file | `casting.redb` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use url::Url;

use crate::auth::jwks::{DEFAULT_CACHE_TTL, DEFAULT_FETCH_TIMEOUT, DEFAULT_MIN_REFRESH_INTERVAL};
use crate::auth::AuthConfig;

pub const AUTH0_DOMAIN_ENV: &str = "AUTH0_DOMAIN";
pub const API_AUDIENCE_ENV: &str = "API_AUDIENCE";
pub const ALGORITHMS_ENV: &str = "ALGORITHMS";
pub const JWKS_URL_ENV: &str = "JWKS_URL";
pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECS";
pub const JWKS_FETCH_TIMEOUT_ENV: &str = "JWKS_FETCH_TIMEOUT_SECS";
pub const JWKS_MIN_REFRESH_ENV: &str = "JWKS_MIN_REFRESH_SECS";
pub const JWT_LEEWAY_ENV: &str = "JWT_LEEWAY_SECS";
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_DATABASE_PATH: &str = "casting.redb";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
}

impl ConfigError {
    fn invalid(name: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(ConfigError::invalid(
                LOG_FORMAT_ENV,
                format!("'{other}' is not one of json, pretty"),
            )),
        }
    }
}

/// Server settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub auth0_domain: String,
    pub api_audience: String,
    pub algorithms: Vec<Algorithm>,
    pub jwks_url: Option<Url>,
    pub jwks_cache_ttl: Duration,
    pub jwks_fetch_timeout: Duration,
    pub jwks_min_refresh_interval: Duration,
    pub jwt_leeway: u64,
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through `lookup`, which returns a variable's value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &str| match lookup(name) {
            Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            Some(_) => Err(ConfigError::invalid(name, "must not be empty")),
            None => Err(ConfigError::MissingEnvVar(name.to_string())),
        };
        let seconds = |name: &str, default: u64| match lookup(name) {
            Some(value) => value.trim().parse::<u64>().map_err(|_| {
                ConfigError::invalid(name, format!("'{value}' is not a number of seconds"))
            }),
            None => Ok(default),
        };

        let auth0_domain = required(AUTH0_DOMAIN_ENV)?;
        let api_audience = required(API_AUDIENCE_ENV)?;

        let algorithms = match lookup(ALGORITHMS_ENV) {
            Some(value) => parse_algorithms(&value)?,
            None => vec![Algorithm::RS256],
        };

        let jwks_url = lookup(JWKS_URL_ENV)
            .map(|value| {
                Url::parse(value.trim())
                    .map_err(|e| ConfigError::invalid(JWKS_URL_ENV, e.to_string()))
            })
            .transpose()?;

        let jwks_cache_ttl =
            Duration::from_secs(seconds(JWKS_CACHE_TTL_ENV, DEFAULT_CACHE_TTL.as_secs())?);
        let jwks_fetch_timeout =
            Duration::from_secs(seconds(JWKS_FETCH_TIMEOUT_ENV, DEFAULT_FETCH_TIMEOUT.as_secs())?);
        let jwks_min_refresh_interval = Duration::from_secs(seconds(
            JWKS_MIN_REFRESH_ENV,
            DEFAULT_MIN_REFRESH_INTERVAL.as_secs(),
        )?);
        let jwt_leeway = seconds(JWT_LEEWAY_ENV, 0)?;

        let database_path = lookup(DATABASE_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup(PORT_ENV) {
            Some(value) => value.trim().parse::<u16>().map_err(|_| {
                ConfigError::invalid(
                    PORT_ENV,
                    format!("'{value}' is not a valid port number (must be 1-65535)"),
                )
            })?,
            None => DEFAULT_PORT,
        };
        let log_format = match lookup(LOG_FORMAT_ENV) {
            Some(value) => value.parse()?,
            None => LogFormat::Pretty,
        };

        Ok(Self {
            auth0_domain,
            api_audience,
            algorithms,
            jwks_url,
            jwks_cache_ttl,
            jwks_fetch_timeout,
            jwks_min_refresh_interval,
            jwt_leeway,
            database_path,
            host,
            port,
            log_format,
        })
    }

    /// Verification settings for the token verifier.
    pub fn auth_config(&self) -> Result<AuthConfig, ConfigError> {
        let config = AuthConfig::for_domain(&self.auth0_domain, self.api_audience.clone())
            .map_err(|e| ConfigError::invalid(AUTH0_DOMAIN_ENV, e.to_string()))?
            .with_algorithms(self.algorithms.clone())
            .with_leeway(self.jwt_leeway);

        Ok(match &self.jwks_url {
            Some(url) => config.with_jwks_url(url.clone()),
            None => config,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_algorithms(value: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let algorithms = value
        .split(',')
        .map(str::trim)
        .filter(|alg| !alg.is_empty())
        .map(|alg| {
            Algorithm::from_str(alg).map_err(|_| {
                ConfigError::invalid(ALGORITHMS_ENV, format!("unknown algorithm '{alg}'"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if algorithms.is_empty() {
        return Err(ConfigError::invalid(ALGORITHMS_ENV, "must list at least one algorithm"));
    }
    Ok(algorithms)
}
