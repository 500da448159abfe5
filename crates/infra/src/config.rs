//! Configuration loading and representation.
//!
//! Everything is read from the process environment once at start-up and
//! validated before the server binds.

use std::net::SocketAddr;

use thiserror::Error;

use libcat_auth::JwtSettings;

pub const ENV_JWT_ISSUER: &str = "LIBCAT_JWT_ISSUER";
pub const ENV_JWT_AUDIENCE: &str = "LIBCAT_JWT_AUDIENCE";
pub const ENV_JWT_LIFETIME_MINUTES: &str = "LIBCAT_JWT_LIFETIME_MINUTES";
pub const ENV_JWT_SIGNING_KEY: &str = "LIBCAT_JWT_SIGNING_KEY";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_BIND_ADDR: &str = "LIBCAT_BIND_ADDR";
pub const ENV_BOOTSTRAP_ADMIN: &str = "LIBCAT_BOOTSTRAP_ADMIN";

const DEFAULT_ISSUER: &str = "libcat";
const DEFAULT_AUDIENCE: &str = "libcat-clients";
const DEFAULT_LIFETIME_MINUTES: i64 = 60;
const DEV_SIGNING_KEY: &str = "libcat-insecure-development-signing-key";
const DEFAULT_DATABASE_URL: &str = "sqlite://libcat.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// HS256 keys shorter than the hash output weaken the MAC.
const MIN_SIGNING_KEY_BYTES: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive number of minutes, got '{value}'")]
    InvalidLifetime { key: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{key} is not a valid socket address: '{value}'")]
    InvalidBindAddr { key: &'static str, value: String },

    #[error("{0} must look like 'username:password'")]
    InvalidBootstrapAdmin(&'static str),
}

/// Account created (or topped up with every permission) at start-up.
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt: JwtSettings,
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &'static str, default: &str| -> Result<String, ConfigError> {
            match lookup(key) {
                Some(v) if v.trim().is_empty() => Err(ConfigError::Empty(key)),
                Some(v) => Ok(v),
                None => Ok(default.to_string()),
            }
        };

        let issuer = non_empty(ENV_JWT_ISSUER, DEFAULT_ISSUER)?;
        let audience = non_empty(ENV_JWT_AUDIENCE, DEFAULT_AUDIENCE)?;

        let lifetime = match lookup(ENV_JWT_LIFETIME_MINUTES) {
            None => chrono::Duration::minutes(DEFAULT_LIFETIME_MINUTES),
            // `try_minutes` is `None` past chrono's representable range.
            Some(raw) => match raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .and_then(chrono::Duration::try_minutes)
            {
                Some(lifetime) => lifetime,
                None => {
                    return Err(ConfigError::InvalidLifetime {
                        key: ENV_JWT_LIFETIME_MINUTES,
                        value: raw,
                    });
                }
            },
        };

        let signing_key = match lookup(ENV_JWT_SIGNING_KEY) {
            Some(k) if k.is_empty() => return Err(ConfigError::Empty(ENV_JWT_SIGNING_KEY)),
            Some(k) => k,
            None => {
                tracing::warn!("{ENV_JWT_SIGNING_KEY} not set; using insecure dev default");
                DEV_SIGNING_KEY.to_string()
            }
        };
        if signing_key.len() < MIN_SIGNING_KEY_BYTES {
            tracing::warn!(
                "{ENV_JWT_SIGNING_KEY} is shorter than {MIN_SIGNING_KEY_BYTES} bytes; tokens are easier to forge"
            );
        }

        let database_url = non_empty(ENV_DATABASE_URL, DEFAULT_DATABASE_URL)?;

        let bind_raw = non_empty(ENV_BIND_ADDR, DEFAULT_BIND_ADDR)?;
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddr { key: ENV_BIND_ADDR, value: bind_raw.clone() })?;

        let bootstrap_admin = lookup(ENV_BOOTSTRAP_ADMIN)
            .map(|raw| parse_bootstrap_admin(&raw))
            .transpose()?;

        Ok(Self {
            jwt: JwtSettings {
                issuer,
                audience,
                lifetime,
                signing_key,
            },
            database_url,
            bind_addr,
            bootstrap_admin,
        })
    }
}

fn parse_bootstrap_admin(raw: &str) -> Result<BootstrapAdmin, ConfigError> {
    match raw.split_once(':') {
        Some((user, pass)) if !user.trim().is_empty() && !pass.is_empty() => Ok(BootstrapAdmin {
            username: user.trim().to_string(),
            password: pass.to_string(),
        }),
        _ => Err(ConfigError::InvalidBootstrapAdmin(ENV_BOOTSTRAP_ADMIN)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.jwt.issuer, "libcat");
        assert_eq!(cfg.jwt.audience, "libcat-clients");
        assert_eq!(cfg.jwt.lifetime, chrono::Duration::minutes(60));
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert!(cfg.bootstrap_admin.is_none());
    }

    #[test]
    fn explicit_values_win() {
        let cfg = load(&[
            (ENV_JWT_ISSUER, "library"),
            (ENV_JWT_AUDIENCE, "readers"),
            (ENV_JWT_LIFETIME_MINUTES, "15"),
            (ENV_JWT_SIGNING_KEY, "0123456789abcdef0123456789abcdef"),
            (ENV_BIND_ADDR, "127.0.0.1:9000"),
            (ENV_BOOTSTRAP_ADMIN, "admin:s3cr:et"),
        ])
        .unwrap();
        assert_eq!(cfg.jwt.issuer, "library");
        assert_eq!(cfg.jwt.lifetime, chrono::Duration::minutes(15));
        let admin = cfg.bootstrap_admin.unwrap();
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.password, "s3cr:et");
    }

    #[test]
    fn lifetime_must_be_positive_and_representable() {
        for bad in ["0", "-5", "soon", "200000000000000"] {
            let err = load(&[(ENV_JWT_LIFETIME_MINUTES, bad)]).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidLifetime { .. }), "{bad}");
        }
    }

    #[test]
    fn empty_signing_key_is_rejected() {
        assert_eq!(
            load(&[(ENV_JWT_SIGNING_KEY, "")]).unwrap_err(),
            ConfigError::Empty(ENV_JWT_SIGNING_KEY)
        );
    }

    #[test]
    fn malformed_bootstrap_admin_is_rejected() {
        for bad in ["admin", ":pw", "admin:"] {
            assert!(load(&[(ENV_BOOTSTRAP_ADMIN, bad)]).is_err(), "{bad}");
        }
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cfg = load(&[
            (ENV_JWT_SIGNING_KEY, "super-secret-signing-key-material!"),
            (ENV_BOOTSTRAP_ADMIN, "admin:hunter2"),
        ])
        .unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("hunter2"));
    }
}
