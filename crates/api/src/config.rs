//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use bizdesk_auth::session::SESSION_MAX_AGE_SECS;
use bizdesk_auth::CookiePolicy;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Upper bound for `SESSION_MAX_AGE_SECS`: 400 days, the longest `Max-Age`
/// browsers honour.
pub const MAX_SESSION_MAX_AGE_SECS: i64 = 400 * 24 * 60 * 60;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub environment: Environment,
    /// Signing secret of the identity provider. Absent means the session
    /// endpoints answer 500 (configuration missing) instead of starting up
    /// with an insecure default.
    pub session_secret: Option<String>,
    pub session_max_age: Duration,
    pub database_url: Option<String>,
}

fn parse_max_age(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        var: "SESSION_MAX_AGE_SECS",
        reason,
    };

    let secs = raw.trim().parse::<i64>().map_err(|e| invalid(e.to_string()))?;
    if secs <= 0 {
        return Err(invalid("must be positive".to_string()));
    }
    if secs > MAX_SESSION_MAX_AGE_SECS {
        return Err(invalid(format!(
            "must be at most {MAX_SESSION_MAX_AGE_SECS} seconds"
        )));
    }
    Duration::try_seconds(secs).ok_or_else(|| invalid("out of range".to_string()))
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = non_empty("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let environment = match non_empty("APP_ENV").as_deref() {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        };

        let session_max_age = match non_empty("SESSION_MAX_AGE_SECS") {
            None => Duration::seconds(SESSION_MAX_AGE_SECS),
            Some(raw) => parse_max_age(&raw)?,
        };

        Ok(Self {
            bind_addr,
            environment,
            session_secret: non_empty("SESSION_SECRET"),
            session_max_age,
            database_url: non_empty("DATABASE_URL"),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn cookie_policy(&self) -> CookiePolicy {
        CookiePolicy::new(self.is_production()).with_max_age(self.session_max_age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_are_development_with_five_day_sessions() {
        let c = config(&[]).unwrap();
        assert_eq!(c.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(c.environment, Environment::Development);
        assert_eq!(c.session_max_age, Duration::seconds(432_000));
        assert!(c.session_secret.is_none());
        assert!(!c.cookie_policy().secure);
    }

    #[test]
    fn production_cookies_are_secure() {
        let c = config(&[("APP_ENV", "production"), ("SESSION_SECRET", "x")]).unwrap();
        assert!(c.is_production());
        assert!(c.cookie_policy().secure);
        assert_eq!(c.session_secret.as_deref(), Some("x"));
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let c = config(&[("SESSION_SECRET", "   ")]).unwrap();
        assert!(c.session_secret.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("BIND_ADDR", "nowhere")]).is_err());
        assert!(config(&[("SESSION_MAX_AGE_SECS", "0")]).is_err());
        assert!(config(&[("SESSION_MAX_AGE_SECS", "five days")]).is_err());
    }

    #[test]
    fn rejects_session_lifetimes_beyond_the_cap() {
        for raw in ["100000000000000", "9223372036854775807"] {
            let err = config(&[("SESSION_MAX_AGE_SECS", raw)]).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Invalid {
                    var: "SESSION_MAX_AGE_SECS",
                    ..
                }
            ));
        }

        let cap = MAX_SESSION_MAX_AGE_SECS.to_string();
        let c = config(&[("SESSION_MAX_AGE_SECS", cap.as_str())]).unwrap();
        assert_eq!(c.session_max_age, Duration::seconds(MAX_SESSION_MAX_AGE_SECS));
        assert!(config(&[("SESSION_MAX_AGE_SECS", "34560001")]).is_err());
    }
}
