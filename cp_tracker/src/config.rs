use crate::modules::sync::{
    policy::{DivisionPolicy, IndexSelection},
    SyncSettings,
};
use anyhow::{Context, Result};
use std::{env, fmt::Display, str::FromStr, time::Duration};
use url::Url;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: i64,
}

#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub codeforces_api_url: String,
    pub leetcode_graphql_url: String,
    pub leetcode_submissions_url: String,
    pub codeforces_submissions_timeout: Duration,
}

/// Every setting of the service, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub platforms: PlatformConfig,
    pub sync: SyncSettings,
    pub frontend_origin: Option<String>,
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .with_context(|| {
            let message = format!("{} must be configured.", key);
            tracing::error!(message);
            message
        })
}

fn optional<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => value.trim().parse::<T>().map_err(|e| {
            let message = format!("invalid value `{}` for {}: {}", value, key, e);
            tracing::error!(message);
            anyhow::anyhow!(message)
        }),
        None => {
            tracing::warn!(
                "{} is not set. Default value `{}` will be used.",
                key,
                default
            );
            Ok(default)
        }
    }
}

impl DatabaseConfig {
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            url: required(lookup, "DATABASE_URL")?,
            max_connections: optional(lookup, "DATABASE_MAX_CONNECTIONS", 5u32)?,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }
}

impl JwtConfig {
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            secret: required(lookup, "JWT_SECRET")?,
            expiry_hours: optional(lookup, "JWT_EXPIRY_HOURS", 168i64)?,
        })
    }
}

impl PlatformConfig {
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout = optional(lookup, "CODEFORCES_SUBMISSIONS_TIMEOUT_SECS", 10u64)?;
        Ok(Self {
            codeforces_api_url: optional(
                lookup,
                "CODEFORCES_API_URL",
                String::from("https://codeforces.com/api/"),
            )?,
            leetcode_graphql_url: optional(
                lookup,
                "LEETCODE_GRAPHQL_URL",
                String::from("https://leetcode.com/graphql"),
            )?,
            leetcode_submissions_url: optional(
                lookup,
                "LEETCODE_SUBMISSIONS_URL",
                String::from("https://alfa-leetcode-api.onrender.com/"),
            )?,
            codeforces_submissions_timeout: Duration::from_secs(timeout),
        })
    }
}

pub fn sync_settings_from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<SyncSettings> {
    let default = DivisionPolicy::default();
    let policy = DivisionPolicy {
        div2: optional::<IndexSelection>(lookup, "UPSOLVE_DIV2_INDICES", default.div2)?,
        div3: optional::<IndexSelection>(lookup, "UPSOLVE_DIV3_INDICES", default.div3)?,
        div4: optional::<IndexSelection>(lookup, "UPSOLVE_DIV4_INDICES", default.div4)?,
        other: optional::<IndexSelection>(lookup, "UPSOLVE_OTHER_INDICES", default.other)?,
    };

    Ok(SyncSettings {
        recent_contests: optional(lookup, "SYNC_RECENT_CONTESTS", 10usize)?,
        missed_contest_days: optional(lookup, "SYNC_MISSED_CONTEST_DAYS", 30i64)?,
        codeforces_submissions: optional(lookup, "SYNC_CODEFORCES_SUBMISSIONS", 1000u32)?,
        leetcode_submissions: optional(lookup, "SYNC_LEETCODE_SUBMISSIONS", 20u32)?,
        standings_concurrency: optional(lookup, "SYNC_STANDINGS_CONCURRENCY", 2usize)?,
        policy,
    })
}

impl AppConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let frontend_origin = match lookup("FRONTEND_ORIGIN_URL") {
            Some(origin) if !origin.trim().is_empty() => {
                let origin = origin.trim().trim_end_matches('/').to_string();
                Url::parse(&origin).with_context(|| {
                    let message = format!("FRONTEND_ORIGIN_URL `{}` is not a valid url.", origin);
                    tracing::error!(message);
                    message
                })?;
                Some(origin)
            }
            _ => {
                tracing::warn!("FRONTEND_ORIGIN_URL is not set. Any origin will be allowed.");
                None
            }
        };

        Ok(Self {
            database: DatabaseConfig::from_lookup(&lookup)?,
            jwt: JwtConfig::from_lookup(&lookup)?,
            platforms: PlatformConfig::from_lookup(&lookup)?,
            sync: sync_settings_from_lookup(&lookup)?,
            frontend_origin,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::{BTreeSet, HashMap};

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/cp_tracker"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.jwt.expiry_hours, 168);
        assert_eq!(
            config.platforms.codeforces_api_url,
            "https://codeforces.com/api/"
        );
        assert_eq!(
            config.platforms.codeforces_submissions_timeout,
            Duration::from_secs(10)
        );
        assert_eq!(config.sync, SyncSettings::default());
        assert_eq!(config.frontend_origin, None);
    }

    #[test]
    fn test_required_keys() {
        assert!(AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "secret")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/cp_tracker"),
            ("JWT_SECRET", "  "),
        ]))
        .is_err());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/cp_tracker"),
            ("JWT_SECRET", "secret"),
            ("SYNC_RECENT_CONTESTS", "5"),
            ("UPSOLVE_OTHER_INDICES", "A,B"),
            ("UPSOLVE_DIV2_INDICES", "*"),
            ("FRONTEND_ORIGIN_URL", "http://localhost:3000/"),
        ]))
        .unwrap();

        assert_eq!(config.sync.recent_contests, 5);
        assert_eq!(
            config.sync.policy.other,
            IndexSelection::Only(BTreeSet::from(['A', 'B']))
        );
        assert_eq!(config.sync.policy.div2, IndexSelection::All);
        assert_eq!(
            config.frontend_origin.as_deref(),
            Some("http://localhost:3000")
        );
    }

    #[test]
    fn test_malformed_values() {
        let base = [
            ("DATABASE_URL", "postgres://localhost/cp_tracker"),
            ("JWT_SECRET", "secret"),
        ];
        for (key, value) in [
            ("SYNC_RECENT_CONTESTS", "ten"),
            ("UPSOLVE_DIV2_INDICES", "A,BC"),
            ("FRONTEND_ORIGIN_URL", "not a url"),
        ] {
            let mut pairs = base.to_vec();
            pairs.push((key, value));
            assert!(AppConfig::from_lookup(lookup_from(&pairs)).is_err(), "{}", key);
        }
    }
}
