use std::collections::BTreeSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rolelink_shared::types::RoleId;

use crate::errors::AppError;

const DEFAULT_CONFIG_PATH: &str = "config.json";
const DEFAULT_RETRY_DELAY_MS: u64 = 500;
const DEFAULT_WORKER_IDLE_SECS: u64 = 60;
const DEFAULT_CHANNEL_BUFFER: usize = 1000;

/// Runtime settings, read from `ROLELINK_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub config_path: PathBuf,
    /// NDJSON event stream; stdin when unset.
    pub events_path: Option<PathBuf>,
    /// Seed for the in-memory directory; permissive empty directory when unset.
    pub directory_fixture: Option<PathBuf>,
    pub super_admin_roles: BTreeSet<RoleId>,
    pub retry_delay: Duration,
    pub worker_idle: Duration,
    pub channel_buffer_size: usize,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, which returns the raw value of a
    /// variable if it is set.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let channel_buffer_size = parse_or(
            get("ROLELINK_CHANNEL_BUFFER"),
            "ROLELINK_CHANNEL_BUFFER",
            DEFAULT_CHANNEL_BUFFER,
        )?;
        if channel_buffer_size == 0 {
            return Err(AppError::Config(
                "ROLELINK_CHANNEL_BUFFER must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            config_path: get("ROLELINK_CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
            events_path: get("ROLELINK_EVENTS_PATH").map(PathBuf::from),
            directory_fixture: get("ROLELINK_DIRECTORY_FIXTURE").map(PathBuf::from),
            super_admin_roles: parse_role_list(get("ROLELINK_SUPER_ADMIN_ROLES"))?,
            retry_delay: Duration::from_millis(parse_or(
                get("ROLELINK_RETRY_DELAY_MS"),
                "ROLELINK_RETRY_DELAY_MS",
                DEFAULT_RETRY_DELAY_MS,
            )?),
            worker_idle: Duration::from_secs(parse_or(
                get("ROLELINK_WORKER_IDLE_SECS"),
                "ROLELINK_WORKER_IDLE_SECS",
                DEFAULT_WORKER_IDLE_SECS,
            )?),
            channel_buffer_size,
        })
    }
}

fn parse_or<T>(raw: Option<String>, name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{name}={raw:?}: {e}"))),
        None => Ok(default),
    }
}

fn parse_role_list(raw: Option<String>) -> Result<BTreeSet<RoleId>, AppError> {
    let Some(raw) = raw else {
        return Ok(BTreeSet::new());
    };
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            part.parse::<RoleId>().map_err(|e| {
                AppError::Config(format!("ROLELINK_SUPER_ADMIN_ROLES entry {part:?}: {e}"))
            })
        })
        .collect()
}
