//! Authorization subsystem configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default freshness window of cached records.
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(6 * 60);

/// Default number of sensors requested per repository page.
pub const DEFAULT_PAGE_SIZE: usize = 10_000;

/// Settings of the [`crate::AuthorizationCache`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationConfig {
    /// Maximum age of a cached record before lookups treat it as absent.
    pub timeout: Duration,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_CACHE_TIMEOUT,
        }
    }
}

impl AuthorizationConfig {
    /// Load from the environment.
    ///
    /// - `SG_CACHE_TIMEOUT_SECS`: cache freshness window (default: 360)
    pub fn from_env() -> Self {
        Self {
            timeout: secs_from_env("SG_CACHE_TIMEOUT_SECS").unwrap_or(DEFAULT_CACHE_TIMEOUT),
        }
    }
}

/// Schedule and paging of the [`crate::CacheReloader`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataReloadSettings {
    /// Interval between full reloads.
    pub data_reload_interval: Duration,
    /// Delay before the first reload after start-up.
    pub start_delay: Duration,
    /// Interval between stale-entry sweeps.
    pub timeout_scan_interval: Duration,
    /// Sensors per repository page. Zero is treated as one.
    pub page_size: usize,
}

impl Default for DataReloadSettings {
    fn default() -> Self {
        Self {
            data_reload_interval: Duration::from_secs(5 * 60),
            start_delay: Duration::from_secs(1),
            timeout_scan_interval: Duration::from_secs(60),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl DataReloadSettings {
    /// Load from the environment. Unset or unparsable values keep their
    /// defaults.
    ///
    /// # Environment Variables
    ///
    /// - `SG_RELOAD_INTERVAL_SECS`: full reload interval (default: 300)
    /// - `SG_RELOAD_START_DELAY_SECS`: first reload delay (default: 1)
    /// - `SG_TIMEOUT_SCAN_INTERVAL_SECS`: sweep interval (default: 60)
    /// - `SG_RELOAD_PAGE_SIZE`: sensors per page (default: 10000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            data_reload_interval: secs_from_env("SG_RELOAD_INTERVAL_SECS")
                .unwrap_or(defaults.data_reload_interval),
            start_delay: secs_from_env("SG_RELOAD_START_DELAY_SECS")
                .unwrap_or(defaults.start_delay),
            timeout_scan_interval: secs_from_env("SG_TIMEOUT_SCAN_INTERVAL_SECS")
                .unwrap_or(defaults.timeout_scan_interval),
            page_size: env::var("SG_RELOAD_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.page_size),
        }
    }

    /// Page size clamped to at least one.
    pub fn effective_page_size(&self) -> usize {
        self.page_size.max(1)
    }
}

fn secs_from_env(name: &str) -> Option<Duration> {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
