//! TOML file configuration structures.
//!
//! These structs directly map to the `geev-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("valid default address")
}

/// Leaderboard tuning section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    /// Page cache TTL in seconds. 0 disables the cache.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Engagement half-life override for the week window, in hours.
    #[serde(default)]
    pub week_half_life_hours: Option<u64>,
    /// Engagement half-life override for the month window, in hours.
    #[serde(default)]
    pub month_half_life_hours: Option<u64>,
    /// Engagement half-life override for the all-time window, in hours.
    #[serde(default)]
    pub alltime_half_life_hours: Option<u64>,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            week_half_life_hours: None,
            month_half_life_hours: None,
            alltime_half_life_hours: None,
        }
    }
}

fn default_cache_ttl_secs() -> u64 {
    30
}
