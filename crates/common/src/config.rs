use serde::{Deserialize, Serialize};

use crate::error::{Result, ShardqError};

pub const ENV_DISPATCH_MODE: &str = "SHARDQ_DISPATCH_MODE";
pub const ENV_DISPATCH_MAX_IN_FLIGHT: &str = "SHARDQ_DISPATCH_MAX_IN_FLIGHT";

const DEFAULT_MAX_IN_FLIGHT: usize = 16;

/// How a job fans its task requests out to plan nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// One send at a time, intermediates before leaves, in plan order.
    Sequential,
    /// Up to `max_in_flight` sends at once; the first observed error wins.
    Concurrent { max_in_flight: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub mode: DispatchMode,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            mode: DispatchMode::Sequential,
        }
    }
}

impl DispatchConfig {
    /// Read `SHARDQ_DISPATCH_MODE` / `SHARDQ_DISPATCH_MAX_IN_FLIGHT` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable source. Unset variables keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_in_flight = match lookup(ENV_DISPATCH_MAX_IN_FLIGHT) {
            Some(raw) => parse_max_in_flight(&raw)?,
            None => DEFAULT_MAX_IN_FLIGHT,
        };
        let mode = match lookup(ENV_DISPATCH_MODE) {
            None => DispatchMode::Sequential,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "" | "sequential" => DispatchMode::Sequential,
                "concurrent" => DispatchMode::Concurrent { max_in_flight },
                other => {
                    return Err(ShardqError::InvalidConfig(format!(
                        "{ENV_DISPATCH_MODE} must be 'sequential' or 'concurrent', got '{other}'"
                    )));
                }
            },
        };
        Ok(Self { mode })
    }
}

fn parse_max_in_flight(raw: &str) -> Result<usize> {
    let n = raw.trim().parse::<usize>().map_err(|e| {
        ShardqError::InvalidConfig(format!("{ENV_DISPATCH_MAX_IN_FLIGHT} is not a number: {e}"))
    })?;
    if n == 0 {
        return Err(ShardqError::InvalidConfig(format!(
            "{ENV_DISPATCH_MAX_IN_FLIGHT} must be greater than 0"
        )));
    }
    Ok(n)
}
