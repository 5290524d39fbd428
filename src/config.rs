//! Service configuration from the environment.

use std::str::FromStr;

use anyhow::{ensure, Context, Result};

use crate::dive::{ImportOptions, SegmentOptions};

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Address the HTTP listener binds to
    pub bind_addr: String,
    /// Largest accepted request body, uploads included
    pub max_upload_bytes: usize,
    /// Dive log import settings
    pub import: ImportOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            import: ImportOptions::default(),
        }
    }
}

impl Config {
    /// Read configuration from process environment variables.
    ///
    /// Recognised: `BIND_ADDR`, `DIVE_MAX_UPLOAD_BYTES`, `DIVE_ROUND_DEPTH_M`,
    /// `DIVE_MIN_SEGMENT_SEC`, `DIVE_IMPORT_PPO2_LIMIT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let bind_addr = lookup("BIND_ADDR").unwrap_or(defaults.bind_addr);
        let max_upload_bytes = parse_var(&lookup, "DIVE_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?;
        let round_depth_m = parse_var(&lookup, "DIVE_ROUND_DEPTH_M", defaults.import.segments.round_depth_m)?;
        let min_segment_sec = parse_var(&lookup, "DIVE_MIN_SEGMENT_SEC", defaults.import.segments.min_segment_sec)?;
        let ppo2_limit = parse_var(&lookup, "DIVE_IMPORT_PPO2_LIMIT", defaults.import.ppo2_limit)?;

        ensure!(max_upload_bytes > 0, "DIVE_MAX_UPLOAD_BYTES must be positive");
        ensure!(round_depth_m > 0.0, "DIVE_ROUND_DEPTH_M must be positive");
        ensure!(min_segment_sec >= 0.0, "DIVE_MIN_SEGMENT_SEC must not be negative");
        ensure!(ppo2_limit > 0.0, "DIVE_IMPORT_PPO2_LIMIT must be positive");

        Ok(Self {
            bind_addr,
            max_upload_bytes,
            import: ImportOptions {
                segments: SegmentOptions {
                    round_depth_m,
                    min_segment_sec,
                },
                ppo2_limit,
            },
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
