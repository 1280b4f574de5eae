//! Scheduling config: the single zone user-typed times are read in, and the publisher cadence.

use anyhow::{Context, Result};
use chrono::FixedOffset;
use postbot_core::parse_utc_offset;
use std::env;

/// Zone of the reference deployment.
pub const DEFAULT_UTC_OFFSET: &str = "+07:00";
pub const DEFAULT_PUBLISH_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// SCHEDULE_UTC_OFFSET
    pub utc_offset: FixedOffset,
    /// PUBLISH_INTERVAL_SECS
    pub publish_interval_secs: u64,
}

impl ScheduleConfig {
    pub fn from_env() -> Result<Self> {
        let raw_offset =
            env::var("SCHEDULE_UTC_OFFSET").unwrap_or_else(|_| DEFAULT_UTC_OFFSET.to_string());
        let utc_offset = parse_utc_offset(&raw_offset)
            .map_err(|e| anyhow::anyhow!("SCHEDULE_UTC_OFFSET: {}", e))?;
        let publish_interval_secs = match env::var("PUBLISH_INTERVAL_SECS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PUBLISH_INTERVAL_SECS is not a number: {}", raw))?,
            Err(_) => DEFAULT_PUBLISH_INTERVAL_SECS,
        };

        Ok(Self {
            utc_offset,
            publish_interval_secs,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.publish_interval_secs == 0 {
            anyhow::bail!("PUBLISH_INTERVAL_SECS must be at least 1");
        }
        Ok(())
    }
}
