use std::env;

use chrono_tz::Tz;

use crate::AResult;

pub const DEFAULT_TABLE_NAME: &str = "parcels";
pub const DEFAULT_TIMEZONE: &str = "Europe/Warsaw";

/// Settings read from the Lambda environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub table_name: String,
    /// Timezone used for "today" boundaries and local timestamps in exports.
    pub timezone: Tz,
}

impl Config {
    pub fn from_env() -> AResult<Self> {
        Self::from_vars(
            env::var("PARCELS_TABLE_NAME").ok(),
            env::var("REPORT_TIMEZONE").ok(),
        )
    }

    fn from_vars(table_name: Option<String>, timezone: Option<String>) -> AResult<Self> {
        let timezone = timezone.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone: Tz = timezone
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid REPORT_TIMEZONE {}: {}", timezone, e))?;

        Ok(Self {
            table_name: table_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
            timezone,
        })
    }
}
