use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::error::StatsError;

/// Bucket size for activity timelines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityPeriod {
    Day,
    #[default]
    Month,
    Year,
}

impl ActivityPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityPeriod::Day => "day",
            ActivityPeriod::Month => "month",
            ActivityPeriod::Year => "year",
        }
    }

    /// Bucket key for a timestamp, e.g. `2024-03` for a month.
    pub fn key_for(&self, timestamp: &DateTime<Utc>) -> String {
        let format = match self {
            ActivityPeriod::Day => "%Y-%m-%d",
            ActivityPeriod::Month => "%Y-%m",
            ActivityPeriod::Year => "%Y",
        };
        timestamp.format(format).to_string()
    }
}

impl FromStr for ActivityPeriod {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(ActivityPeriod::Day),
            "month" => Ok(ActivityPeriod::Month),
            "year" => Ok(ActivityPeriod::Year),
            other => Err(StatsError::InvalidPeriod(other.to_string())),
        }
    }
}

impl fmt::Display for ActivityPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
