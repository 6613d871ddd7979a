//! Serde helpers for the durations in the configuration.
//!
//! Sidecar deployments have always configured ages and intervals as plain
//! minute counts, so a bare number is read as minutes. Anything else goes
//! through humantime ("90s", "20m", "1h30m").

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::{fmt, time::Duration};

/// Duration where a bare number means minutes
pub mod minutes {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration_str = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&duration_str)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MinutesVisitor;

        impl<'de> Visitor<'de> for MinutesVisitor {
            type Value = Duration;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str(
                    "a duration as minutes (number) or human-readable string (e.g., '20m', '90s')",
                )
            }

            fn visit_u64<E>(self, minutes: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                minutes
                    .checked_mul(60)
                    .map(Duration::from_secs)
                    .ok_or_else(|| de::Error::custom(format!("{minutes} minutes is too large")))
            }

            fn visit_i64<E>(self, minutes: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                let minutes = u64::try_from(minutes).map_err(|_| {
                    de::Error::custom(format!("Negative duration: {minutes} minutes"))
                })?;
                self.visit_u64(minutes)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                // Environment variables always arrive as strings
                if let Ok(minutes) = value.trim().parse::<u64>() {
                    return self.visit_u64(minutes);
                }
                humantime::parse_duration(value)
                    .map_err(|e| de::Error::custom(format!("Invalid duration '{value}': {e}")))
            }
        }

        deserializer.deserialize_any(MinutesVisitor)
    }
}

/// Duration where a bare number means seconds
pub mod seconds {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration_str = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&duration_str)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SecondsVisitor;

        impl<'de> Visitor<'de> for SecondsVisitor {
            type Value = Duration;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a duration as seconds (number) or human-readable string")
            }

            fn visit_u64<E>(self, seconds: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Duration::from_secs(seconds))
            }

            fn visit_i64<E>(self, seconds: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(seconds)
                    .map(Duration::from_secs)
                    .map_err(|_| de::Error::custom(format!("Negative duration: {seconds} seconds")))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if let Ok(seconds) = value.trim().parse::<u64>() {
                    return Ok(Duration::from_secs(seconds));
                }
                humantime::parse_duration(value)
                    .map_err(|e| de::Error::custom(format!("Invalid duration '{value}': {e}")))
            }
        }

        deserializer.deserialize_any(SecondsVisitor)
    }
}
