//! Data models shared by the registry, the aggregator and the HTTP layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single discoverable entry shown on the dashboard
///
/// `icon` is the logical key supplied by the reporter. `icon_file` is always
/// derived by the icon resolver and overwritten before an item is returned,
/// whatever the caller sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub icon_file: String,
    #[serde(default)]
    pub comment: String,
}

impl Item {
    pub fn new(name: impl Into<String>, url: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            icon: icon.into(),
            ..Default::default()
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// Payload pushed by a sidecar
///
/// Field names follow the sidecar wire format (`uuid`, `containers`).
/// `containers` may be omitted or null and is normalized to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "uuid", default)]
    pub source_id: String,
    #[serde(rename = "containers", default, deserialize_with = "null_as_empty")]
    pub items: Vec<Item>,
}

/// Last report time of a single source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    #[serde(rename = "uuid")]
    pub source_id: String,
    pub last_seen: DateTime<Utc>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
