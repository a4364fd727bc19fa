use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::meter::Meter;
use super::scalar::{Scalar, lenient_entries, opt_text, opt_timestamp, text_or_empty};

/// One managed gateway device.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Gateway {
    #[serde(rename = "gw", default, deserialize_with = "text_or_empty")]
    pub id: String,

    #[serde(
        rename = "ts",
        default,
        deserialize_with = "opt_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub up_since: Option<i64>,

    #[serde(
        rename = "lastseen",
        default,
        deserialize_with = "opt_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_seen: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Scalar>,
    #[serde(rename = "build", default, skip_serializing_if = "Option::is_none")]
    pub build_date: Option<Scalar>,
    #[serde(rename = "control", default, skip_serializing_if = "Option::is_none")]
    pub control_topic: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<Scalar>,
    #[serde(rename = "serial", default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<Scalar>,

    /// Raw configuration text, normally a JSON document.
    #[serde(
        rename = "config",
        default,
        deserialize_with = "opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub configuration: Option<String>,

    #[serde(
        rename = "console",
        default,
        deserialize_with = "opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub console_log: Option<String>,

    #[serde(default, deserialize_with = "meters_by_id")]
    pub meters: BTreeMap<String, Meter>,
}

fn meters_by_id<'de, D>(de: D) -> Result<BTreeMap<String, Meter>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(de)?;
    Ok(lenient_entries(raw, "meter"))
}

impl Gateway {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn configuration_text(&self) -> &str {
        self.configuration.as_deref().unwrap_or("")
    }

    /// The console panel is only worth showing when it has visible content.
    pub fn has_console(&self) -> bool {
        self.console_log
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}
