use serde::{Deserialize, Serialize};

use super::scalar::{Scalar, lenient_list, opt_text, opt_timestamp};

/// One reading from a meter's history; the backend sends the newest first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Scalar>,
    #[serde(
        default,
        deserialize_with = "opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub unit: Option<String>,
}

/// A sensor attached to a gateway.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Meter {
    #[serde(rename = "meterid", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Scalar>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_code: Option<Scalar>,
    /// Older firmware reports the medium under this name instead of `type`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Scalar>,
    #[serde(
        default,
        deserialize_with = "opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub unit: Option<String>,
    #[serde(
        rename = "reading",
        default,
        deserialize_with = "lenient_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub readings: Vec<Reading>,

    #[serde(
        rename = "ts",
        default,
        deserialize_with = "opt_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<i64>,
}
