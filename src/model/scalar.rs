use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A loosely typed field value as reported by a gateway.
///
/// Gateways are not consistent about whether versions, pids or addresses are
/// sent as numbers or strings, so display fields keep whatever arrived.
/// Lists and objects are kept as their compact JSON text.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(*n),
            Scalar::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Scalar::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Empty strings count as absent, like missing fields.
    pub fn is_blank(&self) -> bool {
        matches!(self, Scalar::Text(s) if s.is_empty())
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        Ok(Scalar::from(Value::deserialize(de)?))
    }
}

impl From<Value> for Scalar {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(b) => Scalar::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Scalar::Int(i),
                None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Scalar::Text(s),
            Value::Null => Scalar::Text(String::new()),
            other => Scalar::Text(other.to_string()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Float(x)
    }
}

/// Unix timestamps arrive as integers or floats; fractions are dropped.
pub(super) fn opt_timestamp<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Scalar>::deserialize(de)?;
    Ok(raw.and_then(|v| match v {
        Scalar::Float(x) => Some(x.trunc() as i64),
        other => other.as_i64(),
    }))
}

/// Like [`opt_text`], with absent fields read as empty.
pub(super) fn text_or_empty<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_text(de)?.unwrap_or_default())
}

/// Decodes a JSON object record by record. Records that do not decode are
/// logged and left out so one bad entry does not sink the document.
pub(super) fn lenient_entries<T: DeserializeOwned>(
    raw: Option<Value>,
    what: &str,
) -> BTreeMap<String, T> {
    let entries = match raw {
        None | Some(Value::Null) => return BTreeMap::new(),
        Some(Value::Object(entries)) => entries,
        Some(other) => {
            tracing::warn!("ignoring {} map that is not an object: {}", what, other);
            return BTreeMap::new();
        }
    };
    entries
        .into_iter()
        .filter_map(|(key, value)| match T::deserialize(value) {
            Ok(record) => Some((key, record)),
            Err(err) => {
                tracing::warn!(key = %key, "skipping malformed {}: {}", what, err);
                None
            }
        })
        .collect()
}

/// Like [`lenient_entries`] for a list; non-list values read as empty.
pub(super) fn lenient_list<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Option::<Value>::deserialize(de)? {
        Some(Value::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| T::deserialize(item).ok())
        .collect())
}

/// Free text that some gateways send as an embedded JSON document instead.
pub(super) fn opt_text<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(de)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => {
            Some(serde_json::to_string_pretty(&other).map_err(serde::de::Error::custom)?)
        }
    })
}
