use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::gateway::Gateway;
use super::scalar::{Scalar, lenient_entries, opt_text};

/// Opaque change token attached to every snapshot.
///
/// Only ever compared for equality. The backend numbers its states, so the
/// "no state yet" sentinel is `0`, the sequence of the backend's empty world.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SeqToken(String);

impl SeqToken {
    pub fn none() -> Self {
        SeqToken("0".to_string())
    }

    pub fn new(raw: impl Into<String>) -> Self {
        SeqToken(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SeqToken {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for SeqToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for SeqToken {
    fn from(n: u64) -> Self {
        SeqToken(n.to_string())
    }
}

impl Serialize for SeqToken {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<u64>() {
            Ok(n) => ser.serialize_u64(n),
            Err(_) => ser.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for SeqToken {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let raw = Scalar::deserialize(de)?;
        Ok(SeqToken(raw.to_string()))
    }
}

/// The complete server-reported world state at one instant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "seq")]
    pub sequence: SeqToken,

    #[serde(
        rename = "software",
        default,
        deserialize_with = "opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub software_url: Option<String>,

    #[serde(default, deserialize_with = "gateways_by_id")]
    pub gateways: BTreeMap<String, Gateway>,
}

impl Snapshot {
    pub fn gateway(&self, id: &str) -> Option<&Gateway> {
        self.gateways.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.gateways.contains_key(id)
    }
}

// The mapping key is the gateway's identity, whatever its record says.
fn gateways_by_id<'de, D>(de: D) -> Result<BTreeMap<String, Gateway>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(de)?;
    let mut gateways: BTreeMap<String, Gateway> = lenient_entries(raw, "gateway");
    for (key, gw) in gateways.iter_mut() {
        gw.id = key.clone();
    }
    Ok(gateways)
}
