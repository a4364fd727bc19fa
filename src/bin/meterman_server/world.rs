//! The backend's in-memory fleet state.
//!
//! Gateways and meters are kept as loose JSON objects: gateway messages are
//! merged in field by field, so whatever a gateway reports is passed on to
//! dashboards unchanged.

use std::collections::{BTreeMap, HashMap, VecDeque};

use super::*;

pub(super) const SOFTWARE_PATH: &str = "/meterman/download/metermon";

#[derive(Debug)]
pub(super) struct World {
    seq: u64,
    next_seq: u64,
    software: String,
    gateways: BTreeMap<String, Map<String, Value>>,

    // Control messages waiting for their gateway to collect them.
    outbox: HashMap<String, VecDeque<Value>>,
}

impl Default for World {
    fn default() -> Self {
        Self {
            seq: 0,
            next_seq: 1,
            software: SOFTWARE_PATH.to_string(),
            gateways: BTreeMap::new(),
            outbox: HashMap::new(),
        }
    }
}

impl World {
    pub(super) fn seq(&self) -> u64 {
        self.seq
    }

    /// Marks the state as changed. Every change gets a fresh seq.
    pub(super) fn touch(&mut self) -> u64 {
        self.seq = self.next_seq;
        self.next_seq += 1;
        self.seq
    }

    pub(super) fn snapshot(&self) -> Value {
        json!({
            "seq": self.seq,
            "software": self.software,
            "gateways": self.gateways,
        })
    }

    pub(super) fn contains(&self, gw: &str) -> bool {
        self.gateways.contains_key(gw)
    }

    /// The gateway record, created empty on first contact.
    pub(super) fn gateway_mut(&mut self, gw: &str) -> &mut Map<String, Value> {
        self.gateways.entry(gw.to_string()).or_insert_with(|| {
            let mut record = Map::new();
            record.insert("gw".to_string(), Value::from(gw));
            record.insert("meters".to_string(), Value::Object(Map::new()));
            record
        })
    }

    pub(super) fn forget(&mut self, gw: &str) -> bool {
        self.outbox.remove(gw);
        self.gateways.remove(gw).is_some()
    }

    /// Queues a control message for a known gateway.
    pub(super) fn enqueue(&mut self, gw: &str, msg: Value) -> bool {
        if !self.contains(gw) {
            return false;
        }
        self.outbox.entry(gw.to_string()).or_default().push_back(msg);
        true
    }

    pub(super) fn drain(&mut self, gw: &str) -> Vec<Value> {
        self.outbox.remove(gw).map(Vec::from).unwrap_or_default()
    }
}
