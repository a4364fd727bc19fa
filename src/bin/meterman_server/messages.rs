//! Gateway message ingestion.
//!
//! Gateways report with small JSON messages tagged by `op`; each accepted
//! message is merged into the fleet state and advances its seq.

use super::*;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(super) enum MessageError {
    #[error("message is not a JSON object")]
    NotObject,
    #[error("missing op")]
    MissingOp,
    #[error("missing gateway id")]
    MissingGateway,
    #[error("missing meter id in reading")]
    MissingMeterId,
    #[error("unknown message type `{0}`")]
    UnknownOp(String),
}

// Readings with this value information field carry no measurement.
const VIF_NONE: i64 = 127;

/// Applies one gateway message. Returns the new seq.
pub(super) fn apply_message(
    world: &mut World,
    message: &Value,
    history: bool,
) -> Result<u64, MessageError> {
    let msg = message.as_object().ok_or(MessageError::NotObject)?;
    let op = msg
        .get("op")
        .and_then(Value::as_str)
        .ok_or(MessageError::MissingOp)?;
    let gw = gateway_id(msg).ok_or(MessageError::MissingGateway)?;

    match op {
        "startup" => {
            tracing::info!(gw = %gw, "startup");
            let record = world.gateway_mut(&gw);
            mark_seen(record, msg);
            for (key, value) in msg {
                // The meter map is owned by inventory and reading messages.
                if key != "meters" {
                    record.insert(key.clone(), value.clone());
                }
            }
        }
        "inventory" => {
            tracing::info!(gw = %gw, "inventory");
            let record = world.gateway_mut(&gw);
            mark_seen(record, msg);
            let mut meters = take_object(record, "meters");
            let reported = msg.get("meters").and_then(Value::as_array);
            for m in reported.into_iter().flatten() {
                let Some(report) = m.as_object() else {
                    continue;
                };
                let Some(id) = report.get("meterid").map(meter_key) else {
                    continue;
                };
                let mut meter = take_meter(&mut meters, &id);
                merge(&mut meter, report);
                meters.insert(id, Value::Object(meter));
            }
            record.insert("meters".to_string(), Value::Object(meters));
        }
        "reading" => {
            let id = msg
                .get("meterid")
                .map(meter_key)
                .ok_or(MessageError::MissingMeterId)?;
            tracing::debug!(gw = %gw, meter = %id, "reading");
            let record = world.gateway_mut(&gw);
            mark_seen(record, msg);
            let mut meters = take_object(record, "meters");
            let mut meter = take_meter(&mut meters, &id);

            let vif = msg
                .get("reading")
                .and_then(|r| r.get(0))
                .and_then(|r| r.get("vif"))
                .and_then(Value::as_i64);
            if vif != Some(VIF_NONE) {
                merge(&mut meter, msg);
            }
            if history {
                if let Some(Value::Array(past)) = meter.get_mut("readings") {
                    past.push(message.clone());
                } else {
                    meter.insert("readings".to_string(), json!([message]));
                }
            }

            meters.insert(id, Value::Object(meter));
            record.insert("meters".to_string(), Value::Object(meters));
        }
        "console" => {
            let console = msg.get("console").cloned().unwrap_or(Value::Null);
            world
                .gateway_mut(&gw)
                .insert("console".to_string(), console);
        }
        other => {
            tracing::warn!(gw = %gw, op = other, "unknown message type");
            return Err(MessageError::UnknownOp(other.to_string()));
        }
    }

    Ok(world.touch())
}

fn gateway_id(msg: &Map<String, Value>) -> Option<String> {
    match msg.get("gw")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn meter_key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn mark_seen(record: &mut Map<String, Value>, msg: &Map<String, Value>) {
    if let Some(ts) = msg.get("ts") {
        record.insert("lastseen".to_string(), ts.clone());
    }
}

fn take_object(record: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
    match record.remove(key) {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn take_meter(meters: &mut Map<String, Value>, id: &str) -> Map<String, Value> {
    match meters.remove(id) {
        Some(Value::Object(map)) => map,
        _ => {
            let mut meter = Map::new();
            meter.insert("readings".to_string(), json!([]));
            meter
        }
    }
}

fn merge(into: &mut Map<String, Value>, from: &Map<String, Value>) {
    for (key, value) in from {
        into.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
#[path = "../../tests/bin/meterman_server/messages_tests.rs"]
mod tests;
