//! Display helpers for gateway and meter fields.
//!
//! Everything here is pure; views call these while rendering.

use std::sync::OnceLock;

use time::format_description::FormatItem;
use time::{OffsetDateTime, UtcOffset};

use crate::model::{Meter, Scalar};

/// M-Bus medium codes.
pub const MEDIUM_TABLE: [&str; 9] = [
    "Other",
    "Oil",
    "Electricity",
    "Gas",
    "Heat",
    "Steam",
    "Hot Water",
    "Water",
    "H.C.A.",
];

fn datestr_format() -> &'static [FormatItem<'static>] {
    static FMT: OnceLock<Vec<FormatItem<'static>>> = OnceLock::new();
    FMT.get_or_init(|| {
        time::format_description::parse(
            "[year]-[month padding:zero]-[day padding:zero] [hour padding:zero]:[minute padding:zero]:[second padding:zero]",
        )
        .expect("valid time format")
    })
}

/// The local UTC offset, falling back to UTC when the platform cannot tell.
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// Formats a unix timestamp as `YYYY-MM-DD HH:MM:SS`; absent or zero is blank.
pub fn datestr(ts: Option<i64>, offset: UtcOffset) -> String {
    let Some(ts) = ts.filter(|t| *t != 0) else {
        return String::new();
    };
    OffsetDateTime::from_unix_timestamp(ts)
        .ok()
        .and_then(|dt| dt.to_offset(offset).format(datestr_format()).ok())
        .unwrap_or_else(|| ts.to_string())
}

pub fn medium_name(code: i64) -> Option<&'static str> {
    usize::try_from(code)
        .ok()
        .and_then(|i| MEDIUM_TABLE.get(i))
        .copied()
}

pub fn text(value: Option<&Scalar>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn present(value: Option<&Scalar>) -> Option<&Scalar> {
    value.filter(|v| !v.is_blank())
}

/// Medium name for a meter; unknown codes pass through as the raw value.
pub fn meter_type(meter: &Meter) -> String {
    let code = present(meter.type_code.as_ref()).or(present(meter.medium.as_ref()));
    match code {
        Some(code) => code
            .as_i64()
            .and_then(medium_name)
            .map(str::to_string)
            .unwrap_or_else(|| code.to_string()),
        None => String::new(),
    }
}

fn with_unit(value: &Scalar, unit: Option<&str>) -> String {
    match unit.filter(|u| !u.is_empty()) {
        Some(unit) => format!("{} {}", value, unit),
        None => value.to_string(),
    }
}

/// The reading shown for a meter.
///
/// A direct `value` always wins over the reading history; otherwise the
/// first (most recent) history entry is used.
pub fn meter_reading(meter: &Meter) -> String {
    if let Some(value) = present(meter.value.as_ref()) {
        return with_unit(value, meter.unit.as_deref());
    }
    meter
        .readings
        .first()
        .and_then(|r| present(r.value.as_ref()).map(|v| with_unit(v, r.unit.as_deref())))
        .unwrap_or_default()
}

pub fn bus_label(meter: &Meter) -> String {
    let bus = text(meter.bus.as_ref());
    let device = text(meter.device.as_ref());
    format!("{} {}", bus, device).trim().to_string()
}

/// One row of the meters table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MeterRow {
    pub id: String,
    pub manufacturer: String,
    pub version: String,
    pub kind: String,
    pub bus: String,
    pub address: String,
    pub reading: String,
    pub time: String,
}

pub fn meter_row(meter: &Meter, offset: UtcOffset) -> MeterRow {
    MeterRow {
        id: text(meter.id.as_ref()),
        manufacturer: text(meter.manufacturer.as_ref()),
        version: text(meter.version.as_ref()),
        kind: meter_type(meter),
        bus: bus_label(meter),
        address: text(meter.address.as_ref()),
        reading: meter_reading(meter),
        time: datestr(meter.timestamp, offset),
    }
}

#[cfg(test)]
#[path = "tests/format/format_tests.rs"]
mod tests;
