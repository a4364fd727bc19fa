use super::*;
use crate::model::Reading;

fn reading(value: f64, unit: &str) -> Reading {
    Reading {
        value: Some(Scalar::Float(value)),
        unit: Some(unit.to_string()),
    }
}

#[test]
fn direct_value_wins_over_history() {
    let meter = Meter {
        value: Some(Scalar::Int(1234)),
        unit: Some("kWh".to_string()),
        readings: vec![reading(99.5, "m3")],
        ..Meter::default()
    };
    assert_eq!(meter_reading(&meter), "1234 kWh");
}

#[test]
fn history_used_when_no_direct_value() {
    let meter = Meter {
        readings: vec![reading(12.5, "m3"), reading(11.0, "m3")],
        ..Meter::default()
    };
    assert_eq!(meter_reading(&meter), "12.5 m3");
}

#[test]
fn reading_blank_without_value_or_history() {
    assert_eq!(meter_reading(&Meter::default()), "");

    let no_unit = Meter {
        value: Some(Scalar::from("17")),
        ..Meter::default()
    };
    assert_eq!(meter_reading(&no_unit), "17");
}

#[test]
fn medium_codes_map_to_names_and_unknown_pass_through() {
    let water = Meter {
        type_code: Some(Scalar::Int(7)),
        ..Meter::default()
    };
    assert_eq!(meter_type(&water), "Water");

    let legacy = Meter {
        medium: Some(Scalar::Int(4)),
        ..Meter::default()
    };
    assert_eq!(meter_type(&legacy), "Heat");

    let odd = Meter {
        type_code: Some(Scalar::Int(21)),
        ..Meter::default()
    };
    assert_eq!(meter_type(&odd), "21");
    assert_eq!(meter_type(&Meter::default()), "");
}

#[test]
fn datestr_formats_seconds_and_blanks_missing() {
    assert_eq!(datestr(Some(1000), UtcOffset::UTC), "1970-01-01 00:16:40");
    assert_eq!(
        datestr(Some(1_700_000_000), UtcOffset::UTC),
        "2023-11-14 22:13:20"
    );
    assert_eq!(datestr(None, UtcOffset::UTC), "");
    assert_eq!(datestr(Some(0), UtcOffset::UTC), "");
}

#[test]
fn meter_row_joins_bus_and_device() {
    let meter = Meter {
        id: Some(Scalar::from("12345678")),
        bus: Some(Scalar::from("mbus")),
        device: Some(Scalar::from("/dev/ttyUSB0")),
        timestamp: Some(1000),
        ..Meter::default()
    };
    let row = meter_row(&meter, UtcOffset::UTC);
    assert_eq!(row.id, "12345678");
    assert_eq!(row.bus, "mbus /dev/ttyUSB0");
    assert_eq!(row.time, "1970-01-01 00:16:40");
    assert_eq!(bus_label(&Meter::default()), "");
}
