//! Shared fixtures: worlds are built end-to-end from raw JSON records so the
//! normalization layer is exercised by every scenario.

#![allow(dead_code)]

use serde_json::{json, Value};

use railplan_lib::{build_graph, build_world_data, normalize_records, Graph, WorldData};

pub fn world_and_graph(records: &[Value], generation: u64) -> (WorldData, Graph) {
    let entities = normalize_records(records);
    let world = build_world_data(entities, generation);
    let graph = build_graph(&world);
    (world, graph)
}

pub fn line_record(id: &str, name: &str, points: &[(f64, f64)]) -> Value {
    json!({
        "Class": "Line",
        "ID": id,
        "name": name,
        "points": points.iter().map(|(x, z)| json!([x, z])).collect::<Vec<_>>(),
    })
}

pub fn station_record(id: &str, name: &str, position: (f64, f64)) -> Value {
    json!({
        "Class": "Station",
        "ID": id,
        "name": name,
        "position": {"x": position.0, "z": position.1},
    })
}

pub fn building_record(id: &str, name: &str, center: (f64, f64), stations: &[&str]) -> Value {
    json!({
        "Class": "Building",
        "ID": id,
        "name": name,
        "position": {"x": center.0, "z": center.1},
        "stations": stations,
    })
}

pub fn platform_record(id: &str, position: (f64, f64), station: Option<&str>, lines: Value) -> Value {
    let mut record = json!({
        "Class": "Platform",
        "ID": id,
        "name": format!("Platform {id}"),
        "position": {"x": position.0, "z": position.1},
        "lines": lines,
    });
    if let Some(station) = station {
        record["stationID"] = json!(station);
    }
    record
}

/// One line A(0) → B(100) → C(250), every stop owned by its own station and
/// building; `b_overtaking` turns B into a pass-through stop.
pub fn three_stop_world(b_overtaking: bool) -> Vec<Value> {
    vec![
        line_record("L1", "Trunk", &[(0.0, 0.0), (250.0, 0.0)]),
        platform_record("pa", (0.0, 0.0), Some("sa"), json!([{"lineID": "L1"}])),
        platform_record(
            "pb",
            (100.0, 0.0),
            Some("sb"),
            json!([{"lineID": "L1", "overtaking": b_overtaking}]),
        ),
        platform_record("pc", (250.0, 0.0), Some("sc"), json!([{"lineID": "L1"}])),
        station_record("sa", "A", (0.0, 0.0)),
        station_record("sb", "B", (100.0, 0.0)),
        station_record("sc", "C", (250.0, 0.0)),
        building_record("ba", "A Building", (0.0, 0.0), &["sa"]),
        building_record("bc", "C Building", (250.0, 0.0), &["sc"]),
    ]
}

/// Two lines spliced by a hidden platform: a rider continuing through the
/// splice changes line without a transfer.
pub fn hidden_connector_world() -> Vec<Value> {
    let mut hub = platform_record(
        "hub",
        (100.0, 0.0),
        None,
        json!([{"lineID": "L1"}, {"lineID": "L2"}]),
    );
    hub["connect"] = json!(false);
    vec![
        line_record("L1", "West", &[(0.0, 0.0), (100.0, 0.0)]),
        line_record("L2", "East", &[(100.0, 0.0), (200.0, 0.0)]),
        platform_record("pa", (0.0, 0.0), Some("sa"), json!([{"lineID": "L1"}])),
        hub,
        platform_record("pg", (200.0, 0.0), Some("sg"), json!([{"lineID": "L2"}])),
        station_record("sa", "A", (0.0, 0.0)),
        station_record("sg", "G", (200.0, 0.0)),
        building_record("ba", "A Building", (0.0, 0.0), &["sa"]),
        building_record("bg", "G Building", (200.0, 0.0), &["sg"]),
    ]
}
