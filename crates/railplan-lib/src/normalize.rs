//! Permissive normalization of loosely-typed source records.
//!
//! Source files are edited by hand and field names drifted over time, so every
//! logical field is looked up through a prioritized candidate-key list; the
//! first non-empty match wins. Malformed records are dropped with a warning
//! and a diagnostic count, never a hard failure, so a partially broken
//! source still produces a usable, possibly smaller, network.
//!
//! Numeric coercion is strict about finiteness: a NaN or infinite value is
//! treated as absent and never reaches the world builder.

use serde_json::Value;
use tracing::warn;

use crate::entities::{Building, EntitySet, Line, LineRef, Platform, Station};
use crate::error::Result;
use crate::geometry::{centroid, Point3};

// Candidate keys per logical field, most specific first. Declared once here;
// the rest of the crate never touches raw records.
const CLASS_KEYS: &[&str] = &["Class", "class", "kind"];
const ID_KEYS: &[&str] = &["ID", "id", "Id"];
const NAME_KEYS: &[&str] = &["name", "Name", "title"];
const COLOR_KEYS: &[&str] = &["color", "colour", "Color"];
const DIRECTION_KEYS: &[&str] = &["direction", "Direction", "dir"];
const GEOMETRY_KEYS: &[&str] = &["geometry", "points", "geo", "shape"];
const POSITION_KEYS: &[&str] = &["position", "location", "center", "geometry"];
const STATION_ID_KEYS: &[&str] = &["stationID", "stationId", "station"];
const PLATFORM_LIST_KEYS: &[&str] = &["platformIDs", "platformIds", "platforms"];
const STATION_LIST_KEYS: &[&str] = &["stationIDs", "stationIds", "stations"];
const BUILDING_LIST_KEYS: &[&str] = &["buildingIDs", "buildingIds", "buildings"];
const SITUATION_KEYS: &[&str] = &["situation", "enabled"];
const CONNECT_KEYS: &[&str] = &["connect", "connected"];
const LINE_LIST_KEYS: &[&str] = &["lines", "lineRefs", "routes"];
const LINE_ID_KEYS: &[&str] = &["lineID", "lineId", "line", "ID", "id"];
const MILEAGE_KEYS: &[&str] = &["mileage", "km", "distance"];
const AVAILABLE_KEYS: &[&str] = &["available", "enable", "enabled"];
const OVERTAKING_KEYS: &[&str] = &["overtaking", "passThrough", "express"];
const NEXT_OT_KEYS: &[&str] = &["nextOT", "nextOt", "skipNext"];
const GET_IN_KEYS: &[&str] = &["getin", "getIn", "board"];
const GET_OUT_KEYS: &[&str] = &["getout", "getOut", "alight"];

/// Record discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityClass {
    Line,
    Station,
    Platform,
    Building,
}

impl EntityClass {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "line" => Some(EntityClass::Line),
            "station" => Some(EntityClass::Station),
            "platform" => Some(EntityClass::Platform),
            "building" => Some(EntityClass::Building),
            _ => None,
        }
    }
}

/// Parse a JSON document holding an array of entity records.
pub fn parse_records(text: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(text)?;
    Ok(match value {
        Value::Array(records) => records,
        other => vec![other],
    })
}

/// Convert raw records into typed entity collections.
///
/// Records with an unknown class, a missing id, or unusable geometry are
/// skipped and counted, never propagated as errors.
pub fn normalize_records(records: &[Value]) -> EntitySet {
    let mut set = EntitySet::default();

    for record in records {
        if !record.is_object() {
            set.skipped_records += 1;
            continue;
        }
        let class = string_field(record, CLASS_KEYS).and_then(|c| EntityClass::parse(&c));
        let Some(class) = class else {
            warn!("skipping record without a recognizable class discriminant");
            set.skipped_records += 1;
            continue;
        };

        let normalized = match class {
            EntityClass::Line => normalize_line(record).map(|line| set.lines.push(line)),
            EntityClass::Station => normalize_station(record).map(|s| set.stations.push(s)),
            EntityClass::Platform => normalize_platform(record).map(|p| set.platforms.push(p)),
            EntityClass::Building => normalize_building(record).map(|b| set.buildings.push(b)),
        };
        if normalized.is_none() {
            warn!(class = ?class, "skipping record with missing id or unusable geometry");
            set.skipped_records += 1;
        }
    }

    set
}

fn normalize_line(record: &Value) -> Option<Line> {
    let id = string_field(record, ID_KEYS)?;
    let points = points_field(record, GEOMETRY_KEYS)?;
    let name = string_field(record, NAME_KEYS).unwrap_or_else(|| id.clone());

    let mut line = Line::new(id, name, points);
    line.direction = string_field(record, DIRECTION_KEYS);
    line.color = string_field(record, COLOR_KEYS);
    Some(line)
}

fn normalize_station(record: &Value) -> Option<Station> {
    let id = string_field(record, ID_KEYS)?;
    let position = point_field_of(record, POSITION_KEYS)?;
    let name = string_field(record, NAME_KEYS).unwrap_or_else(|| id.clone());
    Some(Station {
        id,
        name,
        position,
        platforms: id_list_field(record, PLATFORM_LIST_KEYS),
        buildings: id_list_field(record, BUILDING_LIST_KEYS),
    })
}

fn normalize_platform(record: &Value) -> Option<Platform> {
    let id = string_field(record, ID_KEYS)?;
    let position = point_field_of(record, POSITION_KEYS)?;
    let name = string_field(record, NAME_KEYS).unwrap_or_else(|| id.clone());

    let line_refs = match first_match(record, LINE_LIST_KEYS).and_then(Value::as_array) {
        Some(entries) => entries.iter().filter_map(normalize_line_ref).collect(),
        None => Vec::new(),
    };

    Some(Platform {
        id,
        name,
        position,
        station: string_field(record, STATION_ID_KEYS),
        situation: bool_field(record, SITUATION_KEYS, true),
        connect: bool_field(record, CONNECT_KEYS, true),
        line_refs,
    })
}

fn normalize_line_ref(entry: &Value) -> Option<LineRef> {
    let line = string_field(entry, LINE_ID_KEYS)?;
    let mut line_ref = LineRef::new(line);
    line_ref.mileage_hint = f64_field(entry, MILEAGE_KEYS);
    line_ref.available = bool_field(entry, AVAILABLE_KEYS, true);
    line_ref.overtaking = bool_field(entry, OVERTAKING_KEYS, false);
    line_ref.next_ot = bool_field(entry, NEXT_OT_KEYS, false);
    line_ref.get_in = bool_field(entry, GET_IN_KEYS, true);
    line_ref.get_out = bool_field(entry, GET_OUT_KEYS, true);
    Some(line_ref)
}

fn normalize_building(record: &Value) -> Option<Building> {
    let id = string_field(record, ID_KEYS)?;
    // Building geometry may be a polygon footprint or a single point.
    let center = match points_field(record, GEOMETRY_KEYS) {
        Some(polygon) => centroid(&polygon)?,
        None => point_field_of(record, POSITION_KEYS)?,
    };
    let name = string_field(record, NAME_KEYS).unwrap_or_else(|| id.clone());
    Some(Building {
        id,
        name,
        center,
        stations: id_list_field(record, STATION_LIST_KEYS),
    })
}

/// First candidate key present on the record, regardless of value type.
fn first_match<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let object = record.as_object()?;
    keys.iter()
        .find_map(|key| object.get(*key))
        .filter(|value| !value.is_null())
}

/// String field; numeric values are accepted and stringified (ids are often
/// written as bare numbers).
fn string_field(record: &Value, keys: &[&str]) -> Option<String> {
    value_to_id(first_match(record, keys)?)
}

fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Finite float field; NaN, infinities, and non-numeric strings are absent.
fn f64_field(record: &Value, keys: &[&str]) -> Option<f64> {
    let value = first_match(record, keys)?;
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Tolerant boolean: `true`/`false`, 0/1, or their string spellings.
fn bool_field(record: &Value, keys: &[&str], default: bool) -> bool {
    match first_match(record, keys) {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().map(|n| n != 0.0).unwrap_or(default),
        Some(Value::String(text)) => match text.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => default,
        },
        _ => default,
    }
}

/// A single point, written as `{x, y, z}` or `[x, y, z]`; `y` defaults to 0.
/// Any non-finite component makes the point absent.
fn point_value(value: &Value) -> Option<Point3> {
    let point = match value {
        Value::Object(map) => {
            let x = map.get("x").and_then(Value::as_f64)?;
            let z = map.get("z").and_then(Value::as_f64)?;
            let y = map.get("y").and_then(Value::as_f64).unwrap_or(0.0);
            Point3::new(x, y, z)
        }
        Value::Array(parts) if parts.len() >= 2 => {
            let x = parts[0].as_f64()?;
            if parts.len() >= 3 {
                let y = parts[1].as_f64()?;
                let z = parts[2].as_f64()?;
                Point3::new(x, y, z)
            } else {
                let z = parts[1].as_f64()?;
                Point3::new(x, 0.0, z)
            }
        }
        _ => return None,
    };
    point.is_finite().then_some(point)
}

fn point_field_of(record: &Value, keys: &[&str]) -> Option<Point3> {
    point_value(first_match(record, keys)?)
}

/// An ordered point sequence; returns `None` unless at least one point parses.
fn points_field(record: &Value, keys: &[&str]) -> Option<Vec<Point3>> {
    let entries = first_match(record, keys)?.as_array()?;
    let points: Vec<Point3> = entries.iter().filter_map(point_value).collect();
    (!points.is_empty()).then_some(points)
}

/// A list of ids, tolerating numbers mixed with strings.
fn id_list_field(record: &Value, keys: &[&str]) -> Vec<String> {
    match first_match(record, keys).and_then(Value::as_array) {
        Some(entries) => entries.iter().filter_map(value_to_id).collect(),
        None => Vec::new(),
    }
}
