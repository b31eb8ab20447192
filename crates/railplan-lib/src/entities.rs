//! Typed world records produced by the normalization layer.
//!
//! The graph and search core only ever sees these types; loosely-typed source
//! records stop at [`crate::normalize`].

use crate::geometry::{cumulative_distances, Point3};

/// Identifier for a rail line.
pub type LineId = String;
/// Identifier for a station.
pub type StationId = String;
/// Identifier for a platform.
pub type PlatformId = String;
/// Identifier for a building.
pub type BuildingId = String;

/// One-directional rail line following its polyline point order.
///
/// Bidirectional travel is modeled as two separate line records.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub id: LineId,
    pub direction: Option<String>,
    pub name: String,
    pub color: Option<String>,
    pub points: Vec<Point3>,
    /// Cumulative along-polyline distance per vertex, `cumulative[0] == 0`.
    pub cumulative: Vec<f64>,
}

impl Line {
    pub fn new(id: LineId, name: String, points: Vec<Point3>) -> Self {
        let cumulative = cumulative_distances(&points);
        Self {
            id,
            direction: None,
            name,
            color: None,
            points,
            cumulative,
        }
    }

    /// Total along-polyline length.
    pub fn length(&self) -> f64 {
        *self.cumulative.last().unwrap_or(&0.0)
    }
}

/// Reference from a platform to a line it serves.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRef {
    pub line: LineId,
    /// Explicit along-line position; overrides geometric projection when set.
    pub mileage_hint: Option<f64>,
    pub available: bool,
    /// Trains pass without stopping at this platform.
    pub overtaking: bool,
    /// Forces the *next* stop in line order to be pass-through as well.
    pub next_ot: bool,
    pub get_in: bool,
    pub get_out: bool,
}

impl LineRef {
    pub fn new(line: LineId) -> Self {
        Self {
            line,
            mileage_hint: None,
            available: true,
            overtaking: false,
            next_ot: false,
            get_in: true,
            get_out: true,
        }
    }
}

/// A single platform, possibly serving multiple independent lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    pub id: PlatformId,
    pub name: String,
    pub position: Point3,
    pub station: Option<StationId>,
    /// Operationally enabled.
    pub situation: bool,
    /// `false` marks a hidden infrastructure node, not a rider-visible stop.
    pub connect: bool,
    pub line_refs: Vec<LineRef>,
}

/// A station owning one or more platforms.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub position: Point3,
    pub platforms: Vec<PlatformId>,
    pub buildings: Vec<BuildingId>,
}

/// A building aggregating stations (many-to-many).
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub id: BuildingId,
    pub name: String,
    pub center: Point3,
    pub stations: Vec<StationId>,
}

/// Normalized entity collections handed to the world builder.
#[derive(Debug, Clone, Default)]
pub struct EntitySet {
    pub lines: Vec<Line>,
    pub stations: Vec<Station>,
    pub platforms: Vec<Platform>,
    pub buildings: Vec<Building>,
    /// Records dropped for shape errors during normalization.
    pub skipped_records: usize,
}
