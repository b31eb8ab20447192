//! Test-only fixture builders shared by the unit tests.

use crate::entities::{Building, EntitySet, Line, LineRef, Platform, Station};
use crate::geometry::Point3;

/// A line from planar `(x, z)` vertices; elevation is zero.
pub fn line(id: &str, vertices: &[(f64, f64)]) -> Line {
    let points = vertices
        .iter()
        .map(|(x, z)| Point3::new(*x, 0.0, *z))
        .collect();
    Line::new(id.to_string(), format!("Line {id}"), points)
}

/// A fully-open platform referencing the given lines.
pub fn platform(id: &str, position: (f64, f64), station: Option<&str>, lines: &[&str]) -> Platform {
    Platform {
        id: id.to_string(),
        name: format!("Platform {id}"),
        position: Point3::new(position.0, 0.0, position.1),
        station: station.map(str::to_string),
        situation: true,
        connect: true,
        line_refs: lines.iter().map(|l| LineRef::new(l.to_string())).collect(),
    }
}

/// Adjust the reference to `line_id` on a platform.
pub fn with_ref(mut platform: Platform, line_id: &str, adjust: impl FnOnce(&mut LineRef)) -> Platform {
    if let Some(line_ref) = platform.line_refs.iter_mut().find(|r| r.line == line_id) {
        adjust(line_ref);
    }
    platform
}

/// Incremental [`EntitySet`] construction for tests.
#[derive(Default)]
pub struct EntitySetBuilder {
    set: EntitySet,
}

impl EntitySetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(mut self, line: Line) -> Self {
        self.set.lines.push(line);
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.set.platforms.push(platform);
        self
    }

    /// A station that declares its platform ownership on the station side.
    pub fn station_with_platforms(
        mut self,
        id: &str,
        position: (f64, f64),
        platforms: &[&str],
    ) -> Self {
        self.set.stations.push(Station {
            id: id.to_string(),
            name: format!("Station {id}"),
            position: Point3::new(position.0, 0.0, position.1),
            platforms: platforms.iter().map(|p| p.to_string()).collect(),
            buildings: Vec::new(),
        });
        self
    }

    /// A station that declares its building membership on the station side.
    pub fn station_in_building(mut self, id: &str, position: (f64, f64), building: &str) -> Self {
        self.set.stations.push(Station {
            id: id.to_string(),
            name: format!("Station {id}"),
            position: Point3::new(position.0, 0.0, position.1),
            platforms: Vec::new(),
            buildings: vec![building.to_string()],
        });
        self
    }

    pub fn building(mut self, id: &str, center: (f64, f64), stations: &[&str]) -> Self {
        self.set.buildings.push(Building {
            id: id.to_string(),
            name: format!("Building {id}"),
            center: Point3::new(center.0, 0.0, center.1),
            stations: stations.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn build(self) -> EntitySet {
        self.set
    }
}
