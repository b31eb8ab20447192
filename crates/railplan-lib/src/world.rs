//! World Data Builder: turns normalized entities into an immutable, routable
//! world model.
//!
//! The output is rebuilt wholesale whenever source data changes; there is no
//! incremental update path. Each build carries an explicit `generation`
//! counter so downstream structures (the routing graph) can detect staleness.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::entities::{Building, BuildingId, EntitySet, Line, LineId, Platform, PlatformId, Station, StationId};
use crate::geometry::project_onto_polyline;

/// Relative hint-vs-projection deviation (as a fraction of line length) above
/// which a mileage hint is reported as suspicious. The hint still wins.
const MILEAGE_HINT_TOLERANCE: f64 = 0.05;

/// Derived per-platform-per-line routing attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformLineInfo {
    /// Along-line position, from the explicit hint (clamped to the line
    /// length) or the perpendicular polyline projection.
    pub mileage: f64,
    /// Platform enabled and line reference available: the pair participates
    /// in the line's stop ordering.
    pub node_enabled: bool,
    /// Trains actually stop here: `node_enabled`, not overtaking, and not
    /// suppressed by the previous stop's `next_ot` flag.
    pub stop_allowed: bool,
    /// Forces the next ordered stop on this line to be pass-through.
    pub next_ot: bool,
    pub get_in: bool,
    pub get_out: bool,
}

/// Counts of records excluded from the routable network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Lines discarded for having fewer than two geometry points.
    pub dropped_lines: usize,
    /// Lines discarded as shorter duplicates of an already-seen id.
    pub duplicate_lines: usize,
    /// Lines excluded from routing for having fewer than two enabled stops.
    pub unusable_lines: usize,
    /// Raw records the normalizer could not shape.
    pub skipped_records: usize,
}

/// Immutable routable world model.
///
/// All association indexes are resolved bidirectionally at build time; path
/// queries only read from this structure and never mutate it.
#[derive(Debug, Clone, Default)]
pub struct WorldData {
    pub generation: u64,
    pub lines: HashMap<LineId, Line>,
    pub stations: HashMap<StationId, Station>,
    pub platforms: HashMap<PlatformId, Platform>,
    pub buildings: HashMap<BuildingId, Building>,
    pub platform_station: HashMap<PlatformId, StationId>,
    pub station_platforms: HashMap<StationId, Vec<PlatformId>>,
    pub building_stations: HashMap<BuildingId, Vec<StationId>>,
    pub line_info: HashMap<(PlatformId, LineId), PlatformLineInfo>,
    /// Per line, ids of enabled platforms sorted ascending by mileage. Lines
    /// with fewer than two stops are absent.
    pub line_stops: HashMap<LineId, Vec<PlatformId>>,
    pub diagnostics: Diagnostics,
}

impl WorldData {
    /// Derived info for a platform-line pair, if the pair is routable.
    pub fn info(&self, platform: &str, line: &str) -> Option<&PlatformLineInfo> {
        self.line_info.get(&(platform.to_string(), line.to_string()))
    }

    /// Station owning a platform, resolved from either record direction.
    pub fn station_of(&self, platform: &str) -> Option<&Station> {
        self.platform_station
            .get(platform)
            .and_then(|id| self.stations.get(id))
    }

    /// Rider-facing name for a platform: its station's name when owned,
    /// otherwise the platform's own name.
    pub fn display_name(&self, platform: &str) -> Option<&str> {
        if let Some(station) = self.station_of(platform) {
            return Some(station.name.as_str());
        }
        self.platforms.get(platform).map(|p| p.name.as_str())
    }
}

/// Build the routable world model from normalized entities.
pub fn build_world_data(entities: EntitySet, generation: u64) -> WorldData {
    let mut world = WorldData {
        generation,
        ..WorldData::default()
    };
    world.diagnostics.skipped_records = entities.skipped_records;

    collect_lines(&mut world, entities.lines);
    for station in entities.stations {
        world.stations.insert(station.id.clone(), station);
    }
    for platform in entities.platforms {
        world.platforms.insert(platform.id.clone(), platform);
    }
    for building in entities.buildings {
        world.buildings.insert(building.id.clone(), building);
    }

    resolve_associations(&mut world);
    derive_line_info(&mut world);
    order_line_stops(&mut world);

    debug!(
        generation,
        lines = world.lines.len(),
        routable_lines = world.line_stops.len(),
        stations = world.stations.len(),
        platforms = world.platforms.len(),
        buildings = world.buildings.len(),
        dropped_lines = world.diagnostics.dropped_lines,
        duplicate_lines = world.diagnostics.duplicate_lines,
        unusable_lines = world.diagnostics.unusable_lines,
        "world data built"
    );

    world
}

/// Keep lines with usable geometry; duplicates keep the longer geometry.
fn collect_lines(world: &mut WorldData, lines: Vec<Line>) {
    for line in lines {
        if line.points.len() < 2 {
            warn!(line = %line.id, "dropping line with fewer than two geometry points");
            world.diagnostics.dropped_lines += 1;
            continue;
        }
        match world.lines.get(&line.id) {
            Some(existing) if existing.length() >= line.length() => {
                world.diagnostics.duplicate_lines += 1;
            }
            Some(_) => {
                world.diagnostics.duplicate_lines += 1;
                world.lines.insert(line.id.clone(), line);
            }
            None => {
                world.lines.insert(line.id.clone(), line);
            }
        }
    }
}

/// Merge platform↔station and station↔building links from both record sides.
fn resolve_associations(world: &mut WorldData) {
    let mut platform_station: HashMap<PlatformId, StationId> = HashMap::new();
    for platform in world.platforms.values() {
        if let Some(station) = &platform.station {
            if world.stations.contains_key(station) {
                platform_station.insert(platform.id.clone(), station.clone());
            }
        }
    }
    for station in world.stations.values() {
        for platform in &station.platforms {
            if world.platforms.contains_key(platform) {
                platform_station
                    .entry(platform.clone())
                    .or_insert_with(|| station.id.clone());
            }
        }
    }

    let mut station_platforms: HashMap<StationId, Vec<PlatformId>> = HashMap::new();
    for (platform, station) in &platform_station {
        station_platforms
            .entry(station.clone())
            .or_default()
            .push(platform.clone());
    }
    for platforms in station_platforms.values_mut() {
        platforms.sort();
    }

    let mut building_stations: HashMap<BuildingId, Vec<StationId>> = HashMap::new();
    for building in world.buildings.values() {
        for station in &building.stations {
            if world.stations.contains_key(station) {
                building_stations
                    .entry(building.id.clone())
                    .or_default()
                    .push(station.clone());
            }
        }
    }
    for station in world.stations.values() {
        for building in &station.buildings {
            if world.buildings.contains_key(building) {
                let stations = building_stations.entry(building.clone()).or_default();
                if !stations.contains(&station.id) {
                    stations.push(station.id.clone());
                }
            }
        }
    }
    for stations in building_stations.values_mut() {
        stations.sort();
        stations.dedup();
    }

    world.platform_station = platform_station;
    world.station_platforms = station_platforms;
    world.building_stations = building_stations;
}

/// Compute mileage and eligibility for every platform-line pair.
fn derive_line_info(world: &mut WorldData) {
    let mut line_info = HashMap::new();

    for platform in world.platforms.values() {
        for line_ref in &platform.line_refs {
            let Some(line) = world.lines.get(&line_ref.line) else {
                continue;
            };
            let projection =
                project_onto_polyline(&platform.position, &line.points, &line.cumulative);

            let mileage = match line_ref.mileage_hint {
                Some(hint) => {
                    let clamped = hint.clamp(0.0, line.length());
                    if let Some(projected) = projection {
                        let deviation = (clamped - projected.mileage).abs();
                        if line.length() > 0.0
                            && deviation > MILEAGE_HINT_TOLERANCE * line.length()
                        {
                            warn!(
                                platform = %platform.id,
                                line = %line.id,
                                hint = clamped,
                                projected = projected.mileage,
                                "mileage hint deviates from geometric projection"
                            );
                        }
                    }
                    clamped
                }
                None => match projection {
                    Some(projected) => projected.mileage,
                    None => continue,
                },
            };

            let node_enabled = platform.situation && line_ref.available;
            line_info.insert(
                (platform.id.clone(), line_ref.line.clone()),
                PlatformLineInfo {
                    mileage,
                    node_enabled,
                    stop_allowed: node_enabled && !line_ref.overtaking,
                    next_ot: line_ref.next_ot,
                    get_in: line_ref.get_in,
                    get_out: line_ref.get_out,
                },
            );
        }
    }

    world.line_info = line_info;
}

/// Sort each line's enabled platforms by mileage, apply the sequential
/// `next_ot` pass, and keep only lines with at least two stops.
fn order_line_stops(world: &mut WorldData) {
    let mut line_stops = HashMap::new();

    for line_id in world.lines.keys() {
        let mut stops: Vec<(PlatformId, f64)> = world
            .line_info
            .iter()
            .filter(|((_, line), info)| line == line_id && info.node_enabled)
            .map(|((platform, _), info)| (platform.clone(), info.mileage))
            .collect();

        stops.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        if stops.len() < 2 {
            if !stops.is_empty() {
                warn!(line = %line_id, "line has fewer than two enabled stops; excluded from routing");
                world.diagnostics.unusable_lines += 1;
            }
            continue;
        }

        // A stop flagged next_ot forces the following stop to be pass-through.
        for pair in stops.windows(2).map(|w| (w[0].0.clone(), w[1].0.clone())) {
            let previous_forces_skip = world
                .line_info
                .get(&(pair.0, line_id.clone()))
                .map(|info| info.next_ot)
                .unwrap_or(false);
            if previous_forces_skip {
                if let Some(info) = world.line_info.get_mut(&(pair.1, line_id.clone())) {
                    info.stop_allowed = false;
                }
            }
        }

        line_stops.insert(
            line_id.clone(),
            stops.into_iter().map(|(platform, _)| platform).collect(),
        );
    }

    world.line_stops = line_stops;
}
