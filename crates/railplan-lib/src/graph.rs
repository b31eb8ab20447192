//! Graph Builder: turns an immutable [`WorldData`] into the adjacency list
//! searched by the path finder.
//!
//! Nodes are traversal states, a (platform, line) pair rather than a platform
//! alone, because one platform may carry several independent lines. Edges are
//! one of: forward rail hops between adjacent stops, zero-cost hidden
//! connectors splicing the states of an infrastructure platform, and
//! passenger transfers grouped by station or by building.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::entities::{LineId, PlatformId, StationId};
use crate::geometry::{slice_polyline, Point3};
use crate::world::WorldData;

/// Graph node identity: one line's view of one platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StateKey {
    pub platform: PlatformId,
    pub line: LineId,
}

impl StateKey {
    pub fn new(platform: impl Into<PlatformId>, line: impl Into<LineId>) -> Self {
        Self {
            platform: platform.into(),
            line: line.into(),
        }
    }
}

/// Classification of a graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Forward hop between two adjacent stops of one line.
    Rail,
    /// Zero-cost splice between the line-states of a hidden platform.
    Connector,
    /// Walkless transfer between platforms of one station.
    StationTransfer,
    /// Indoor walk between stations aggregated by one building.
    BuildingTransfer,
}

impl EdgeKind {
    /// Whether traversing this edge counts as a rider transfer.
    pub fn counts_as_transfer(self) -> bool {
        matches!(self, EdgeKind::StationTransfer | EdgeKind::BuildingTransfer)
    }
}

/// Edge within the routing graph.
#[derive(Debug, Clone)]
pub struct Edge {
    pub to: StateKey,
    pub kind: EdgeKind,
    /// Raw distance: mileage difference for rail edges, straight-line station
    /// distance for building transfers, zero otherwise.
    pub distance: f64,
    /// Polyline slice for rail edges; empty for all other kinds.
    pub geometry: Vec<Point3>,
}

/// Adjacency list searched by the path finder.
///
/// Immutable and cheaply cloneable; any number of queries may run against the
/// same graph without interference. The generation ties the graph to the
/// world snapshot it was built from.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    generation: u64,
    adjacency: Arc<HashMap<StateKey, Vec<Edge>>>,
}

impl Graph {
    /// World generation this graph was built from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Outgoing edges for a traversal state.
    pub fn neighbours(&self, state: &StateKey) -> &[Edge] {
        self.adjacency
            .get(state)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the state participates in the routable network.
    pub fn contains(&self, state: &StateKey) -> bool {
        self.adjacency.contains_key(state)
    }

    pub fn state_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }
}

/// Build the routing graph for a world snapshot.
pub fn build_graph(world: &WorldData) -> Graph {
    let mut adjacency: HashMap<StateKey, Vec<Edge>> = HashMap::new();
    let states_by_platform = collect_states(world, &mut adjacency);

    add_rail_edges(world, &mut adjacency);
    add_connector_edges(world, &states_by_platform, &mut adjacency);
    add_station_transfers(world, &states_by_platform, &mut adjacency);
    add_building_transfers(world, &states_by_platform, &mut adjacency);

    let graph = Graph {
        generation: world.generation,
        adjacency: Arc::new(adjacency),
    };
    debug!(
        generation = graph.generation,
        states = graph.state_count(),
        edges = graph.edge_count(),
        "routing graph built"
    );
    graph
}

/// Register every stop of every usable line as a graph state and index the
/// states per platform.
fn collect_states(
    world: &WorldData,
    adjacency: &mut HashMap<StateKey, Vec<Edge>>,
) -> HashMap<PlatformId, Vec<LineId>> {
    let mut states_by_platform: HashMap<PlatformId, Vec<LineId>> = HashMap::new();
    for (line, stops) in &world.line_stops {
        for platform in stops {
            adjacency
                .entry(StateKey::new(platform.clone(), line.clone()))
                .or_default();
            states_by_platform
                .entry(platform.clone())
                .or_default()
                .push(line.clone());
        }
    }
    for lines in states_by_platform.values_mut() {
        lines.sort();
    }
    states_by_platform
}

/// Forward rail edges between adjacent ordered stops. Never the reverse:
/// travel follows polyline point order, and the opposite direction is a
/// separate line record.
fn add_rail_edges(world: &WorldData, adjacency: &mut HashMap<StateKey, Vec<Edge>>) {
    for (line_id, stops) in &world.line_stops {
        let Some(line) = world.lines.get(line_id) else {
            continue;
        };
        for pair in stops.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            let (Some(from_info), Some(to_info)) =
                (world.info(from, line_id), world.info(to, line_id))
            else {
                continue;
            };
            let distance = (to_info.mileage - from_info.mileage).abs();
            let geometry = slice_polyline(
                &line.points,
                &line.cumulative,
                from_info.mileage,
                to_info.mileage,
            );
            adjacency
                .entry(StateKey::new(from.clone(), line_id.clone()))
                .or_default()
                .push(Edge {
                    to: StateKey::new(to.clone(), line_id.clone()),
                    kind: EdgeKind::Rail,
                    distance,
                    geometry,
                });
        }
    }
}

/// Zero-cost cliques between the line-states of hidden platforms. These
/// splice operationally-equivalent but geometrically separate line segments
/// into one network and never count as a rider transfer.
fn add_connector_edges(
    world: &WorldData,
    states_by_platform: &HashMap<PlatformId, Vec<LineId>>,
    adjacency: &mut HashMap<StateKey, Vec<Edge>>,
) {
    for (platform_id, lines) in states_by_platform {
        let Some(platform) = world.platforms.get(platform_id) else {
            continue;
        };
        if platform.connect || lines.len() < 2 {
            continue;
        }
        for from_line in lines {
            for to_line in lines {
                if from_line == to_line {
                    continue;
                }
                adjacency
                    .entry(StateKey::new(platform_id.clone(), from_line.clone()))
                    .or_default()
                    .push(Edge {
                        to: StateKey::new(platform_id.clone(), to_line.clone()),
                        kind: EdgeKind::Connector,
                        distance: 0.0,
                        geometry: Vec::new(),
                    });
            }
        }
    }
}

/// States of a station's platforms that permit alighting.
fn alight_states(
    world: &WorldData,
    states_by_platform: &HashMap<PlatformId, Vec<LineId>>,
    platforms: &[PlatformId],
) -> Vec<StateKey> {
    collect_transfer_states(world, states_by_platform, platforms, |info| info.get_out)
}

/// States of a station's platforms that permit boarding.
fn board_states(
    world: &WorldData,
    states_by_platform: &HashMap<PlatformId, Vec<LineId>>,
    platforms: &[PlatformId],
) -> Vec<StateKey> {
    collect_transfer_states(world, states_by_platform, platforms, |info| info.get_in)
}

fn collect_transfer_states(
    world: &WorldData,
    states_by_platform: &HashMap<PlatformId, Vec<LineId>>,
    platforms: &[PlatformId],
    permits: impl Fn(&crate::world::PlatformLineInfo) -> bool,
) -> Vec<StateKey> {
    let mut states = Vec::new();
    for platform in platforms {
        let Some(lines) = states_by_platform.get(platform) else {
            continue;
        };
        for line in lines {
            let Some(info) = world.info(platform, line) else {
                continue;
            };
            if info.stop_allowed && permits(info) {
                states.push(StateKey::new(platform.clone(), line.clone()));
            }
        }
    }
    states
}

/// Zero-distance transfers between every alight state and every distinct
/// board state of one station.
fn add_station_transfers(
    world: &WorldData,
    states_by_platform: &HashMap<PlatformId, Vec<LineId>>,
    adjacency: &mut HashMap<StateKey, Vec<Edge>>,
) {
    for platforms in world.station_platforms.values() {
        let alight = alight_states(world, states_by_platform, platforms);
        let board = board_states(world, states_by_platform, platforms);
        for from in &alight {
            for to in &board {
                if from == to {
                    continue;
                }
                adjacency.entry(from.clone()).or_default().push(Edge {
                    to: to.clone(),
                    kind: EdgeKind::StationTransfer,
                    distance: 0.0,
                    geometry: Vec::new(),
                });
            }
        }
    }
}

/// Cross-station transfers inside one building; distance is the straight
/// line between the two stations. Same-station pairs are skipped; they are
/// already connected at zero cost by the station transfers.
fn add_building_transfers(
    world: &WorldData,
    states_by_platform: &HashMap<PlatformId, Vec<LineId>>,
    adjacency: &mut HashMap<StateKey, Vec<Edge>>,
) {
    for stations in world.building_stations.values() {
        let grouped: Vec<(&StationId, Vec<StateKey>, Vec<StateKey>)> = stations
            .iter()
            .filter_map(|station_id| {
                let platforms = world.station_platforms.get(station_id)?;
                Some((
                    station_id,
                    alight_states(world, states_by_platform, platforms),
                    board_states(world, states_by_platform, platforms),
                ))
            })
            .collect();

        for (from_station, alight, _) in &grouped {
            for (to_station, _, board) in &grouped {
                if from_station == to_station {
                    continue;
                }
                let distance = match (
                    world.stations.get(from_station.as_str()),
                    world.stations.get(to_station.as_str()),
                ) {
                    (Some(a), Some(b)) => a.position.planar_distance(&b.position),
                    _ => continue,
                };
                for from in alight {
                    for to in board {
                        adjacency.entry(from.clone()).or_default().push(Edge {
                            to: to.clone(),
                            kind: EdgeKind::BuildingTransfer,
                            distance,
                            geometry: Vec::new(),
                        });
                    }
                }
            }
        }
    }
}
