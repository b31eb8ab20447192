//! Journey planning orchestration.
//!
//! This module resolves the query endpoints to buildings, seeds the search
//! from every boardable state under the origin building, runs the selected
//! planner strategy, and hands the winning edge sequence to the result
//! assembler. The graph and world are immutable shared inputs; any number of
//! queries may run against one snapshot.

mod planner;

pub use planner::{select_planner, JourneyPlanner, LexicographicPlanner, PlannerStrategy, ScalarizedPlanner};

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::entities::{Building, BuildingId};
use crate::error::{Error, Result};
use crate::geometry::Point3;
use crate::graph::{Graph, StateKey};
use crate::itinerary::{assemble, AssemblyContext, Itinerary, RouteFailure, Segment};
use crate::search::{Objective, SearchSeed, TimeModel};
use crate::world::WorldData;

/// High-level journey planning request.
#[derive(Debug, Clone)]
pub struct JourneyRequest {
    pub start: Point3,
    pub end: Point3,
    /// Exact origin building; resolved by nearest center when absent.
    pub origin_building: Option<BuildingId>,
    /// Exact destination building; resolved by nearest center when absent.
    pub destination_building: Option<BuildingId>,
    pub objective: Objective,
    pub strategy: PlannerStrategy,
    pub time_model: TimeModel,
}

impl JourneyRequest {
    /// A request between two raw points with default objective and strategy.
    pub fn between(start: Point3, end: Point3) -> Self {
        Self {
            start,
            end,
            origin_building: None,
            destination_building: None,
            objective: Objective::default(),
            strategy: PlannerStrategy::default(),
            time_model: TimeModel::default(),
        }
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }
}

/// Plan a journey against an immutable world snapshot and its graph.
///
/// Unreachable or unresolvable queries yield a `found = false` itinerary with
/// a distinct [`RouteFailure`]; `Err` is reserved for malformed requests and
/// a graph that no longer matches the world generation.
pub fn plan_journey(
    world: &WorldData,
    graph: &Graph,
    request: &JourneyRequest,
) -> Result<Itinerary> {
    if !request.start.is_finite() || !request.end.is_finite() {
        return Err(Error::NonFiniteQueryPoint);
    }
    if graph.generation() != world.generation {
        return Err(Error::StaleGraph {
            graph: graph.generation(),
            world: world.generation,
        });
    }

    let origin = resolve_building(world, request.origin_building.as_deref(), &request.start);
    let destination =
        resolve_building(world, request.destination_building.as_deref(), &request.end);

    let (origin, destination) = match (origin, destination) {
        (Some(origin), Some(destination)) => (origin, destination),
        (origin, destination) => {
            let failure = if origin.is_none() {
                RouteFailure::OriginNotResolved
            } else {
                RouteFailure::DestinationNotResolved
            };
            warn!(?failure, "journey endpoints could not be resolved");
            return Ok(Itinerary::not_found(
                request.objective,
                failure,
                origin.map(|building| access_segment(request, building)),
                destination.map(|building| egress_segment(request, building)),
            ));
        }
    };

    let access = access_segment(request, origin);
    let egress = egress_segment(request, destination);
    let access_time = request.time_model.walk_time(
        request.start.planar_distance(&origin.center),
    );

    let seeds = boardable_seeds(world, graph, origin, access_time);
    if seeds.is_empty() {
        warn!(building = %origin.id, "origin building has no boardable states");
        return Ok(Itinerary::not_found(
            request.objective,
            RouteFailure::NoBoardableOrigin,
            Some(access),
            Some(egress),
        ));
    }

    let sinks = alightable_sinks(world, graph, destination);
    if sinks.is_empty() {
        warn!(building = %destination.id, "destination building has no alightable states");
        return Ok(Itinerary::not_found(
            request.objective,
            RouteFailure::NoAlightableDestination,
            Some(access),
            Some(egress),
        ));
    }

    let planner = select_planner(request.strategy);
    let Some(result) = planner.find_route(
        graph,
        &seeds,
        &sinks,
        &request.time_model,
        request.objective,
    ) else {
        debug!(origin = %origin.id, destination = %destination.id, "no connecting path");
        return Ok(Itinerary::not_found(
            request.objective,
            RouteFailure::NoPath,
            Some(access),
            Some(egress),
        ));
    };

    let context = AssemblyContext {
        world,
        time_model: &request.time_model,
        objective: request.objective,
        start: request.start,
        end: request.end,
        origin,
        destination,
    };
    Ok(assemble(&context, result.cost, &result.steps))
}

/// Exact building lookup when an id is given, else nearest center by planar
/// distance. `None` when the id is unknown or no buildings exist.
fn resolve_building<'a>(
    world: &'a WorldData,
    requested: Option<&str>,
    point: &Point3,
) -> Option<&'a Building> {
    if let Some(id) = requested {
        return world.buildings.get(id);
    }
    world.buildings.values().min_by(|a, b| {
        point
            .planar_distance(&a.center)
            .partial_cmp(&point.planar_distance(&b.center))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    })
}

fn access_segment(request: &JourneyRequest, building: &Building) -> Segment {
    let distance = request.start.planar_distance(&building.center);
    Segment::Access {
        from: request.start,
        to: building.center,
        distance,
        time: request.time_model.walk_time(distance),
    }
}

fn egress_segment(request: &JourneyRequest, building: &Building) -> Segment {
    let distance = building.center.planar_distance(&request.end);
    Segment::Egress {
        from: building.center,
        to: request.end,
        distance,
        time: request.time_model.walk_time(distance),
    }
}

/// Every boardable state under every station of a building, seeded with the
/// access time and zero transfers.
fn boardable_seeds(
    world: &WorldData,
    graph: &Graph,
    building: &Building,
    access_time: f64,
) -> Vec<SearchSeed> {
    building_states(world, graph, building, |info| info.get_in)
        .into_iter()
        .map(|state| SearchSeed { state, access_time })
        .collect()
}

/// Every alightable state under every station of a building.
fn alightable_sinks(world: &WorldData, graph: &Graph, building: &Building) -> HashSet<StateKey> {
    building_states(world, graph, building, |info| info.get_out)
        .into_iter()
        .collect()
}

fn building_states(
    world: &WorldData,
    graph: &Graph,
    building: &Building,
    permits: impl Fn(&crate::world::PlatformLineInfo) -> bool,
) -> Vec<StateKey> {
    let Some(stations) = world.building_stations.get(&building.id) else {
        return Vec::new();
    };
    let mut states = Vec::new();
    for station in stations {
        let Some(platforms) = world.station_platforms.get(station) else {
            continue;
        };
        for platform in platforms {
            let Some(record) = world.platforms.get(platform) else {
                continue;
            };
            for line_ref in &record.line_refs {
                let Some(info) = world.info(platform, &line_ref.line) else {
                    continue;
                };
                if !info.stop_allowed || !permits(info) {
                    continue;
                }
                let state = StateKey::new(platform.clone(), line_ref.line.clone());
                if graph.contains(&state) {
                    states.push(state);
                }
            }
        }
    }
    states.sort();
    states.dedup();
    states
}
