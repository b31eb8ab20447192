//! Result Assembler: converts a winning edge sequence into the rider-facing
//! itinerary consumed by the renderer/UI.

use serde::Serialize;

use crate::entities::{Building, LineId};
use crate::geometry::Point3;
use crate::graph::EdgeKind;
use crate::search::{Cost, Objective, PathStep, TimeModel};
use crate::world::WorldData;

/// Shown when a transfer happens between locations that are all unnamed or
/// hidden from the rider.
const UNNAMED_TRANSFER: &str = "(transfer)";

/// Shown when a rail run starts or ends at a hidden splice platform, which
/// must never surface its own name.
const UNNAMED_STOP: &str = "(through service)";

/// Why a journey query produced no rail route.
///
/// The editing UI collapses all of these into "not found"; they are kept
/// distinct here for debuggability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteFailure {
    /// No building matched the requested origin.
    OriginNotResolved,
    /// No building matched the requested destination.
    DestinationNotResolved,
    /// The origin building has no boardable traversal state.
    NoBoardableOrigin,
    /// The destination building has no alightable traversal state.
    NoAlightableDestination,
    /// Both endpoints resolved but no connecting path exists.
    NoPath,
}

/// One displayable leg of the itinerary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Segment {
    /// Walk from the raw query point to the origin building.
    Access {
        from: Point3,
        to: Point3,
        distance: f64,
        time: f64,
    },
    /// A maximal run of consecutive rail hops on one line.
    Rail {
        line: LineId,
        line_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        from_station: String,
        to_station: String,
        /// Rider-visible intermediate stations, in order, de-duplicated.
        /// Hidden or pass-through platforms are traversed but not listed.
        via_stations: Vec<String>,
        distance: f64,
        time: f64,
    },
    /// A visible passenger transfer with a nonzero walking distance.
    Transfer {
        location: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        from_station: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        to_station: Option<String>,
        distance: f64,
        time: f64,
    },
    /// Walk from the destination building to the raw query point.
    Egress {
        from: Point3,
        to: Point3,
        distance: f64,
        time: f64,
    },
}

/// Aggregate journey totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub rail_distance: f64,
    pub transfer_distance: f64,
    pub walk_distance: f64,
    pub total_time: f64,
    pub transfers: u32,
}

/// Structured journey result for the external renderer/UI.
#[derive(Debug, Clone, Serialize)]
pub struct Itinerary {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<RouteFailure>,
    pub objective: Objective,
    pub segments: Vec<Segment>,
    pub totals: Totals,
    /// Flattened, duplicate-collapsed coordinate sequence for highlighting.
    pub highlight: Vec<Point3>,
}

impl Itinerary {
    /// A not-found result carrying whatever access/egress legs could still be
    /// computed, so a walking-only fallback can be shown.
    pub fn not_found(
        objective: Objective,
        failure: RouteFailure,
        access: Option<Segment>,
        egress: Option<Segment>,
    ) -> Self {
        let mut totals = Totals::default();
        let mut segments = Vec::new();
        for segment in access.into_iter().chain(egress) {
            if let Segment::Access { distance, time, .. } | Segment::Egress { distance, time, .. } =
                &segment
            {
                totals.walk_distance += distance;
                totals.total_time += time;
            }
            segments.push(segment);
        }
        Self {
            found: false,
            failure: Some(failure),
            objective,
            segments,
            totals,
            highlight: Vec::new(),
        }
    }
}

/// Everything the assembler needs besides the edge sequence itself.
pub(crate) struct AssemblyContext<'a> {
    pub world: &'a WorldData,
    pub time_model: &'a TimeModel,
    pub objective: Objective,
    pub start: Point3,
    pub end: Point3,
    pub origin: &'a Building,
    pub destination: &'a Building,
}

/// Assemble the displayable itinerary from the winning edge sequence.
pub(crate) fn assemble(context: &AssemblyContext<'_>, cost: Cost, steps: &[PathStep]) -> Itinerary {
    let mut segments = Vec::new();
    let mut highlight = Vec::new();
    let mut totals = Totals {
        transfers: cost.transfers,
        ..Totals::default()
    };

    let access_distance = context.start.planar_distance(&context.origin.center);
    let access_time = context.time_model.walk_time(access_distance);
    segments.push(Segment::Access {
        from: context.start,
        to: context.origin.center,
        distance: access_distance,
        time: access_time,
    });
    totals.walk_distance += access_distance;
    push_point(&mut highlight, context.start);
    push_point(&mut highlight, context.origin.center);

    let mut index = 0;
    while index < steps.len() {
        let step = &steps[index];
        match step.edge.kind {
            EdgeKind::Rail => {
                index = assemble_rail_run(context, steps, index, &mut segments, &mut highlight, &mut totals);
            }
            EdgeKind::StationTransfer | EdgeKind::BuildingTransfer => {
                assemble_transfer(context, step, &mut segments, &mut highlight, &mut totals);
                index += 1;
            }
            // Hidden connectors are traversed silently.
            EdgeKind::Connector => index += 1,
        }
    }

    let egress_distance = context.destination.center.planar_distance(&context.end);
    let egress_time = context.time_model.walk_time(egress_distance);
    push_point(&mut highlight, context.destination.center);
    push_point(&mut highlight, context.end);
    segments.push(Segment::Egress {
        from: context.destination.center,
        to: context.end,
        distance: egress_distance,
        time: egress_time,
    });
    totals.walk_distance += egress_distance;

    // The search cost already includes the access time from seeding.
    totals.total_time = cost.time + egress_time;

    Itinerary {
        found: true,
        failure: None,
        objective: context.objective,
        segments,
        totals,
        highlight,
    }
}

/// Merge the maximal run of consecutive same-line rail edges starting at
/// `start_index` into one segment. Returns the index after the run.
fn assemble_rail_run(
    context: &AssemblyContext<'_>,
    steps: &[PathStep],
    start_index: usize,
    segments: &mut Vec<Segment>,
    highlight: &mut Vec<Point3>,
    totals: &mut Totals,
) -> usize {
    let world = context.world;
    let line_id = steps[start_index].from.line.clone();
    let mut distance = 0.0;
    let mut time = 0.0;
    let mut via_stations: Vec<String> = Vec::new();
    let mut index = start_index;

    while index < steps.len() {
        let step = &steps[index];
        if step.edge.kind != EdgeKind::Rail || step.from.line != line_id {
            break;
        }
        distance += step.edge.distance;
        time += context.time_model.edge_time(&step.edge);
        for point in &step.edge.geometry {
            push_point(highlight, *point);
        }

        // The hop's destination is an intermediate unless it ends the run.
        let run_continues = steps
            .get(index + 1)
            .map(|next| next.edge.kind == EdgeKind::Rail && next.from.line == line_id)
            .unwrap_or(false);
        if run_continues {
            if let Some(name) = visible_station_name(world, &step.edge.to.platform, &line_id) {
                if via_stations.last().map(String::as_str) != Some(name) {
                    via_stations.push(name.to_string());
                }
            }
        }
        index += 1;
    }

    let from_station = rail_endpoint_name(world, &steps[start_index].from.platform, &line_id);
    let to_station = rail_endpoint_name(world, &steps[index - 1].edge.to.platform, &line_id);
    via_stations.retain(|name| name != &from_station && name != &to_station);

    let (line_name, color) = match world.lines.get(&line_id) {
        Some(line) => (line.name.clone(), line.color.clone()),
        None => (line_id.clone(), None),
    };

    totals.rail_distance += distance;
    segments.push(Segment::Rail {
        line: line_id,
        line_name,
        color,
        from_station,
        to_station,
        via_stations,
        distance,
        time,
    });
    index
}

fn assemble_transfer(
    context: &AssemblyContext<'_>,
    step: &PathStep,
    segments: &mut Vec<Segment>,
    highlight: &mut Vec<Point3>,
    totals: &mut Totals,
) {
    let world = context.world;
    totals.transfer_distance += step.edge.distance;

    // Zero-distance transfers happen in place and are not displayed.
    if step.edge.distance <= 0.0 {
        return;
    }

    let from_station = world.station_of(&step.from.platform);
    let to_station = world.station_of(&step.edge.to.platform);
    if let Some(station) = from_station {
        push_point(highlight, station.position);
    }
    if let Some(station) = to_station {
        push_point(highlight, station.position);
    }

    let from_name = visible_station_name(world, &step.from.platform, &step.from.line);
    let to_name = visible_station_name(world, &step.edge.to.platform, &step.edge.to.line);
    let location = from_name
        .or(to_name)
        .unwrap_or(UNNAMED_TRANSFER)
        .to_string();

    segments.push(Segment::Transfer {
        location,
        from_station: from_name.map(str::to_string),
        to_station: to_name.map(str::to_string),
        distance: step.edge.distance,
        time: context.time_model.edge_time(&step.edge),
    });
}

/// Rail segment endpoint label. Hidden splice platforms get a placeholder
/// instead of leaking their internal name.
fn rail_endpoint_name(world: &WorldData, platform: &str, line: &str) -> String {
    visible_station_name(world, platform, line)
        .unwrap_or(UNNAMED_STOP)
        .to_string()
}

/// Station name of a platform when the rider can see it: the platform must be
/// a connected, stop-allowed node on the given line.
fn visible_station_name<'a>(world: &'a WorldData, platform: &str, line: &str) -> Option<&'a str> {
    let record = world.platforms.get(platform)?;
    if !record.connect {
        return None;
    }
    let info = world.info(platform, line)?;
    if !info.stop_allowed {
        return None;
    }
    world.display_name(platform)
}

fn push_point(highlight: &mut Vec<Point3>, point: Point3) {
    if highlight.last() != Some(&point) {
        highlight.push(point);
    }
}
