//! Railplan library entry points.
//!
//! This crate is the path-planning core of the map editor: it normalizes
//! loosely-typed entity records into an immutable world model, builds a
//! directed graph of traversal states, and computes shortest journeys under a
//! minimum-time or minimum-transfer objective. Consumers (the editor UI and
//! renderer) should only depend on the types exported here.

#![deny(warnings)]

pub mod entities;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod itinerary;
pub mod normalize;
pub mod routing;
pub mod search;
pub mod world;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use entities::{Building, EntitySet, Line, LineRef, Platform, Station};
pub use error::{Error, Result};
pub use geometry::Point3;
pub use graph::{build_graph, Edge, EdgeKind, Graph, StateKey};
pub use itinerary::{Itinerary, RouteFailure, Segment, Totals};
pub use normalize::{normalize_records, parse_records};
pub use routing::{plan_journey, JourneyRequest, PlannerStrategy};
pub use search::{Objective, TimeModel, BUILDING_TRANSFER_DAMPING, TRANSFER_PENALTY};
pub use world::{build_world_data, Diagnostics, PlatformLineInfo, WorldData};
