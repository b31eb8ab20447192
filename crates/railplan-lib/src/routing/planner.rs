//! Journey planning strategies.
//!
//! The scalarized strategy reproduces the historical behavior: under the
//! transfer objective, each transfer adds a penalty constant large enough to
//! dominate any feasible travel time. The lexicographic strategy orders
//! candidate paths by the (transfers, time) tuple directly, removing any risk
//! of an insufficient penalty on pathological inputs. Both minimize plain
//! travel time under the time objective.

use std::collections::HashSet;

use crate::graph::{Graph, StateKey};
use crate::search::{
    find_route_time, find_route_transfer_lexicographic, find_route_transfer_scalarized, Objective,
    SearchResult, SearchSeed, TimeModel,
};

/// Which planner implementation a request selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannerStrategy {
    /// Single-scalar weight with a dominating transfer penalty.
    #[default]
    Scalarized,
    /// Tuple comparator over (transfer count, time).
    Lexicographic,
}

/// Trait for journey planning strategies.
pub trait JourneyPlanner: Send + Sync {
    /// The strategy identifier for this planner.
    fn strategy(&self) -> PlannerStrategy;

    /// Execute the search from the seeded sources to the sink set.
    fn find_route(
        &self,
        graph: &Graph,
        seeds: &[SearchSeed],
        sinks: &HashSet<StateKey>,
        time_model: &TimeModel,
        objective: Objective,
    ) -> Option<SearchResult>;
}

/// Penalty-scalarized planner (the historical default).
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarizedPlanner;

impl JourneyPlanner for ScalarizedPlanner {
    fn strategy(&self) -> PlannerStrategy {
        PlannerStrategy::Scalarized
    }

    fn find_route(
        &self,
        graph: &Graph,
        seeds: &[SearchSeed],
        sinks: &HashSet<StateKey>,
        time_model: &TimeModel,
        objective: Objective,
    ) -> Option<SearchResult> {
        match objective {
            Objective::Time => find_route_time(graph, seeds, sinks, time_model),
            Objective::Transfer => {
                find_route_transfer_scalarized(graph, seeds, sinks, time_model)
            }
        }
    }
}

/// Tuple-comparator planner.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicographicPlanner;

impl JourneyPlanner for LexicographicPlanner {
    fn strategy(&self) -> PlannerStrategy {
        PlannerStrategy::Lexicographic
    }

    fn find_route(
        &self,
        graph: &Graph,
        seeds: &[SearchSeed],
        sinks: &HashSet<StateKey>,
        time_model: &TimeModel,
        objective: Objective,
    ) -> Option<SearchResult> {
        match objective {
            Objective::Time => find_route_time(graph, seeds, sinks, time_model),
            Objective::Transfer => {
                find_route_transfer_lexicographic(graph, seeds, sinks, time_model)
            }
        }
    }
}

/// Select the planner for a strategy choice.
pub fn select_planner(strategy: PlannerStrategy) -> Box<dyn JourneyPlanner> {
    match strategy {
        PlannerStrategy::Scalarized => Box::new(ScalarizedPlanner),
        PlannerStrategy::Lexicographic => Box::new(LexicographicPlanner),
    }
}
