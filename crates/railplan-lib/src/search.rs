//! Generalized Dijkstra search over the routing graph.
//!
//! The search is seeded from multiple source states (every boardable state of
//! the origin building) and terminates at the first settlement of any sink
//! state, which is valid because all edge weights are non-negative. The
//! priority key is pluggable: a plain travel-time scalar, the scalarized
//! transfer objective, or a lexicographic (transfers, time) tuple.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::graph::{Edge, EdgeKind, Graph, StateKey};

/// Optimization objective for a journey query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Minimize total travel time.
    #[default]
    Time,
    /// Minimize transfer count, then travel time.
    Transfer,
}

/// Divisor applied to building-transfer walking: indoor transfers between
/// co-located stations are much faster than the open-air straight line.
pub const BUILDING_TRANSFER_DAMPING: f64 = 10.0;

/// Penalty added per transfer under the scalarized transfer objective.
///
/// Must exceed any feasible accumulated travel time so the search never
/// trades one extra transfer for any amount of time saved; among
/// equal-transfer paths it then naturally minimizes time. At the default
/// walking speed this corresponds to roughly thirty thousand years of
/// travel, far beyond any finite network.
pub const TRANSFER_PENALTY: f64 = 1.0e12;

/// External time model mapping distances to travel time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeModel {
    /// Rail cruising speed in world units per second.
    pub rail_speed: f64,
    /// Walking speed in world units per second.
    pub walk_speed: f64,
}

impl Default for TimeModel {
    fn default() -> Self {
        Self {
            rail_speed: 16.7,
            walk_speed: 1.4,
        }
    }
}

impl TimeModel {
    pub fn rail_time(&self, distance: f64) -> f64 {
        distance / self.rail_speed
    }

    pub fn walk_time(&self, distance: f64) -> f64 {
        distance / self.walk_speed
    }

    /// Travel time for one edge. Station transfers and hidden connectors are
    /// free; building transfers walk the damped indoor distance.
    pub fn edge_time(&self, edge: &Edge) -> f64 {
        match edge.kind {
            EdgeKind::Rail => self.rail_time(edge.distance),
            EdgeKind::StationTransfer | EdgeKind::Connector => 0.0,
            EdgeKind::BuildingTransfer => self.walk_time(edge.distance / BUILDING_TRANSFER_DAMPING),
        }
    }
}

/// Accumulated cost of a partial path. Non-negative by construction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cost {
    pub transfers: u32,
    pub time: f64,
}

impl Cost {
    fn extend(self, time_model: &TimeModel, edge: &Edge) -> Self {
        Self {
            transfers: self.transfers + u32::from(edge.kind.counts_as_transfer()),
            time: self.time + time_model.edge_time(edge),
        }
    }

    /// Scalarized transfer objective: transfers dominate, time breaks ties.
    fn scalarized(&self) -> f64 {
        f64::from(self.transfers) * TRANSFER_PENALTY + self.time
    }
}

/// A seeded source state with its access time.
#[derive(Debug, Clone)]
pub struct SearchSeed {
    pub state: StateKey,
    pub access_time: f64,
}

/// One hop of a reconstructed route.
#[derive(Debug, Clone)]
pub struct PathStep {
    pub from: StateKey,
    pub edge: Edge,
}

/// Winning route of a search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub goal: StateKey,
    pub cost: Cost,
    pub steps: Vec<PathStep>,
}

/// Dijkstra keyed by travel time alone.
pub fn find_route_time(
    graph: &Graph,
    seeds: &[SearchSeed],
    sinks: &HashSet<StateKey>,
    time_model: &TimeModel,
) -> Option<SearchResult> {
    dijkstra_multi(graph, seeds, sinks, time_model, |cost| FloatOrd(cost.time))
}

/// Dijkstra keyed by the scalarized transfer objective
/// (`transfers * TRANSFER_PENALTY + time`).
pub fn find_route_transfer_scalarized(
    graph: &Graph,
    seeds: &[SearchSeed],
    sinks: &HashSet<StateKey>,
    time_model: &TimeModel,
) -> Option<SearchResult> {
    dijkstra_multi(graph, seeds, sinks, time_model, |cost| {
        FloatOrd(cost.scalarized())
    })
}

/// Dijkstra keyed by the lexicographic (transfers, time) tuple. Immune to
/// penalty-overflow on pathological inputs.
pub fn find_route_transfer_lexicographic(
    graph: &Graph,
    seeds: &[SearchSeed],
    sinks: &HashSet<StateKey>,
    time_model: &TimeModel,
) -> Option<SearchResult> {
    dijkstra_multi(graph, seeds, sinks, time_model, |cost| {
        (cost.transfers, FloatOrd(cost.time))
    })
}

fn dijkstra_multi<K, F>(
    graph: &Graph,
    seeds: &[SearchSeed],
    sinks: &HashSet<StateKey>,
    time_model: &TimeModel,
    key_of: F,
) -> Option<SearchResult>
where
    K: Ord + Copy,
    F: Fn(&Cost) -> K,
{
    if seeds.is_empty() || sinks.is_empty() {
        return None;
    }

    let mut best: HashMap<StateKey, K> = HashMap::new();
    let mut costs: HashMap<StateKey, Cost> = HashMap::new();
    // Parent state plus the index of the edge taken out of it.
    let mut parents: HashMap<StateKey, (StateKey, usize)> = HashMap::new();
    let mut queue: BinaryHeap<QueueEntry<K>> = BinaryHeap::new();

    for seed in seeds {
        if !graph.contains(&seed.state) {
            continue;
        }
        let cost = Cost {
            transfers: 0,
            time: seed.access_time.max(0.0),
        };
        let key = key_of(&cost);
        let improves = best
            .get(&seed.state)
            .map(|current| key < *current)
            .unwrap_or(true);
        if improves {
            best.insert(seed.state.clone(), key);
            costs.insert(seed.state.clone(), cost);
            queue.push(QueueEntry::new(seed.state.clone(), key));
        }
    }

    while let Some(entry) = queue.pop() {
        match best.get(&entry.state) {
            Some(current) if *current < entry.key => continue,
            Some(_) => {}
            None => continue,
        }

        if sinks.contains(&entry.state) {
            let cost = costs.get(&entry.state).copied()?;
            let steps = reconstruct_steps(graph, &parents, &entry.state);
            return Some(SearchResult {
                goal: entry.state,
                cost,
                steps,
            });
        }

        let current_cost = match costs.get(&entry.state) {
            Some(cost) => *cost,
            None => continue,
        };

        for (index, edge) in graph.neighbours(&entry.state).iter().enumerate() {
            let next_cost = current_cost.extend(time_model, edge);
            let next_key = key_of(&next_cost);
            let improves = best
                .get(&edge.to)
                .map(|current| next_key < *current)
                .unwrap_or(true);
            if improves {
                best.insert(edge.to.clone(), next_key);
                costs.insert(edge.to.clone(), next_cost);
                parents.insert(edge.to.clone(), (entry.state.clone(), index));
                queue.push(QueueEntry::new(edge.to.clone(), next_key));
            }
        }
    }

    None
}

/// Back-walk the predecessor links from a settled sink and reverse into the
/// ordered hop sequence. Seed states have no parent and end the walk.
fn reconstruct_steps(
    graph: &Graph,
    parents: &HashMap<StateKey, (StateKey, usize)>,
    goal: &StateKey,
) -> Vec<PathStep> {
    let mut steps = Vec::new();
    let mut current = goal.clone();
    while let Some((parent, edge_index)) = parents.get(&current) {
        let edge = graph.neighbours(parent)[*edge_index].clone();
        steps.push(PathStep {
            from: parent.clone(),
            edge,
        });
        current = parent.clone();
    }
    steps.reverse();
    steps
}

/// Total order over f64 priority keys (NaN never reaches the search).
#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct QueueEntry<K: Ord> {
    state: StateKey,
    key: K,
}

impl<K: Ord> QueueEntry<K> {
    fn new(state: StateKey, key: K) -> Self {
        Self { state, key }
    }
}

impl<K: Ord> Ord for QueueEntry<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by key.
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.state.cmp(&self.state))
    }
}

impl<K: Ord> PartialOrd for QueueEntry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::test_helpers::{line, platform, EntitySetBuilder};
    use crate::world::build_world_data;

    fn seeds(states: &[(&str, &str)]) -> Vec<SearchSeed> {
        states
            .iter()
            .map(|(p, l)| SearchSeed {
                state: StateKey::new(*p, *l),
                access_time: 0.0,
            })
            .collect()
    }

    fn sinks(states: &[(&str, &str)]) -> HashSet<StateKey> {
        states.iter().map(|(p, l)| StateKey::new(*p, *l)).collect()
    }

    /// Express line l2 reaches the goal directly; local line l1 requires a
    /// transfer at the mid station but is much faster overall.
    fn transfer_tradeoff_graph() -> Graph {
        let set = EntitySetBuilder::new()
            .line(line("l1", &[(0.0, 0.0), (100.0, 0.0)]))
            .line(line("l2", &[(0.0, 10.0), (5000.0, 10.0)]))
            .line(line("l3", &[(100.0, 0.0), (200.0, 0.0)]))
            .platform(platform("a1", (0.0, 0.0), Some("start"), &["l1"]))
            .platform(platform("a2", (0.0, 10.0), Some("start"), &["l2"]))
            .platform(platform("m", (100.0, 0.0), Some("mid"), &["l1", "l3"]))
            .platform(platform("g1", (200.0, 0.0), Some("goal"), &["l3"]))
            .platform(platform("g2", (5000.0, 10.0), Some("goal"), &["l2"]))
            .station_with_platforms("start", (0.0, 5.0), &[])
            .station_with_platforms("mid", (100.0, 0.0), &[])
            .station_with_platforms("goal", (200.0, 5.0), &[])
            .build();
        build_graph(&build_world_data(set, 1))
    }

    #[test]
    fn time_objective_prefers_the_faster_transfer_path() {
        let graph = transfer_tradeoff_graph();
        let result = find_route_time(
            &graph,
            &seeds(&[("a1", "l1"), ("a2", "l2")]),
            &sinks(&[("g1", "l3"), ("g2", "l2")]),
            &TimeModel::default(),
        )
        .unwrap();
        assert_eq!(result.goal, StateKey::new("g1", "l3"));
        assert_eq!(result.cost.transfers, 1);
    }

    #[test]
    fn scalarized_transfer_objective_never_buys_time_with_a_transfer() {
        let graph = transfer_tradeoff_graph();
        let result = find_route_transfer_scalarized(
            &graph,
            &seeds(&[("a1", "l1"), ("a2", "l2")]),
            &sinks(&[("g1", "l3"), ("g2", "l2")]),
            &TimeModel::default(),
        )
        .unwrap();
        assert_eq!(result.goal, StateKey::new("g2", "l2"));
        assert_eq!(result.cost.transfers, 0);
    }

    #[test]
    fn lexicographic_and_scalarized_agree() {
        let graph = transfer_tradeoff_graph();
        let model = TimeModel::default();
        let scalar = find_route_transfer_scalarized(
            &graph,
            &seeds(&[("a1", "l1"), ("a2", "l2")]),
            &sinks(&[("g1", "l3"), ("g2", "l2")]),
            &model,
        )
        .unwrap();
        let lexicographic = find_route_transfer_lexicographic(
            &graph,
            &seeds(&[("a1", "l1"), ("a2", "l2")]),
            &sinks(&[("g1", "l3"), ("g2", "l2")]),
            &model,
        )
        .unwrap();
        assert_eq!(scalar.goal, lexicographic.goal);
        assert_eq!(scalar.cost.transfers, lexicographic.cost.transfers);
        assert!((scalar.cost.time - lexicographic.cost.time).abs() < 1e-9);
    }

    #[test]
    fn transfer_penalty_dominates_feasible_times() {
        // A 2-transfer/500-time path must beat a 3-transfer/10-time path.
        let cheap_transfers = Cost {
            transfers: 2,
            time: 500.0,
        };
        let cheap_time = Cost {
            transfers: 3,
            time: 10.0,
        };
        assert!(cheap_transfers.scalarized() < cheap_time.scalarized());
    }

    #[test]
    fn access_time_shifts_seed_priorities() {
        let graph = transfer_tradeoff_graph();
        let seeded = vec![
            SearchSeed {
                state: StateKey::new("a1", "l1"),
                access_time: 1.0e6,
            },
            SearchSeed {
                state: StateKey::new("a2", "l2"),
                access_time: 0.0,
            },
        ];
        let result = find_route_time(
            &graph,
            &seeded,
            &sinks(&[("g1", "l3"), ("g2", "l2")]),
            &TimeModel::default(),
        )
        .unwrap();
        assert_eq!(result.goal, StateKey::new("g2", "l2"));
    }

    #[test]
    fn costs_are_never_negative() {
        let graph = transfer_tradeoff_graph();
        let result = find_route_time(
            &graph,
            &seeds(&[("a1", "l1")]),
            &sinks(&[("g1", "l3")]),
            &TimeModel::default(),
        )
        .unwrap();
        assert!(result.cost.time >= 0.0);
        for step in &result.steps {
            assert!(TimeModel::default().edge_time(&step.edge) >= 0.0);
        }
    }

    #[test]
    fn empty_seed_or_sink_sets_find_nothing() {
        let graph = transfer_tradeoff_graph();
        assert!(find_route_time(
            &graph,
            &[],
            &sinks(&[("g1", "l3")]),
            &TimeModel::default()
        )
        .is_none());
        assert!(find_route_time(
            &graph,
            &seeds(&[("a1", "l1")]),
            &HashSet::new(),
            &TimeModel::default()
        )
        .is_none());
    }

    #[test]
    fn steps_form_a_connected_chain_from_a_seed() {
        let graph = transfer_tradeoff_graph();
        let result = find_route_time(
            &graph,
            &seeds(&[("a1", "l1")]),
            &sinks(&[("g1", "l3")]),
            &TimeModel::default(),
        )
        .unwrap();
        assert_eq!(result.steps.first().unwrap().from, StateKey::new("a1", "l1"));
        for pair in result.steps.windows(2) {
            assert_eq!(pair[0].edge.to, pair[1].from);
        }
        assert_eq!(result.steps.last().unwrap().edge.to, result.goal);
    }
}
