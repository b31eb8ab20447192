mod common;

use serde_json::json;

use common::{
    building_record, line_record, platform_record, station_record, three_stop_world,
    world_and_graph,
};
use railplan_lib::{plan_journey, JourneyRequest, Point3, Segment, BUILDING_TRANSFER_DAMPING};

fn request(start: (f64, f64), end: (f64, f64)) -> JourneyRequest {
    JourneyRequest::between(
        Point3::new(start.0, 0.0, start.1),
        Point3::new(end.0, 0.0, end.1),
    )
}

/// Two parallel lines whose mid stations share one interchange building 80
/// units apart: the only route walks between stations indoors.
fn cross_building_world() -> Vec<serde_json::Value> {
    vec![
        line_record("L1", "North", &[(0.0, 0.0), (300.0, 0.0)]),
        line_record("L2", "South", &[(0.0, 80.0), (300.0, 80.0)]),
        platform_record("p-a", (0.0, 0.0), Some("s-a"), json!([{"lineID": "L1"}])),
        platform_record("p-x1", (150.0, 0.0), Some("s-x1"), json!([{"lineID": "L1"}])),
        platform_record("p-x2", (150.0, 80.0), Some("s-x2"), json!([{"lineID": "L2"}])),
        platform_record("p-b", (300.0, 80.0), Some("s-b"), json!([{"lineID": "L2"}])),
        station_record("s-a", "Alder", (0.0, 0.0)),
        station_record("s-x1", "Exchange North", (150.0, 0.0)),
        station_record("s-x2", "Exchange South", (150.0, 80.0)),
        station_record("s-b", "Birch", (300.0, 80.0)),
        building_record("b-a", "Alder Gate", (0.0, 0.0), &["s-a"]),
        building_record("b-x", "Exchange Hall", (150.0, 40.0), &["s-x1", "s-x2"]),
        building_record("b-b", "Birch Gate", (300.0, 80.0), &["s-b"]),
    ]
}

#[test]
fn segments_run_access_rail_transfer_rail_egress() {
    let (world, graph) = world_and_graph(&cross_building_world(), 1);
    let itinerary = plan_journey(&world, &graph, &request((-7.0, 0.0), (303.0, 84.0))).unwrap();

    assert!(itinerary.found);
    let kinds: Vec<&str> = itinerary
        .segments
        .iter()
        .map(|s| match s {
            Segment::Access { .. } => "access",
            Segment::Rail { .. } => "rail",
            Segment::Transfer { .. } => "transfer",
            Segment::Egress { .. } => "egress",
        })
        .collect();
    assert_eq!(kinds, vec!["access", "rail", "transfer", "rail", "egress"]);
}

#[test]
fn building_transfer_segment_names_its_stations_and_damps_time() {
    let (world, graph) = world_and_graph(&cross_building_world(), 1);
    let itinerary = plan_journey(&world, &graph, &request((-7.0, 0.0), (303.0, 84.0))).unwrap();

    let Some(Segment::Transfer {
        location,
        from_station,
        to_station,
        distance,
        time,
    }) = itinerary
        .segments
        .iter()
        .find(|s| matches!(s, Segment::Transfer { .. }))
    else {
        panic!("expected a transfer segment");
    };
    assert_eq!(location, "Exchange North");
    assert_eq!(from_station.as_deref(), Some("Exchange North"));
    assert_eq!(to_station.as_deref(), Some("Exchange South"));
    assert!((distance - 80.0).abs() < 1e-9, "raw straight-line distance");

    let expected_time = (distance / BUILDING_TRANSFER_DAMPING) / 1.4;
    assert!((time - expected_time).abs() < 1e-9);
    assert_eq!(itinerary.totals.transfers, 1);
}

#[test]
fn totals_partition_distance_by_mode() {
    let (world, graph) = world_and_graph(&cross_building_world(), 1);
    let itinerary = plan_journey(&world, &graph, &request((-7.0, 0.0), (303.0, 84.0))).unwrap();

    let totals = itinerary.totals;
    assert!((totals.rail_distance - 300.0).abs() < 1e-9);
    assert!((totals.transfer_distance - 80.0).abs() < 1e-9);
    assert!((totals.walk_distance - 12.0).abs() < 1e-9, "7 access + 5 egress");
    assert!(totals.total_time > 0.0);
    assert_eq!(totals.transfers, 1);
}

#[test]
fn highlight_runs_from_start_through_geometry_to_end() {
    let (world, graph) = world_and_graph(&cross_building_world(), 1);
    let itinerary = plan_journey(&world, &graph, &request((-7.0, 0.0), (303.0, 84.0))).unwrap();

    let highlight = &itinerary.highlight;
    assert_eq!(highlight.first(), Some(&Point3::new(-7.0, 0.0, 0.0)));
    assert_eq!(highlight[1], Point3::new(0.0, 0.0, 0.0), "origin building center");
    assert_eq!(highlight.last(), Some(&Point3::new(303.0, 0.0, 84.0)));

    // Transfer contributes both station coordinates, in crossing order.
    let north = Point3::new(150.0, 0.0, 0.0);
    let south = Point3::new(150.0, 0.0, 80.0);
    let north_at = highlight.iter().position(|p| *p == north).unwrap();
    let south_at = highlight.iter().position(|p| *p == south).unwrap();
    assert!(north_at < south_at);

    // Consecutive duplicates are collapsed.
    for pair in highlight.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
}

#[test]
fn not_found_itineraries_still_render_walking_legs() {
    let (world, graph) = world_and_graph(&three_stop_world(false), 1);
    // C → A has no reverse line; buildings resolve, so both legs exist.
    let itinerary = plan_journey(&world, &graph, &request((255.0, 0.0), (-5.0, 0.0))).unwrap();

    assert!(!itinerary.found);
    assert_eq!(itinerary.segments.len(), 2);
    assert!(matches!(itinerary.segments[0], Segment::Access { .. }));
    assert!(matches!(itinerary.segments[1], Segment::Egress { .. }));
    assert!(itinerary.totals.walk_distance > 0.0);
    assert!(itinerary.highlight.is_empty());
}

#[test]
fn itinerary_serializes_with_mode_tags() {
    let (world, graph) = world_and_graph(&three_stop_world(false), 1);
    let itinerary = plan_journey(&world, &graph, &request((-5.0, 0.0), (255.0, 0.0))).unwrap();

    let value = serde_json::to_value(&itinerary).unwrap();
    assert_eq!(value["found"], json!(true));
    assert_eq!(value["objective"], json!("time"));
    assert_eq!(value["segments"][0]["mode"], json!("access"));
    assert_eq!(value["segments"][1]["mode"], json!("rail"));
    assert_eq!(value["segments"][1]["via_stations"], json!(["B"]));
    assert!(value.get("failure").is_none());
}
