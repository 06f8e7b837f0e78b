//! Integration tests for `MapClient` and `ViewportSession` using wiremock HTTP mocks.

use std::time::Duration;

use fieldmap_client::{ClientError, MapClient, MapConfig, ViewportSession};
use fieldmap_core::{Carrier, CarrierSelector, LocationFilter, ViewportBounds};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> MapClient {
    MapClient::with_base_url(base_url, 30).expect("client construction should not fail")
}

fn location(id: &str, carrier: &str, node: (f64, f64), leaf: Option<(f64, f64)>) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "cct": format!("CCT-{id}"),
        "service": "Fiber",
        "customer": "Customer",
        "address": "Colombo",
        "status": "Active",
        "nodeCoordinates": { "latitude": node.0, "longitude": node.1 },
        "leafCoordinates": leaf.map(|(lat, lon)| serde_json::json!({ "latitude": lat, "longitude": lon })),
        "carrier": carrier
    })
}

fn carrier_filter(carrier: Carrier) -> LocationFilter {
    LocationFilter::new(None, CarrierSelector::Only(carrier))
}

#[tokio::test]
async fn fetch_locations_sends_filter_and_parses_array() {
    let server = MockServer::start().await;

    let body = serde_json::json!([
        location("1", "Dialog", (6.9271, 79.8612), Some((6.93, 79.86))),
        location("2", "Dialog", (6.9271, 79.8612), None)
    ]);

    Mock::given(method("GET"))
        .and(path("/api/locations"))
        .and(query_param("carrier", "Dialog"))
        .and(query_param("north", "7"))
        .and(query_param("south", "6"))
        .and(query_param("east", "80"))
        .and(query_param("west", "79"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let bounds = ViewportBounds::new(7.0, 6.0, 80.0, 79.0).expect("bounds");
    let filter = LocationFilter::new(Some(bounds), CarrierSelector::Only(Carrier::Dialog));
    let locations = test_client(&server.uri())
        .fetch_locations(&filter)
        .await
        .expect("should parse locations");

    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].carrier, Carrier::Dialog);
    assert!(locations[1].leaf_coordinates.is_none());
}

#[tokio::test]
async fn fetch_locations_surfaces_error_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/locations"))
        .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
            "error": { "code": "service_unavailable", "message": "location store is unavailable" },
            "meta": { "request_id": "req-1", "timestamp": "2026-01-01T00:00:00Z" }
        })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .fetch_locations(&LocationFilter::default())
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, code, .. } => {
            assert_eq!(status, 503);
            assert_eq!(code, "service_unavailable");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_locations_rejects_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"an array\"}"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .fetch_locations(&LocationFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Deserialize { .. }), "{err:?}");
}

#[tokio::test]
async fn fetch_config_unwraps_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "mapProviderKey": "maps-key", "hasMapProviderKey": true },
            "meta": { "request_id": "req-1", "timestamp": "2026-01-01T00:00:00Z" }
        })))
        .mount(&server)
        .await;

    let config = test_client(&server.uri())
        .fetch_config()
        .await
        .expect("config");
    assert_eq!(config.map_provider_key.as_deref(), Some("maps-key"));
    assert!(config.has_map_provider_key);
}

#[tokio::test]
async fn config_failure_degrades_to_no_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = test_client(&server.uri()).fetch_config_or_default().await;
    assert_eq!(config, MapConfig::default());
    assert!(!config.has_map_provider_key);
}

#[tokio::test]
async fn delete_location_reports_missing_as_false() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/locations/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "deleted": true },
            "meta": { "request_id": "req-1", "timestamp": "2026-01-01T00:00:00Z" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/locations/8"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(client.delete_location("7").await.expect("delete 7"));
    assert!(!client.delete_location("8").await.expect("delete 8"));
}

#[tokio::test]
async fn session_builds_graph_for_accepted_snapshot() {
    let server = MockServer::start().await;

    let body = serde_json::json!([
        location("a", "Hutch", (6.0, 80.0), Some((6.1, 80.1))),
        location("b", "Hutch", (6.0, 80.0), Some((5.9, 79.9)))
    ]);
    Mock::given(method("GET"))
        .and(path("/api/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let session = ViewportSession::new(test_client(&server.uri()));
    let snapshot = session
        .refresh(LocationFilter::default())
        .await
        .expect("refresh")
        .expect("current refresh is accepted");

    assert_eq!(snapshot.generation, 1);
    assert_eq!(snapshot.graph.groups.len(), 1);
    assert_eq!(snapshot.graph.edges.len(), 2);
    assert_eq!(
        session.latest().await.map(|s| s.generation),
        Some(1)
    );
}

#[tokio::test]
async fn session_discards_superseded_slow_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/locations"))
        .and(query_param("carrier", "Dialog"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([location("old", "Dialog", (6.0, 80.0), None)]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/locations"))
        .and(query_param("carrier", "Hutch"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([location("new", "Hutch", (7.0, 81.0), None)])),
        )
        .mount(&server)
        .await;

    let session = ViewportSession::new(test_client(&server.uri()));

    // join! polls in argument order, so the slow refresh takes token 1.
    let (slow, fast) = tokio::join!(
        session.refresh(carrier_filter(Carrier::Dialog)),
        session.refresh(carrier_filter(Carrier::Hutch)),
    );

    assert!(slow.expect("slow refresh").is_none(), "stale response must be dropped");
    let fast = fast.expect("fast refresh").expect("latest refresh is accepted");
    assert_eq!(fast.generation, 2);

    let latest = session.latest().await.expect("snapshot");
    assert_eq!(latest.generation, 2);
    assert_eq!(latest.locations[0].id, "new");
}

#[tokio::test]
async fn session_keeps_previous_snapshot_when_current_refresh_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/locations"))
        .and(query_param("carrier", "Mobitel"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([location("m", "Mobitel", (6.0, 80.0), None)])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/locations"))
        .and(query_param("carrier", "Other"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let session = ViewportSession::new(test_client(&server.uri()));
    session
        .refresh(carrier_filter(Carrier::Mobitel))
        .await
        .expect("first refresh");

    let err = session
        .refresh(carrier_filter(Carrier::Other))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 503, .. }), "{err:?}");

    let latest = session.latest().await.expect("previous snapshot kept");
    assert_eq!(latest.generation, 1);
    assert_eq!(session.current_generation(), 2);
}
