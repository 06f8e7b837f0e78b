//! Server-backed query commands and the offline classifier.

use fieldmap_client::MapClient;
use fieldmap_core::{
    build_connection_graph, classify_carrier, GeoPoint, LocationDto, LocationFilter,
};

fn fmt_point(point: Option<GeoPoint>) -> String {
    point.map_or_else(
        || "-".to_string(),
        |p| format!("{:.6},{:.6}", p.latitude, p.longitude),
    )
}

fn format_row(location: &LocationDto) -> String {
    format!(
        "{:<10} {:<9} {:<16} {:<24} {:<24} {}",
        location.id,
        location.carrier,
        location.cct,
        fmt_point(location.node_coordinates),
        fmt_point(location.leaf_coordinates),
        location.customer,
    )
}

pub(crate) fn run_classify(name: &str) -> anyhow::Result<()> {
    let carrier = classify_carrier(Some(name));
    println!("{carrier}\t{}", carrier.marker_color());
    Ok(())
}

pub(crate) async fn run_locations(
    client: &MapClient,
    filter: &LocationFilter,
    json: bool,
) -> anyhow::Result<()> {
    let locations = client.fetch_locations(filter).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&locations)?);
        return Ok(());
    }

    println!(
        "{:<10} {:<9} {:<16} {:<24} {:<24} CUSTOMER",
        "ID", "CARRIER", "CCT", "NODE", "LEAF"
    );
    for location in &locations {
        println!("{}", format_row(location));
    }
    println!("{} location(s), carrier={}", locations.len(), filter.carrier);
    Ok(())
}

pub(crate) async fn run_graph(client: &MapClient, filter: &LocationFilter) -> anyhow::Result<()> {
    let locations = client.fetch_locations(filter).await?;
    let graph = build_connection_graph(&locations);
    tracing::info!(
        groups = graph.groups.len(),
        edges = graph.edges.len(),
        leaf_only = graph.leaf_only.len(),
        "connection graph built"
    );
    println!("{}", serde_json::to_string_pretty(&graph)?);
    Ok(())
}

pub(crate) async fn run_config(client: &MapClient) -> anyhow::Result<()> {
    let config = client.fetch_config_or_default().await;
    if config.has_map_provider_key {
        println!("map provider key: configured");
    } else {
        println!("map provider key: not configured (map renders without tiles)");
    }
    Ok(())
}

pub(crate) async fn run_delete(client: &MapClient, id: &str) -> anyhow::Result<()> {
    if client.delete_location(id).await? {
        println!("deleted location {id}");
        Ok(())
    } else {
        anyhow::bail!("location {id} not found")
    }
}
