//! Node/leaf connection graph for map rendering.
//!
//! Locations are grouped by exact node-coordinate equality. Each group
//! yields one edge per member with a valid leaf coordinate. The graph is
//! rebuilt from scratch for every batch; there is no incremental update.

use std::collections::HashMap;

use serde::Serialize;

use crate::geo::GeoPoint;
use crate::location::NormalizedLocation;

/// Anything that carries an id and the two coordinate slots.
///
/// Implemented for [`NormalizedLocation`] on the server and for
/// [`crate::LocationDto`] on the client after the network hop.
pub trait Located {
    fn location_id(&self) -> &str;
    /// The node coordinate, if valid.
    fn node_point(&self) -> Option<GeoPoint>;
    /// The leaf coordinate, if valid.
    fn leaf_point(&self) -> Option<GeoPoint>;
}

impl Located for NormalizedLocation {
    fn location_id(&self) -> &str {
        &self.id
    }

    fn node_point(&self) -> Option<GeoPoint> {
        self.node.point()
    }

    fn leaf_point(&self) -> Option<GeoPoint> {
        self.leaf.point()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEdge {
    pub node: GeoPoint,
    pub leaf: GeoPoint,
    pub location_id: String,
}

/// All locations sharing one exact node coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroup {
    pub node: GeoPoint,
    pub member_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionGraph {
    /// Groups in order of first appearance.
    pub groups: Vec<NodeGroup>,
    /// Edges ordered by group, then by member order within the group.
    pub edges: Vec<ConnectionEdge>,
    /// Ids of locations with no valid node but a valid leaf; rendered as
    /// standalone leaf markers.
    pub leaf_only: Vec<String>,
}

impl ConnectionGraph {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.leaf_only.is_empty()
    }
}

/// Builds the connection graph for one batch of locations.
#[must_use]
pub fn build_connection_graph<L: Located>(locations: &[L]) -> ConnectionGraph {
    let mut index: HashMap<(u64, u64), usize> = HashMap::new();
    let mut groups: Vec<(GeoPoint, Vec<&L>)> = Vec::new();
    let mut leaf_only = Vec::new();

    for location in locations {
        let Some(node) = location.node_point() else {
            if location.leaf_point().is_some() {
                leaf_only.push(location.location_id().to_owned());
            }
            continue;
        };

        let slot = *index.entry(node.exact_key()).or_insert_with(|| {
            groups.push((node, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(location);
    }

    let mut edges = Vec::new();
    let groups = groups
        .into_iter()
        .map(|(node, members)| {
            edges.extend(members.iter().filter_map(|member| {
                member.leaf_point().map(|leaf| ConnectionEdge {
                    node,
                    leaf,
                    location_id: member.location_id().to_owned(),
                })
            }));
            NodeGroup {
                node,
                member_ids: members
                    .iter()
                    .map(|m| m.location_id().to_owned())
                    .collect(),
            }
        })
        .collect();

    ConnectionGraph {
        groups,
        edges,
        leaf_only,
    }
}
