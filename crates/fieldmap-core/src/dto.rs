//! Wire shape served by the location query endpoint.

use serde::{Deserialize, Serialize};

use crate::carrier::Carrier;
use crate::edges::Located;
use crate::geo::{CoordinatePair, GeoPoint};
use crate::location::NormalizedLocation;

/// One element of the `/api/locations` response array.
///
/// Invalid coordinate slots serialize as `null`; NaN never reaches the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDto {
    pub id: String,
    pub cct: String,
    pub service: String,
    pub customer: String,
    pub address: String,
    pub status: String,
    pub node_coordinates: Option<GeoPoint>,
    pub leaf_coordinates: Option<GeoPoint>,
    pub carrier: Carrier,
}

impl From<NormalizedLocation> for LocationDto {
    fn from(location: NormalizedLocation) -> Self {
        Self {
            node_coordinates: location.node.point(),
            leaf_coordinates: location.leaf.point(),
            id: location.id,
            cct: location.cct,
            service: location.service,
            customer: location.customer,
            address: location.address,
            status: location.status,
            carrier: location.carrier,
        }
    }
}

// Slots are re-validated: the payload came over the network.
impl Located for LocationDto {
    fn location_id(&self) -> &str {
        &self.id
    }

    fn node_point(&self) -> Option<GeoPoint> {
        self.node_coordinates
            .and_then(|p| CoordinatePair::from(p).point())
    }

    fn leaf_point(&self) -> Option<GeoPoint> {
        self.leaf_coordinates
            .and_then(|p| CoordinatePair::from(p).point())
    }
}
