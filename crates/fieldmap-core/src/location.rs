//! Raw stored documents and their normalized projection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::carrier::Carrier;
use crate::geo::CoordinatePair;

/// An externally-owned equipment document as read from the backing store.
///
/// Key names inside `document` are not fixed: coordinates in particular
/// arrive under several legacy spellings. This type is read-only input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEquipmentRecord {
    pub id: String,
    pub document: Map<String, Value>,
}

impl RawEquipmentRecord {
    #[must_use]
    pub fn new(id: impl Into<String>, document: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            document,
        }
    }

    /// Builds a record from a JSON value, treating anything but an object as
    /// an empty document.
    #[must_use]
    pub fn from_value(id: impl Into<String>, value: Value) -> Self {
        let document = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(id, document)
    }
}

/// Canonical per-request view of a [`RawEquipmentRecord`].
///
/// Either coordinate slot may be invalid; the filter stage drops records
/// where both are.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedLocation {
    pub id: String,
    pub cct: String,
    pub service: String,
    pub customer: String,
    pub address: String,
    pub status: String,
    /// Upstream equipment/site ("CEA node") coordinate.
    pub node: CoordinatePair,
    /// Customer circuit termination ("CCT") coordinate.
    pub leaf: CoordinatePair,
    pub carrier: Carrier,
}

impl NormalizedLocation {
    #[must_use]
    pub fn has_valid_coordinate(&self) -> bool {
        self.node.is_valid() || self.leaf.is_valid()
    }
}
