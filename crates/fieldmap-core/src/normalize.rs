//! Normalization from raw store documents to [`NormalizedLocation`].
//!
//! Coordinates are looked up through per-slot alias tables: each slot lists
//! the accepted field spellings in priority order, ending with a generic
//! name. A single routine, [`resolve_first_present`], walks every table.

use serde_json::{Map, Value};

use crate::carrier::classify_carrier;
use crate::geo::CoordinatePair;
use crate::location::{NormalizedLocation, RawEquipmentRecord};

/// Accepted field names for one coordinate slot, highest priority first.
#[derive(Debug, Clone, Copy)]
pub struct SlotAliases {
    pub latitude: &'static [&'static str],
    pub longitude: &'static [&'static str],
}

/// Upstream equipment ("CEA node") coordinate keys.
pub const NODE_SLOT: SlotAliases = SlotAliases {
    latitude: &[
        "CEA Node- latitude",
        "CEA Node - latitude",
        "CEA Node latitude",
        "latitude",
    ],
    longitude: &[
        "CEA Node- longitude",
        "CEA Node - longitude",
        "CEA Node longitude",
        "longitude",
    ],
};

/// Customer circuit termination ("CCT") coordinate keys.
pub const LEAF_SLOT: SlotAliases = SlotAliases {
    latitude: &[
        "CCT- latitude",
        "CCT - latitude",
        "CCT latitude",
        "cct_latitude",
    ],
    longitude: &[
        "CCT- longitude",
        "CCT - longitude",
        "CCT longitude",
        "cct_longitude",
    ],
};

const CCT_KEY: &str = "CCT";
const SERVICE_KEY: &str = "SERVICE";
const CUSTOMER_KEY: &str = "CUSR_NAME";
const ADDRESS_KEY: &str = "BENDADDRESS";
const STATUS_KEY: &str = "CIRT_STATUS";

/// Returns the value of the first key in `keys` that is present and not null.
#[must_use]
pub fn resolve_first_present<'a>(
    document: &'a Map<String, Value>,
    keys: &[&str],
) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| document.get(*key))
        .find(|value| !value.is_null())
}

/// Coerces a stored coordinate value to `f64`.
///
/// Numbers pass through; strings are trimmed and parsed. Absent values,
/// unparseable text, and every other JSON type yield NaN.
#[must_use]
pub fn coerce_coordinate(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

#[must_use]
pub fn resolve_slot(document: &Map<String, Value>, slot: &SlotAliases) -> CoordinatePair {
    CoordinatePair::new(
        coerce_coordinate(resolve_first_present(document, slot.latitude)),
        coerce_coordinate(resolve_first_present(document, slot.longitude)),
    )
}

/// Normalizes and classifies one raw record. Never fails: unusable
/// coordinates are carried as invalid slots for the filter to drop.
#[must_use]
pub fn normalize_record(record: &RawEquipmentRecord) -> NormalizedLocation {
    let doc = &record.document;
    let customer_value = doc.get(CUSTOMER_KEY).and_then(Value::as_str);

    NormalizedLocation {
        id: record.id.clone(),
        cct: descriptive_text(doc.get(CCT_KEY)),
        service: descriptive_text(doc.get(SERVICE_KEY)),
        customer: descriptive_text(doc.get(CUSTOMER_KEY)),
        address: descriptive_text(doc.get(ADDRESS_KEY)),
        status: descriptive_text(doc.get(STATUS_KEY)),
        node: resolve_slot(doc, &NODE_SLOT),
        leaf: resolve_slot(doc, &LEAF_SLOT),
        carrier: classify_carrier(customer_value),
    }
}

// Circuit numbers are sometimes stored as JSON numbers.
fn descriptive_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
