//! Domain core for the field-equipment map.
//!
//! Turns loosely-typed stored equipment documents into validated, classified
//! locations, filters them by viewport and carrier, and groups them into the
//! node/leaf connection graph consumed by renderers. Everything here is pure;
//! I/O lives in `fieldmap-db`, `fieldmap-server`, and `fieldmap-client`.

pub mod app_config;
pub mod carrier;
pub mod config;
pub mod dto;
pub mod edges;
pub mod filter;
pub mod geo;
pub mod location;
pub mod normalize;

pub use app_config::{AppConfig, CollectionName, Environment};
pub use carrier::{
    classify_carrier, classify_with_rules, Carrier, CarrierParseError, CarrierRule,
    CarrierSelector, CARRIER_RULES,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use dto::LocationDto;
pub use edges::{build_connection_graph, ConnectionEdge, ConnectionGraph, Located, NodeGroup};
pub use filter::{normalize_and_filter, LocationFilter};
pub use geo::{BoundsError, CoordinatePair, GeoPoint, ViewportBounds};
pub use location::{NormalizedLocation, RawEquipmentRecord};
pub use normalize::normalize_record;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
