//! Coordinate primitives shared by the normalizer, filter, and edge builder.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;
const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// A coordinate slot as resolved from a stored document.
///
/// Components may be NaN, infinite, or out of range. Nothing downstream
/// reads the raw components directly; [`CoordinatePair::point`] is the only
/// way to obtain a usable [`GeoPoint`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinatePair {
    pub latitude: f64,
    pub longitude: f64,
}

impl CoordinatePair {
    /// Sentinel for a slot with no resolvable value.
    pub const MISSING: Self = Self {
        latitude: f64::NAN,
        longitude: f64::NAN,
    };

    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components finite, latitude within ±90 and longitude within ±180.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && LATITUDE_RANGE.contains(&self.latitude)
            && LONGITUDE_RANGE.contains(&self.longitude)
    }

    #[must_use]
    pub fn point(&self) -> Option<GeoPoint> {
        self.is_valid().then_some(GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

impl From<GeoPoint> for CoordinatePair {
    fn from(point: GeoPoint) -> Self {
        Self::new(point.latitude, point.longitude)
    }
}

/// A validated latitude/longitude pair in degrees.
///
/// This is also the wire shape of `nodeCoordinates` / `leafCoordinates`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Bit-exact identity used for node grouping.
    ///
    /// Adding `0.0` folds `-0.0` into `0.0` so the two compare equal here as
    /// they do under `==`. No other tolerance is applied.
    pub(crate) fn exact_key(self) -> (u64, u64) {
        (
            (self.latitude + 0.0).to_bits(),
            (self.longitude + 0.0).to_bits(),
        )
    }
}

/// Errors from constructing a [`ViewportBounds`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoundsError {
    #[error("viewport bound {edge} is not a finite number")]
    NonFinite { edge: &'static str },

    #[error("viewport bound {edge}={value} is outside the valid latitude range")]
    LatitudeOutOfRange { edge: &'static str, value: f64 },

    #[error("viewport bound {edge}={value} is outside the valid longitude range")]
    LongitudeOutOfRange { edge: &'static str, value: f64 },

    #[error("viewport south={south} is north of north={north}")]
    InvertedLatitude { south: f64, north: f64 },

    #[error("viewport west={west} is east of east={east}; antimeridian-crossing viewports are not supported")]
    CrossesAntimeridian { west: f64, east: f64 },
}

/// The rectangular lat/lon window currently visible on the map.
///
/// Edges are inclusive. Construction rejects inverted or out-of-range edges,
/// so every value of this type describes a non-empty rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportBounds {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
}

impl ViewportBounds {
    /// # Errors
    ///
    /// Returns [`BoundsError`] if any edge is non-finite or out of range, if
    /// `south > north`, or if `west > east`.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Result<Self, BoundsError> {
        for (edge, value) in [
            ("north", north),
            ("south", south),
            ("east", east),
            ("west", west),
        ] {
            if !value.is_finite() {
                return Err(BoundsError::NonFinite { edge });
            }
        }
        for (edge, value) in [("north", north), ("south", south)] {
            if !LATITUDE_RANGE.contains(&value) {
                return Err(BoundsError::LatitudeOutOfRange { edge, value });
            }
        }
        for (edge, value) in [("east", east), ("west", west)] {
            if !LONGITUDE_RANGE.contains(&value) {
                return Err(BoundsError::LongitudeOutOfRange { edge, value });
            }
        }
        if south > north {
            return Err(BoundsError::InvertedLatitude { south, north });
        }
        if west > east {
            return Err(BoundsError::CrossesAntimeridian { west, east });
        }

        Ok(Self {
            north,
            south,
            east,
            west,
        })
    }

    #[must_use]
    pub fn north(&self) -> f64 {
        self.north
    }

    #[must_use]
    pub fn south(&self) -> f64 {
        self.south
    }

    #[must_use]
    pub fn east(&self) -> f64 {
        self.east
    }

    #[must_use]
    pub fn west(&self) -> f64 {
        self.west
    }

    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.south..=self.north).contains(&point.latitude)
            && (self.west..=self.east).contains(&point.longitude)
    }
}
