//! Viewport and carrier filtering over normalized locations.

use crate::carrier::CarrierSelector;
use crate::geo::ViewportBounds;
use crate::location::{NormalizedLocation, RawEquipmentRecord};
use crate::normalize::normalize_record;

/// Predicate applied to every normalized location in a query.
///
/// A location passes when it has at least one valid coordinate slot, the
/// bounds (if any) contain its node **or** its leaf coordinate, and the
/// carrier selector accepts its tag.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocationFilter {
    pub bounds: Option<ViewportBounds>,
    pub carrier: CarrierSelector,
}

impl LocationFilter {
    #[must_use]
    pub fn new(bounds: Option<ViewportBounds>, carrier: CarrierSelector) -> Self {
        Self { bounds, carrier }
    }

    #[must_use]
    pub fn matches(&self, location: &NormalizedLocation) -> bool {
        location.has_valid_coordinate()
            && self.bounds.is_none_or(|b| within_bounds(location, &b))
            && self.carrier.matches(location.carrier)
    }

    /// Keeps matching locations in their original order.
    #[must_use]
    pub fn apply<I>(&self, locations: I) -> Vec<NormalizedLocation>
    where
        I: IntoIterator<Item = NormalizedLocation>,
    {
        locations.into_iter().filter(|l| self.matches(l)).collect()
    }
}

/// Inclusive-OR across slots: either valid coordinate inside is enough.
#[must_use]
pub fn within_bounds(location: &NormalizedLocation, bounds: &ViewportBounds) -> bool {
    [location.node.point(), location.leaf.point()]
        .into_iter()
        .flatten()
        .any(|point| bounds.contains(point))
}

/// Normalizes, classifies, and filters a batch of raw records.
#[must_use]
pub fn normalize_and_filter(
    records: &[RawEquipmentRecord],
    filter: &LocationFilter,
) -> Vec<NormalizedLocation> {
    filter.apply(records.iter().map(normalize_record))
}
