//! Carrier inference from free-text customer names.
//!
//! Classification is a declarative, ordered rule table: the first rule with
//! an alias contained in the canonicalized name wins. Rule order matters
//! whenever one carrier's alias can occur inside another name, so new rules
//! must be placed deliberately and covered by a test.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Network operator inferred from a customer name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Carrier {
    Dialog,
    Mobitel,
    Hutch,
    Etisalat,
    Other,
}

impl Carrier {
    pub const ALL: [Carrier; 5] = [
        Carrier::Dialog,
        Carrier::Mobitel,
        Carrier::Hutch,
        Carrier::Etisalat,
        Carrier::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Carrier::Dialog => "Dialog",
            Carrier::Mobitel => "Mobitel",
            Carrier::Hutch => "Hutch",
            Carrier::Etisalat => "Etisalat",
            Carrier::Other => "Other",
        }
    }

    /// Marker colour used by map renderers, as a CSS hex string.
    #[must_use]
    pub fn marker_color(self) -> &'static str {
        match self {
            Carrier::Dialog => "#FFD600",
            Carrier::Mobitel => "#BDBDBD",
            Carrier::Hutch => "#43A047",
            Carrier::Etisalat => "#2196F3",
            Carrier::Other => "#F44336",
        }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown carrier '{0}'; expected one of Dialog, Mobitel, Hutch, Etisalat, Other, All")]
pub struct CarrierParseError(pub String);

impl FromStr for Carrier {
    type Err = CarrierParseError;

    /// Case-insensitive match on the tag name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Carrier::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CarrierParseError(s.to_owned()))
    }
}

/// One classification rule: any alias match yields `carrier`.
///
/// Aliases are compared against the canonical form produced by
/// [`canonical_customer_name`], so they must be lower-case with no spaces
/// or hyphens.
#[derive(Debug, Clone, Copy)]
pub struct CarrierRule {
    pub aliases: &'static [&'static str],
    pub carrier: Carrier,
}

/// Production rule table, evaluated top to bottom.
///
/// Etisalat must stay above Hutch so merged "Hutch Etisalat" names resolve
/// to Etisalat.
pub const CARRIER_RULES: &[CarrierRule] = &[
    CarrierRule {
        aliases: &["dialog", "mtnnetworks"],
        carrier: Carrier::Dialog,
    },
    CarrierRule {
        aliases: &["mobitel", "sltmobitel"],
        carrier: Carrier::Mobitel,
    },
    CarrierRule {
        aliases: &["etisalat", "celltel"],
        carrier: Carrier::Etisalat,
    },
    CarrierRule {
        aliases: &["hutch", "hutchison"],
        carrier: Carrier::Hutch,
    },
];

/// Lower-cases and strips whitespace and hyphens.
#[must_use]
pub fn canonical_customer_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Classifies a customer name with [`CARRIER_RULES`].
#[must_use]
pub fn classify_carrier(customer_name: Option<&str>) -> Carrier {
    classify_with_rules(customer_name, CARRIER_RULES)
}

/// Classifies a customer name with an explicit rule table.
///
/// Total: a missing name or one matching no rule yields [`Carrier::Other`].
#[must_use]
pub fn classify_with_rules(customer_name: Option<&str>, rules: &[CarrierRule]) -> Carrier {
    let Some(name) = customer_name else {
        return Carrier::Other;
    };
    let canonical = canonical_customer_name(name);
    if canonical.is_empty() {
        return Carrier::Other;
    }

    rules
        .iter()
        .find(|rule| rule.aliases.iter().any(|alias| canonical.contains(alias)))
        .map_or(Carrier::Other, |rule| rule.carrier)
}

/// The `carrier` query selector: either every carrier or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CarrierSelector {
    #[default]
    All,
    Only(Carrier),
}

impl CarrierSelector {
    /// Parses an optional query value. Absent, blank, and `All` (any case)
    /// select every carrier.
    ///
    /// # Errors
    ///
    /// Returns [`CarrierParseError`] when the value names no known carrier.
    pub fn parse(raw: Option<&str>) -> Result<Self, CarrierParseError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::All),
            Some(value) => value.parse(),
        }
    }

    #[must_use]
    pub fn matches(self, carrier: Carrier) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => selected == carrier,
        }
    }
}

impl FromStr for CarrierSelector {
    type Err = CarrierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<Carrier>().map(Self::Only)
    }
}

impl fmt::Display for CarrierSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Only(carrier) => f.write_str(carrier.as_str()),
        }
    }
}
