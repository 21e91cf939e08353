//! Core seating types shared by the unit builder, the placer and diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Input types
// ────────────────────────────────────────────────────────────────────────────

/// Key of the group a person should be seated with.
///
/// For a studio member this is the studio id. People in an explicitly
/// coordinated seating group carry `group:<name>` instead, which overrides
/// their studio. Ordering is plain lexicographic on the key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AffiliationId(String);

impl AffiliationId {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AffiliationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AffiliationId {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// A person to be seated. Immutable input to the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub affiliation: AffiliationId,
    pub role: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Seating units
// ────────────────────────────────────────────────────────────────────────────

/// A group of people that is always placed at a single table.
///
/// Fields are private so that a unit can only be built through the
/// constructors below, which guarantee a non-empty people list and a
/// non-empty affiliation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatingUnit {
    people: Vec<Person>,
    affiliations: Vec<AffiliationId>,
    is_split_fragment: bool,
    is_merged: bool,
    ordinal: usize,
}

impl SeatingUnit {
    /// An affiliation that fits at one table, seated whole.
    pub(crate) fn whole(affiliation: AffiliationId, people: Vec<Person>, ordinal: usize) -> Self {
        debug_assert!(!people.is_empty());
        Self {
            people,
            affiliations: vec![affiliation],
            is_split_fragment: false,
            is_merged: false,
            ordinal,
        }
    }

    /// One part of an affiliation too large for a single table.
    pub(crate) fn fragment(
        affiliation: AffiliationId,
        people: Vec<Person>,
        ordinal: usize,
    ) -> Self {
        debug_assert!(!people.is_empty());
        Self {
            people,
            affiliations: vec![affiliation],
            is_split_fragment: true,
            is_merged: false,
            ordinal,
        }
    }

    /// Combines several small units into one. A single part is returned as is.
    ///
    /// The merged unit takes the smallest ordinal of its parts, so ordinals
    /// stay unique across a run.
    pub(crate) fn merge(mut parts: Vec<SeatingUnit>) -> Self {
        debug_assert!(!parts.is_empty());
        if parts.len() == 1 {
            return parts.remove(0);
        }

        let ordinal = parts.iter().map(|p| p.ordinal).min().unwrap_or_default();
        let mut people = Vec::new();
        let mut affiliations: Vec<AffiliationId> = Vec::new();
        for part in parts {
            people.extend(part.people);
            for affiliation in part.affiliations {
                if !affiliations.contains(&affiliation) {
                    affiliations.push(affiliation);
                }
            }
        }

        Self {
            people,
            affiliations,
            is_split_fragment: false,
            is_merged: true,
            ordinal,
        }
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn affiliations(&self) -> &[AffiliationId] {
        &self.affiliations
    }

    /// The first affiliation of the unit; used for placement tie-breaks.
    pub fn primary_affiliation(&self) -> &AffiliationId {
        &self.affiliations[0]
    }

    pub fn size(&self) -> usize {
        self.people.len()
    }

    pub fn is_split_fragment(&self) -> bool {
        self.is_split_fragment
    }

    pub fn is_merged(&self) -> bool {
        self.is_merged
    }

    /// Creation order of the unit within its run.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub(crate) fn set_ordinal(&mut self, ordinal: usize) {
        self.ordinal = ordinal;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tables
// ────────────────────────────────────────────────────────────────────────────

/// A physical table on the seating grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// 1-based sequence number.
    pub number: u32,
    pub row: u32,
    pub column: u32,
    pub capacity: usize,
    pub units: Vec<SeatingUnit>,
}

impl Table {
    pub fn occupancy(&self) -> usize {
        self.units.iter().map(SeatingUnit::size).sum()
    }

    #[cfg(test)]
    pub fn hosts(&self, affiliation: &AffiliationId) -> bool {
        self.units
            .iter()
            .any(|u| u.affiliations().contains(affiliation))
    }

    /// People seated at this table, in placement order.
    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.units.iter().flat_map(|u| u.people().iter())
    }
}
