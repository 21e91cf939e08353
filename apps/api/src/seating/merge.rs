//! Merge pass: combines small whole units so tables fill up.
//!
//! Only units that are neither split fragments nor already at capacity take
//! part. They are visited largest first (ties by creation order) and packed
//! into merge bins of `capacity` seats:
//! - `FirstFit`: the first open bin with room
//! - `BestFit`: the open bin left with the least room after the unit goes in
//!
//! A bin holding one unit gives that unit back untouched.

use std::cmp::Reverse;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::seating::balance::{select_bucket, Preference};
use crate::seating::error::SeatingError;
use crate::seating::model::SeatingUnit;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    #[default]
    FirstFit,
    BestFit,
    Disabled,
}

impl FromStr for MergeStrategy {
    type Err = SeatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first_fit" | "first-fit" => Ok(MergeStrategy::FirstFit),
            "best_fit" | "best-fit" => Ok(MergeStrategy::BestFit),
            "disabled" | "none" | "off" => Ok(MergeStrategy::Disabled),
            other => Err(SeatingError::configuration(format!(
                "unknown merge strategy '{other}' (expected first_fit, best_fit or disabled)"
            ))),
        }
    }
}

struct MergeBin {
    parts: Vec<SeatingUnit>,
    load: usize,
}

/// Runs the merge pass and returns units ordered by creation, renumbered
/// from zero. A merged unit sits where its earliest constituent was.
pub fn merge_small_units(
    units: Vec<SeatingUnit>,
    capacity: usize,
    strategy: MergeStrategy,
) -> Vec<SeatingUnit> {
    if strategy == MergeStrategy::Disabled {
        return units;
    }

    let (mut small, mut result): (Vec<SeatingUnit>, Vec<SeatingUnit>) = units
        .into_iter()
        .partition(|u| !u.is_split_fragment() && u.size() < capacity);

    small.sort_by_key(|u| (Reverse(u.size()), u.ordinal()));

    let mut bins: Vec<MergeBin> = Vec::new();
    for unit in small {
        let size = unit.size();
        let fits = |bin: &MergeBin| bin.load + size <= capacity;
        let target = match strategy {
            MergeStrategy::BestFit => {
                select_bucket(&bins, fits, |bin| capacity - bin.load, Preference::Least)
            }
            _ => bins.iter().position(fits),
        };

        match target {
            Some(index) => {
                bins[index].load += size;
                bins[index].parts.push(unit);
            }
            None => bins.push(MergeBin {
                parts: vec![unit],
                load: size,
            }),
        }
    }

    result.extend(bins.into_iter().map(|bin| SeatingUnit::merge(bin.parts)));
    result.sort_by_key(SeatingUnit::ordinal);
    for (ordinal, unit) in result.iter_mut().enumerate() {
        unit.set_ordinal(ordinal);
    }
    result
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
