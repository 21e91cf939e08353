//! Unit Builder: turns an ordered attendee list into seating units.
//!
//! Input must already be ordered by affiliation name then person name; the
//! builder never re-sorts it, so one input order always yields one output.
//!
//! Per affiliation:
//! - `count <= capacity` → one whole unit
//! - `count > capacity`  → `ceil(count / capacity)` fragments whose sizes
//!   differ by at most one (12 @ 10 → 6 + 6, 25 @ 10 → 9 + 8 + 8)
//!
//! Small whole units are then combined by the merge pass (see `merge`).

use std::collections::HashSet;

use tracing::debug;

use crate::seating::error::SeatingError;
use crate::seating::merge::{merge_small_units, MergeStrategy};
use crate::seating::model::{Person, SeatingUnit};

/// Builds seating units with the default merge strategy.
#[cfg(test)]
pub fn build_units(people: &[Person], capacity: usize) -> Result<Vec<SeatingUnit>, SeatingError> {
    build_units_with(people, capacity, MergeStrategy::default())
}

/// Builds seating units, merging small ones according to `strategy`.
pub fn build_units_with(
    people: &[Person],
    capacity: usize,
    strategy: MergeStrategy,
) -> Result<Vec<SeatingUnit>, SeatingError> {
    if capacity == 0 {
        return Err(SeatingError::configuration(
            "table capacity must be a positive number",
        ));
    }
    if people.is_empty() {
        return Ok(Vec::new());
    }

    check_unique_people(people)?;

    let mut units = Vec::new();
    let mut finished = HashSet::new();

    for group in people.chunk_by(|a, b| a.affiliation == b.affiliation) {
        let affiliation = &group[0].affiliation;
        if !finished.insert(affiliation) {
            return Err(SeatingError::integrity(format!(
                "affiliation {affiliation} is not contiguous in the attendee list"
            )));
        }

        if group.len() <= capacity {
            units.push(SeatingUnit::whole(
                affiliation.clone(),
                group.to_vec(),
                units.len(),
            ));
            continue;
        }

        let sizes = balanced_fragment_sizes(group.len(), capacity);
        debug!(
            "Splitting affiliation {affiliation} ({} people) into fragments {sizes:?}",
            group.len()
        );
        let mut start = 0;
        for size in sizes {
            let fragment = group[start..start + size].to_vec();
            units.push(SeatingUnit::fragment(
                affiliation.clone(),
                fragment,
                units.len(),
            ));
            start += size;
        }
    }

    let built = units.len();
    let units = merge_small_units(units, capacity, strategy);
    debug!(
        "Built {} seating units ({built} before merging) from {} people",
        units.len(),
        people.len()
    );

    Ok(units)
}

/// Sizes of the fragments an oversized affiliation is split into.
///
/// `count.div_ceil(capacity)` fragments; the first `count % k` get one extra
/// person so that sizes differ by at most one.
pub fn balanced_fragment_sizes(count: usize, capacity: usize) -> Vec<usize> {
    if count == 0 || capacity == 0 {
        return Vec::new();
    }
    let fragments = count.div_ceil(capacity);
    let base = count / fragments;
    let extra = count % fragments;
    (0..fragments)
        .map(|i| base + usize::from(i < extra))
        .collect()
}

fn check_unique_people(people: &[Person]) -> Result<(), SeatingError> {
    let mut seen = HashSet::with_capacity(people.len());
    for person in people {
        if !seen.insert(person.id) {
            return Err(SeatingError::integrity(format!(
                "person {} ({}) appears more than once in the attendee list",
                person.id, person.name
            )));
        }
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seating::model::AffiliationId;
    use uuid::Uuid;

    fn roster(groups: &[(&str, usize)]) -> Vec<Person> {
        let mut people = Vec::new();
        for (g, (affiliation, count)) in groups.iter().enumerate() {
            for i in 0..*count {
                people.push(Person {
                    id: Uuid::from_u128((g as u128) * 10_000 + i as u128 + 1),
                    name: format!("{affiliation}-{i:03}"),
                    affiliation: AffiliationId::from(*affiliation),
                    role: None,
                });
            }
        }
        people
    }

    fn sizes(units: &[SeatingUnit]) -> Vec<usize> {
        units.iter().map(SeatingUnit::size).collect()
    }

    #[test]
    fn test_zero_capacity_is_configuration_error() {
        let err = build_units(&roster(&[("a", 2)]), 0).unwrap_err();
        assert!(matches!(err, SeatingError::Configuration(_)));
    }

    #[test]
    fn test_empty_roster_yields_no_units() {
        let units = build_units(&[], 8).unwrap();
        assert!(units.is_empty());
    }

    #[test]
    fn test_balanced_fragment_sizes() {
        assert_eq!(balanced_fragment_sizes(12, 10), vec![6, 6]);
        assert_eq!(balanced_fragment_sizes(25, 10), vec![9, 8, 8]);
        assert_eq!(balanced_fragment_sizes(20, 10), vec![10, 10]);
        assert_eq!(balanced_fragment_sizes(7, 10), vec![7]);
        assert_eq!(balanced_fragment_sizes(11, 1), vec![1; 11]);
    }

    #[test]
    fn test_oversized_affiliation_is_split_into_balanced_fragments() {
        let units = build_units(&roster(&[("a", 25)]), 10).unwrap();
        assert_eq!(sizes(&units), vec![9, 8, 8]);
        assert!(units.iter().all(SeatingUnit::is_split_fragment));
        assert!(units
            .iter()
            .all(|u| u.affiliations() == [AffiliationId::from("a")]));
    }

    #[test]
    fn test_fragments_keep_input_order() {
        let people = roster(&[("a", 12)]);
        let units = build_units(&people, 10).unwrap();
        let flattened: Vec<&Person> = units.iter().flat_map(|u| u.people()).collect();
        let expected: Vec<&Person> = people.iter().collect();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn test_small_affiliations_merge_when_they_fit() {
        let units = build_units(&roster(&[("a", 12), ("b", 5), ("c", 3)]), 10).unwrap();
        assert_eq!(sizes(&units), vec![6, 6, 8]);
        let merged = &units[2];
        assert!(merged.is_merged());
        assert!(!merged.is_split_fragment());
        assert_eq!(
            merged.affiliations(),
            [AffiliationId::from("b"), AffiliationId::from("c")]
        );
    }

    #[test]
    fn test_merging_can_be_disabled() {
        let units =
            build_units_with(&roster(&[("b", 5), ("c", 3)]), 10, MergeStrategy::Disabled).unwrap();
        assert_eq!(sizes(&units), vec![5, 3]);
        assert!(units.iter().all(|u| !u.is_merged()));
    }

    #[test]
    fn test_full_table_affiliation_is_not_merged() {
        let units = build_units(&roster(&[("a", 10), ("b", 2)]), 10).unwrap();
        assert_eq!(sizes(&units), vec![10, 2]);
        assert!(units.iter().all(|u| !u.is_merged()));
    }

    #[test]
    fn test_ordinals_follow_output_order() {
        let units = build_units(&roster(&[("a", 3), ("b", 12), ("c", 4)]), 10).unwrap();
        let ordinals: Vec<usize> = units.iter().map(SeatingUnit::ordinal).collect();
        assert_eq!(ordinals, (0..units.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_non_contiguous_affiliation_is_rejected() {
        let mut people = roster(&[("a", 2), ("b", 2)]);
        people.push(Person {
            id: Uuid::from_u128(99_999),
            name: "late".to_string(),
            affiliation: AffiliationId::from("a"),
            role: None,
        });
        let err = build_units(&people, 10).unwrap_err();
        assert!(matches!(err, SeatingError::DataIntegrity(_)));
    }

    #[test]
    fn test_duplicate_person_is_rejected() {
        let mut people = roster(&[("a", 2)]);
        people.push(people[0].clone());
        let err = build_units(&people, 10).unwrap_err();
        assert!(matches!(err, SeatingError::DataIntegrity(_)));
    }

    #[test]
    fn test_build_is_deterministic() {
        let people = roster(&[("a", 17), ("b", 4), ("c", 4), ("d", 9), ("e", 1)]);
        let first = build_units(&people, 8).unwrap();
        let second = build_units(&people, 8).unwrap();
        assert_eq!(first, second);
    }
}
