//! Post-placement checks.
//!
//! Fragmentation of a split affiliation is expected and reported. An
//! affiliation that was never split but still ends up at several tables, or a
//! table seated beyond its capacity, is an invariant violation.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::info;

use crate::seating::balance::BalanceReport;
use crate::seating::error::SeatingError;
use crate::seating::model::{AffiliationId, Table};

/// An affiliation seated at more than one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentedAffiliation {
    pub affiliation: AffiliationId,
    pub table_numbers: Vec<u32>,
    pub people: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementDiagnostics {
    /// Ordered by affiliation id.
    pub fragmented: Vec<FragmentedAffiliation>,
    /// Spread of people per table.
    pub occupancy: BalanceReport,
}

#[derive(Default)]
struct Presence {
    tables: BTreeSet<u32>,
    people: usize,
    all_split: bool,
}

/// Checks a finished placement and reports fragmented affiliations.
pub fn check_placement(tables: &[Table]) -> Result<PlacementDiagnostics, SeatingError> {
    for table in tables {
        if table.occupancy() > table.capacity {
            return Err(SeatingError::integrity(format!(
                "table {} seats {} people but holds only {}",
                table.number,
                table.occupancy(),
                table.capacity
            )));
        }
    }

    let mut presence: BTreeMap<&AffiliationId, Presence> = BTreeMap::new();
    for table in tables {
        for unit in &table.units {
            for affiliation in unit.affiliations() {
                let entry = presence.entry(affiliation).or_insert_with(|| Presence {
                    all_split: true,
                    ..Presence::default()
                });
                entry.tables.insert(table.number);
                entry.all_split &= unit.is_split_fragment();
                entry.people += unit
                    .people()
                    .iter()
                    .filter(|p| &p.affiliation == affiliation)
                    .count();
            }
        }
    }

    let mut fragmented = Vec::new();
    for (affiliation, seen) in presence {
        if seen.tables.len() < 2 {
            continue;
        }
        if !seen.all_split {
            return Err(SeatingError::integrity(format!(
                "affiliation {affiliation} was not split but is seated at tables {:?}",
                seen.tables
            )));
        }
        info!(
            "Affiliation {affiliation} ({} people) spans tables {:?}",
            seen.people, seen.tables
        );
        fragmented.push(FragmentedAffiliation {
            affiliation: affiliation.clone(),
            table_numbers: seen.tables.into_iter().collect(),
            people: seen.people,
        });
    }

    let loads: Vec<u64> = tables.iter().map(|t| t.occupancy() as u64).collect();

    Ok(PlacementDiagnostics {
        fragmented,
        occupancy: BalanceReport::from_loads(&loads),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seating::model::{Person, SeatingUnit};
    use uuid::Uuid;

    fn members(affiliation: &str, size: usize, seed: u128) -> Vec<Person> {
        (0..size)
            .map(|i| Person {
                id: Uuid::from_u128(seed * 100 + i as u128),
                name: format!("{affiliation}{i}"),
                affiliation: AffiliationId::from(affiliation),
                role: None,
            })
            .collect()
    }

    fn table(number: u32, units: Vec<SeatingUnit>) -> Table {
        Table {
            number,
            row: 0,
            column: number - 1,
            capacity: 10,
            units,
        }
    }

    #[test]
    fn test_split_affiliation_is_reported() {
        let a = AffiliationId::from("a");
        let tables = vec![
            table(1, vec![SeatingUnit::fragment(a.clone(), members("a", 6, 1), 0)]),
            table(2, vec![SeatingUnit::fragment(a.clone(), members("a", 6, 2), 1)]),
            table(3, vec![SeatingUnit::whole("b".into(), members("b", 8, 3), 2)]),
        ];
        let diagnostics = check_placement(&tables).unwrap();
        assert_eq!(
            diagnostics.fragmented,
            vec![FragmentedAffiliation {
                affiliation: a,
                table_numbers: vec![1, 2],
                people: 12,
            }]
        );
        assert_eq!(diagnostics.occupancy.min, 6);
        assert_eq!(diagnostics.occupancy.max, 8);
    }

    #[test]
    fn test_unsplit_affiliation_at_two_tables_is_violation() {
        let tables = vec![
            table(1, vec![SeatingUnit::whole("a".into(), members("a", 3, 1), 0)]),
            table(2, vec![SeatingUnit::whole("a".into(), members("a", 3, 2), 1)]),
        ];
        let err = check_placement(&tables).unwrap_err();
        assert!(matches!(err, SeatingError::DataIntegrity(_)));
    }

    #[test]
    fn test_over_capacity_table_is_violation() {
        let tables = vec![table(
            1,
            vec![SeatingUnit::whole("a".into(), members("a", 11, 1), 0)],
        )];
        let err = check_placement(&tables).unwrap_err();
        assert!(matches!(err, SeatingError::DataIntegrity(_)));
    }

    #[test]
    fn test_no_tables_is_clean() {
        let diagnostics = check_placement(&[]).unwrap();
        assert!(diagnostics.fragmented.is_empty());
        assert_eq!(diagnostics.occupancy.bucket_count, 0);
    }
}
