//! Grid Placer: assigns seating units to tables.
//!
//! Largest-first placement. For each unit, in priority order:
//! 1. a table that already hosts one of the unit's affiliations and still has
//!    room (siblings of a split affiliation are reunited; tightest table wins)
//! 2. a table with room and no affiliation overlap, taking the one with the
//!    most seats left so occupancy evens out
//! 3. a newly opened table
//!
//! Ties always go to the lowest table number.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::seating::balance::{select_bucket, Preference};
use crate::seating::error::SeatingError;
use crate::seating::model::{AffiliationId, SeatingUnit, Table};

/// Shape of the table grid for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub capacity: usize,
    pub columns: u32,
}

impl GridConfig {
    pub fn new(capacity: usize, columns: u32) -> Result<Self, SeatingError> {
        if capacity == 0 {
            return Err(SeatingError::configuration(
                "table capacity must be a positive number",
            ));
        }
        if columns == 0 {
            return Err(SeatingError::configuration(
                "grid must have at least one column",
            ));
        }
        Ok(Self { capacity, columns })
    }

    /// Row and column of a 1-based table number, filled row by row.
    pub fn position(&self, number: u32) -> (u32, u32) {
        let index = number.saturating_sub(1);
        (index / self.columns, index % self.columns)
    }

    fn open_table(&self, index: usize) -> OpenTable {
        let number = index as u32 + 1;
        let (row, column) = self.position(number);
        OpenTable {
            table: Table {
                number,
                row,
                column,
                capacity: self.capacity,
                units: Vec::new(),
            },
            remaining: self.capacity,
            seated: BTreeSet::new(),
        }
    }
}

struct OpenTable {
    table: Table,
    remaining: usize,
    seated: BTreeSet<AffiliationId>,
}

impl OpenTable {
    fn fits(&self, unit: &SeatingUnit) -> bool {
        unit.size() <= self.remaining
    }

    fn overlaps(&self, unit: &SeatingUnit) -> bool {
        unit.affiliations().iter().any(|a| self.seated.contains(a))
    }

    fn seat(&mut self, unit: SeatingUnit) {
        self.remaining -= unit.size();
        self.seated.extend(unit.affiliations().iter().cloned());
        self.table.units.push(unit);
    }
}

/// Places `units` onto tables.
///
/// With `table_count_hint`, that many empty tables are opened up front; more
/// are opened on demand if they fill up.
pub fn place(
    units: Vec<SeatingUnit>,
    grid: &GridConfig,
    table_count_hint: Option<usize>,
) -> Result<Vec<Table>, SeatingError> {
    check_hint(table_count_hint, units.len())?;

    if let Some(unit) = units.iter().find(|u| u.size() > grid.capacity) {
        return Err(SeatingError::integrity(format!(
            "seating unit for {} has {} people but tables seat {}",
            unit.primary_affiliation(),
            unit.size(),
            grid.capacity
        )));
    }

    let mut ordered = units;
    ordered.sort_by(|a, b| {
        b.size()
            .cmp(&a.size())
            .then_with(|| a.primary_affiliation().cmp(b.primary_affiliation()))
            .then_with(|| a.ordinal().cmp(&b.ordinal()))
    });

    let hinted = table_count_hint.unwrap_or(0);
    let mut tables: Vec<OpenTable> = (0..hinted).map(|i| grid.open_table(i)).collect();

    for unit in ordered {
        let index = match choose_table(&tables, &unit) {
            Some(index) => index,
            None => {
                if hinted > 0 && tables.len() == hinted {
                    warn!(
                        "All {hinted} hinted tables are full; opening extra tables on demand"
                    );
                }
                tables.push(grid.open_table(tables.len()));
                tables.len() - 1
            }
        };
        debug!(
            "Seating unit {} ({} people, {}) at table {}",
            unit.ordinal(),
            unit.size(),
            unit.primary_affiliation(),
            tables[index].table.number
        );
        tables[index].seat(unit);
    }

    Ok(tables.into_iter().map(|t| t.table).collect())
}

fn choose_table(tables: &[OpenTable], unit: &SeatingUnit) -> Option<usize> {
    select_bucket(
        tables,
        |t| t.fits(unit) && t.overlaps(unit),
        |t| t.remaining,
        Preference::Least,
    )
    .or_else(|| {
        select_bucket(
            tables,
            |t| t.fits(unit) && !t.overlaps(unit),
            |t| t.remaining,
            Preference::Most,
        )
    })
}

fn check_hint(hint: Option<usize>, unit_count: usize) -> Result<(), SeatingError> {
    match hint {
        Some(0) if unit_count > 0 => Err(SeatingError::configuration(
            "table count hint must be positive when there are people to seat",
        )),
        Some(h) if h > unit_count => Err(SeatingError::configuration(format!(
            "table count hint {h} exceeds the {unit_count} seating units; tables would stay empty"
        ))),
        _ => Ok(()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seating::model::Person;
    use uuid::Uuid;

    fn people(affiliation: &str, size: usize, seed: u128) -> Vec<Person> {
        (0..size)
            .map(|i| Person {
                id: Uuid::from_u128(seed * 1_000 + i as u128),
                name: format!("{affiliation}-{i}"),
                affiliation: AffiliationId::from(affiliation),
                role: None,
            })
            .collect()
    }

    fn whole(affiliation: &str, size: usize, ordinal: usize) -> SeatingUnit {
        SeatingUnit::whole(
            AffiliationId::from(affiliation),
            people(affiliation, size, ordinal as u128),
            ordinal,
        )
    }

    fn fragment(affiliation: &str, size: usize, ordinal: usize) -> SeatingUnit {
        SeatingUnit::fragment(
            AffiliationId::from(affiliation),
            people(affiliation, size, ordinal as u128),
            ordinal,
        )
    }

    fn grid(capacity: usize) -> GridConfig {
        GridConfig::new(capacity, 4).unwrap()
    }

    fn occupancies(tables: &[Table]) -> Vec<usize> {
        tables.iter().map(Table::occupancy).collect()
    }

    #[test]
    fn test_grid_rejects_zero_columns() {
        assert!(matches!(
            GridConfig::new(10, 0),
            Err(SeatingError::Configuration(_))
        ));
    }

    #[test]
    fn test_grid_positions_fill_rows() {
        let g = grid(8);
        assert_eq!(g.position(1), (0, 0));
        assert_eq!(g.position(4), (0, 3));
        assert_eq!(g.position(5), (1, 0));
        assert_eq!(g.position(10), (2, 1));
    }

    #[test]
    fn test_empty_units_yield_no_tables() {
        let tables = place(Vec::new(), &grid(10), None).unwrap();
        assert!(tables.is_empty());
    }

    #[test]
    fn test_oversized_unit_is_integrity_error() {
        let err = place(vec![whole("a", 11, 0)], &grid(10), None).unwrap_err();
        assert!(matches!(err, SeatingError::DataIntegrity(_)));
    }

    #[test]
    fn test_split_siblings_avoid_each_other_when_they_cannot_share() {
        // 6 + 6 cannot share a table of 10; the merged 8 opens the first table.
        let units = vec![fragment("a", 6, 0), fragment("a", 6, 1), whole("b", 8, 2)];
        let tables = place(units, &grid(10), None).unwrap();
        assert_eq!(tables.len(), 3);
        assert_eq!(occupancies(&tables), vec![8, 6, 6]);
        assert!(tables[0].hosts(&AffiliationId::from("b")));
        assert!(tables[1].hosts(&AffiliationId::from("a")));
        assert!(tables[2].hosts(&AffiliationId::from("a")));
    }

    #[test]
    fn test_split_siblings_reunite_when_room_allows() {
        let units = vec![fragment("a", 4, 0), fragment("a", 3, 1), whole("b", 5, 2)];
        let tables = place(units, &grid(10), None).unwrap();
        // b5 → T1; a4 → T1 has room 5 and no overlap → T1 (most room); a3 → T1 hosts a, room 1 → no;
        // no other table → T2.
        assert_eq!(tables.len(), 2);
        assert_eq!(occupancies(&tables), vec![9, 3]);

        let units = vec![fragment("a", 4, 0), fragment("a", 3, 1), whole("b", 8, 2)];
        let tables = place(units, &grid(10), None).unwrap();
        // b8 → T1; a4 → T2; a3 → T2 (hosts a, room 6).
        assert_eq!(tables.len(), 2);
        assert_eq!(occupancies(&tables), vec![8, 7]);
        assert_eq!(tables[1].units.len(), 2);
    }

    #[test]
    fn test_unrelated_unit_goes_to_emptiest_table() {
        let units = vec![whole("a", 4, 0), whole("b", 3, 1), whole("c", 3, 2)];
        let tables = place(units, &grid(10), Some(2)).unwrap();
        // a4 → T1 (tie on 10 → lowest number); b3 → T2 (10 > 6); c3 → T2 (7 > 6).
        assert_eq!(occupancies(&tables), vec![4, 6]);
    }

    #[test]
    fn test_hint_grows_on_demand() {
        let units = vec![whole("a", 9, 0), whole("b", 9, 1), whole("c", 9, 2)];
        let tables = place(units, &grid(10), Some(2)).unwrap();
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[2].number, 3);
    }

    #[test]
    fn test_hint_inconsistent_with_units() {
        let err = place(vec![whole("a", 2, 0)], &grid(10), Some(3)).unwrap_err();
        assert!(matches!(err, SeatingError::Configuration(_)));
        let err = place(vec![whole("a", 2, 0)], &grid(10), Some(0)).unwrap_err();
        assert!(matches!(err, SeatingError::Configuration(_)));
        assert!(place(Vec::new(), &grid(10), Some(0)).unwrap().is_empty());
    }

    #[test]
    fn test_ties_broken_by_affiliation_then_ordinal() {
        let units = vec![whole("c", 5, 0), whole("a", 5, 1), whole("b", 5, 2)];
        let tables = place(units, &grid(5), None).unwrap();
        let order: Vec<String> = tables
            .iter()
            .map(|t| t.units[0].primary_affiliation().to_string())
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_table_numbers_and_positions() {
        let units = (0..6).map(|i| whole(&format!("s{i}"), 5, i)).collect();
        let tables = place(units, &grid(5), None).unwrap();
        let numbers: Vec<u32> = tables.iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!((tables[4].row, tables[4].column), (1, 0));
    }
}
