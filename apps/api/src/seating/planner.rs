//! Seating planner: runs unit building, placement and diagnostics over one
//! attendee snapshot and derives the person → table mapping.
//!
//! Pure and synchronous. Callers on the async runtime must run it inside
//! `tokio::task::spawn_blocking`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::seating::diagnostics::{check_placement, PlacementDiagnostics};
use crate::seating::error::SeatingError;
use crate::seating::merge::MergeStrategy;
use crate::seating::model::{AffiliationId, Person, Table};
use crate::seating::placer::{place, GridConfig};
use crate::seating::units::build_units_with;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Everything a run needs besides the attendees themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatingSettings {
    pub capacity: usize,
    pub table_count_hint: Option<usize>,
    pub grid_columns: u32,
    pub merge_strategy: MergeStrategy,
}

impl SeatingSettings {
    pub const DEFAULT_GRID_COLUMNS: u32 = 10;

    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            table_count_hint: None,
            grid_columns: Self::DEFAULT_GRID_COLUMNS,
            merge_strategy: MergeStrategy::default(),
        }
    }
}

/// Where one person ends up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatAssignment {
    pub person_id: Uuid,
    pub person_name: String,
    pub affiliation: AffiliationId,
    pub table_number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub people: usize,
    pub units: usize,
    pub split_fragments: usize,
    pub merged_units: usize,
    pub tables: usize,
}

/// Result of a seating run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatingPlan {
    pub settings: SeatingSettings,
    pub tables: Vec<Table>,
    /// Ordered by table number, then seating order within the table.
    pub assignments: Vec<SeatAssignment>,
    pub diagnostics: PlacementDiagnostics,
    pub summary: PlanSummary,
}

impl SeatingPlan {
    #[cfg(test)]
    pub fn table_for(&self, person_id: Uuid) -> Option<u32> {
        self.assignments
            .iter()
            .find(|a| a.person_id == person_id)
            .map(|a| a.table_number)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Planning
// ────────────────────────────────────────────────────────────────────────────

/// Computes a seating plan for `people`, which must be ordered by
/// affiliation name then person name.
pub fn plan_seating(
    people: &[Person],
    settings: &SeatingSettings,
) -> Result<SeatingPlan, SeatingError> {
    let grid = GridConfig::new(settings.capacity, settings.grid_columns)?;

    let units = build_units_with(people, settings.capacity, settings.merge_strategy)?;
    let split_fragments = units.iter().filter(|u| u.is_split_fragment()).count();
    let merged_units = units.iter().filter(|u| u.is_merged()).count();
    let unit_count = units.len();

    let tables = place(units, &grid, settings.table_count_hint)?;
    let diagnostics = check_placement(&tables)?;
    let assignments = assignments_for(&tables);
    check_conservation(people, &assignments)?;

    let summary = PlanSummary {
        people: people.len(),
        units: unit_count,
        split_fragments,
        merged_units,
        tables: tables.len(),
    };
    info!(
        "Seated {} people in {} units at {} tables (capacity {}, {} fragmented affiliations)",
        summary.people,
        summary.units,
        summary.tables,
        settings.capacity,
        diagnostics.fragmented.len()
    );

    Ok(SeatingPlan {
        settings: *settings,
        tables,
        assignments,
        diagnostics,
        summary,
    })
}

fn assignments_for(tables: &[Table]) -> Vec<SeatAssignment> {
    tables
        .iter()
        .flat_map(|table| {
            table.people().map(move |person| SeatAssignment {
                person_id: person.id,
                person_name: person.name.clone(),
                affiliation: person.affiliation.clone(),
                table_number: table.number,
            })
        })
        .collect()
}

/// Every input person must be seated exactly once.
fn check_conservation(people: &[Person], assignments: &[SeatAssignment]) -> Result<(), SeatingError> {
    let mut seated: HashMap<Uuid, usize> = HashMap::with_capacity(assignments.len());
    for assignment in assignments {
        *seated.entry(assignment.person_id).or_default() += 1;
    }

    for person in people {
        match seated.get(&person.id).copied() {
            Some(1) => {}
            Some(n) => {
                return Err(SeatingError::integrity(format!(
                    "person {} is seated {n} times",
                    person.id
                )))
            }
            None => {
                return Err(SeatingError::integrity(format!(
                    "person {} was not seated",
                    person.id
                )))
            }
        }
    }

    if assignments.len() != people.len() {
        return Err(SeatingError::integrity(format!(
            "{} seats assigned for {} people",
            assignments.len(),
            people.len()
        )));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
