//! Persistence adapter for seating runs.
//!
//! Reads an option's capacity config and attendees, and replaces the option's
//! tables and person → table rows in one transaction.
//!
//! Tables touched:
//! - `seating_options (id, name, table_capacity, table_count, grid_columns, created_at)`
//! - `studios (id, name)`, `people (id, name, role, studio_id, seating_group)`
//! - `option_attendees (option_id, person_id)`
//! - `seating_tables (id, option_id, number, grid_row, grid_column, capacity, created_at)`
//! - `seating_assignments (option_id, table_id, person_id)`

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::seating::{AttendeeRow, SeatedPersonRow, SeatingOptionRow, SeatingTableRow};
use crate::seating::model::Person;
use crate::seating::planner::SeatingPlan;

// ────────────────────────────────────────────────────────────────────────────
// Read model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredSeat {
    pub person_id: Uuid,
    pub person_name: String,
    pub studio_name: String,
}

/// A persisted table with the people seated at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredTable {
    pub number: i32,
    pub grid_row: i32,
    pub grid_column: i32,
    pub capacity: i32,
    pub seats: Vec<StoredSeat>,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Source of seating input and sink for seating results.
///
/// Carried in `AppState` as `Arc<dyn SeatingStore>`.
#[async_trait]
pub trait SeatingStore: Send + Sync {
    async fn load_option(&self, option_id: Uuid) -> Result<Option<SeatingOptionRow>, AppError>;

    /// Attendees of the option, ordered by affiliation name, then person name.
    async fn load_people(&self, option_id: Uuid) -> Result<Vec<Person>, AppError>;

    /// Replaces every table and seat of the option with `plan`, all or nothing.
    async fn replace_assignment(&self, option_id: Uuid, plan: &SeatingPlan)
        -> Result<(), AppError>;

    async fn load_assignment(&self, option_id: Uuid) -> Result<Vec<StoredTable>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL
// ────────────────────────────────────────────────────────────────────────────

pub struct PgSeatingStore {
    pool: PgPool,
}

impl PgSeatingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeatingStore for PgSeatingStore {
    async fn load_option(&self, option_id: Uuid) -> Result<Option<SeatingOptionRow>, AppError> {
        Ok(
            sqlx::query_as::<_, SeatingOptionRow>("SELECT * FROM seating_options WHERE id = $1")
                .bind(option_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn load_people(&self, option_id: Uuid) -> Result<Vec<Person>, AppError> {
        // A coordinated seating group overrides the studio. Ordering by the key
        // after the name keeps equally named affiliations contiguous.
        let rows = sqlx::query_as::<_, AttendeeRow>(
            r#"
            SELECT p.id,
                   p.name,
                   p.role,
                   CASE WHEN p.seating_group IS NOT NULL
                        THEN 'group:' || p.seating_group
                        ELSE s.id::text
                   END AS affiliation_key,
                   COALESCE(p.seating_group, s.name) AS affiliation_name
            FROM option_attendees oa
            JOIN people p ON p.id = oa.person_id
            JOIN studios s ON s.id = p.studio_id
            WHERE oa.option_id = $1
            ORDER BY affiliation_name, affiliation_key, p.name, p.id
            "#,
        )
        .bind(option_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Person::from).collect())
    }

    async fn replace_assignment(
        &self,
        option_id: Uuid,
        plan: &SeatingPlan,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent runs for the same option.
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM seating_options WHERE id = $1 FOR UPDATE")
                .bind(option_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(AppError::NotFound(format!("Seating option {option_id} not found")));
        }

        sqlx::query("DELETE FROM seating_assignments WHERE option_id = $1")
            .bind(option_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM seating_tables WHERE option_id = $1")
            .bind(option_id)
            .execute(&mut *tx)
            .await?;

        for table in &plan.tables {
            let table_id: Uuid = sqlx::query_scalar(
                r#"
                INSERT INTO seating_tables (option_id, number, grid_row, grid_column, capacity)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(option_id)
            .bind(table.number as i32)
            .bind(table.row as i32)
            .bind(table.column as i32)
            .bind(table.capacity as i32)
            .fetch_one(&mut *tx)
            .await?;

            for person in table.people() {
                sqlx::query(
                    "INSERT INTO seating_assignments (option_id, table_id, person_id) VALUES ($1, $2, $3)",
                )
                .bind(option_id)
                .bind(table_id)
                .bind(person.id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        info!(
            "Replaced seating for option {option_id}: {} tables, {} seats",
            plan.tables.len(),
            plan.assignments.len()
        );
        Ok(())
    }

    async fn load_assignment(&self, option_id: Uuid) -> Result<Vec<StoredTable>, AppError> {
        let tables = sqlx::query_as::<_, SeatingTableRow>(
            "SELECT * FROM seating_tables WHERE option_id = $1 ORDER BY number",
        )
        .bind(option_id)
        .fetch_all(&self.pool)
        .await?;

        let seats = sqlx::query_as::<_, SeatedPersonRow>(
            r#"
            SELECT sa.table_id, p.id AS person_id, p.name AS person_name, s.name AS studio_name
            FROM seating_assignments sa
            JOIN people p ON p.id = sa.person_id
            JOIN studios s ON s.id = p.studio_id
            WHERE sa.option_id = $1
            ORDER BY s.name, p.name, p.id
            "#,
        )
        .bind(option_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(group_seats(tables, seats))
    }
}

fn group_seats(tables: Vec<SeatingTableRow>, seats: Vec<SeatedPersonRow>) -> Vec<StoredTable> {
    let mut by_table: HashMap<Uuid, Vec<StoredSeat>> = HashMap::new();
    for seat in seats {
        by_table.entry(seat.table_id).or_default().push(StoredSeat {
            person_id: seat.person_id,
            person_name: seat.person_name,
            studio_name: seat.studio_name,
        });
    }

    tables
        .into_iter()
        .map(|table| StoredTable {
            number: table.number,
            grid_row: table.grid_row,
            grid_column: table.grid_column,
            capacity: table.capacity,
            seats: by_table.remove(&table.id).unwrap_or_default(),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory store for tests
// ────────────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn table_row(id: u128, number: i32) -> SeatingTableRow {
        SeatingTableRow {
            id: Uuid::from_u128(id),
            option_id: Uuid::nil(),
            number,
            grid_row: 0,
            grid_column: number - 1,
            capacity: 8,
            created_at: Utc::now(),
        }
    }

    fn seat(table: u128, person: u128, name: &str) -> SeatedPersonRow {
        SeatedPersonRow {
            table_id: Uuid::from_u128(table),
            person_id: Uuid::from_u128(person),
            person_name: name.to_string(),
            studio_name: "Studio".to_string(),
        }
    }

    #[test]
    fn test_group_seats_by_table() {
        let tables = vec![table_row(1, 1), table_row(2, 2), table_row(3, 3)];
        let seats = vec![seat(2, 10, "Ana"), seat(1, 11, "Ben"), seat(2, 12, "Cy")];
        let grouped = group_seats(tables, seats);

        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[0].seats.len(), 1);
        let names: Vec<&str> = grouped[1].seats.iter().map(|s| s.person_name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Cy"]);
        assert!(grouped[2].seats.is_empty());
    }

    #[test]
    fn test_attendee_row_into_person() {
        let row = AttendeeRow {
            id: Uuid::from_u128(7),
            name: "Dee".to_string(),
            role: Some("teacher".to_string()),
            affiliation_key: "group:Finalists".to_string(),
            affiliation_name: "Finalists".to_string(),
        };
        let person = Person::from(row);
        assert_eq!(person.affiliation.as_str(), "group:Finalists");
        assert_eq!(person.role.as_deref(), Some("teacher"));
    }
}
