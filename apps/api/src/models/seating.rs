use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::seating::model::{AffiliationId, Person};

/// A seating option (one dinner, one banquet seating) and its table size.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SeatingOptionRow {
    pub id: Uuid,
    pub name: String,
    pub table_capacity: i32,
    pub table_count: Option<i32>,
    pub grid_columns: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// An attendee of an option joined with the key they should be seated by.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendeeRow {
    pub id: Uuid,
    pub name: String,
    pub role: Option<String>,
    pub affiliation_key: String,
    pub affiliation_name: String,
}

impl From<AttendeeRow> for Person {
    fn from(row: AttendeeRow) -> Self {
        Person {
            id: row.id,
            name: row.name,
            affiliation: AffiliationId::new(row.affiliation_key),
            role: row.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SeatingTableRow {
    pub id: Uuid,
    pub option_id: Uuid,
    pub number: i32,
    pub grid_row: i32,
    pub grid_column: i32,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SeatedPersonRow {
    pub table_id: Uuid,
    pub person_id: Uuid,
    pub person_name: String,
    pub studio_name: String,
}
