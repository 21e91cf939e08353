//! Seating run orchestration.
//!
//! Flow: load option → derive settings → load attendees → plan on a blocking
//! worker → persist (unless dry run). Any error aborts before the write.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::seating::SeatingOptionRow;
use crate::seating::error::SeatingError;
use crate::seating::merge::MergeStrategy;
use crate::seating::planner::{plan_seating, SeatingPlan, SeatingSettings};
use crate::seating::store::SeatingStore;

/// Service-wide defaults applied when an option leaves a value unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatingDefaults {
    pub merge_strategy: MergeStrategy,
    pub grid_columns: u32,
}

impl Default for SeatingDefaults {
    fn default() -> Self {
        Self {
            merge_strategy: MergeStrategy::default(),
            grid_columns: SeatingSettings::DEFAULT_GRID_COLUMNS,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatingRun {
    pub option_id: Uuid,
    pub option_name: String,
    pub dry_run: bool,
    pub plan: SeatingPlan,
}

/// Converts a stored option into run settings, rejecting non-positive values.
pub fn settings_for(
    option: &SeatingOptionRow,
    defaults: &SeatingDefaults,
) -> Result<SeatingSettings, SeatingError> {
    let capacity = positive(option.table_capacity, "table capacity")?;
    let table_count_hint = option
        .table_count
        .map(|count| positive(count, "table count"))
        .transpose()?;
    let grid_columns = match option.grid_columns {
        Some(columns) => positive(columns, "grid columns")? as u32,
        None => defaults.grid_columns,
    };

    Ok(SeatingSettings {
        table_count_hint,
        grid_columns,
        merge_strategy: defaults.merge_strategy,
        ..SeatingSettings::new(capacity)
    })
}

fn positive(value: i32, what: &str) -> Result<usize, SeatingError> {
    usize::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| SeatingError::configuration(format!("{what} must be positive, got {value}")))
}

/// Computes the seating plan for an option and, unless `dry_run`, replaces
/// the stored assignment with it.
pub async fn run_seating(
    store: &dyn SeatingStore,
    defaults: &SeatingDefaults,
    option_id: Uuid,
    dry_run: bool,
) -> Result<SeatingRun, AppError> {
    let option = store
        .load_option(option_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Seating option {option_id} not found")))?;

    let settings = settings_for(&option, defaults)?;
    let people = store.load_people(option_id).await?;
    info!(
        "Planning seating for option '{}' ({} people, capacity {})",
        option.name,
        people.len(),
        settings.capacity
    );

    let plan = tokio::task::spawn_blocking(move || plan_seating(&people, &settings))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Seating worker failed: {e}")))??;

    if plan.is_empty() {
        info!("Option {option_id} has no attendees; the plan has no tables");
    }

    if dry_run {
        info!("Dry run for option {option_id}: nothing persisted");
    } else {
        store.replace_assignment(option_id, &plan).await?;
    }

    Ok(SeatingRun {
        option_id,
        option_name: option.name,
        dry_run,
        plan,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
