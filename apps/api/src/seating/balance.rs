//! Balance Reporter: longest-processing-time-first load balancing.
//!
//! `select_bucket` is the shared selection primitive: pick the admissible
//! bucket with the least (or most) key, ties going to the lowest index. The
//! grid placer reuses it for table selection and `distribute` uses it to
//! spread weighted items over a fixed number of buckets.
//!
//! # Bound
//! After `distribute`, `max_weight - min_weight <= heaviest item weight`.
//! The last item added to the heaviest bucket went to a bucket that was the
//! lightest at that moment, and loads never decrease.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::seating::error::SeatingError;

// ────────────────────────────────────────────────────────────────────────────
// Selection primitive
// ────────────────────────────────────────────────────────────────────────────

/// Which end of the key range `select_bucket` prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    Least,
    Most,
}

/// Returns the index of the admissible bucket with the preferred key.
///
/// Ties go to the lowest index, so the result depends only on slice order.
pub fn select_bucket<B, K, A, F>(
    buckets: &[B],
    mut admissible: A,
    mut key: F,
    preference: Preference,
) -> Option<usize>
where
    K: Ord,
    A: FnMut(&B) -> bool,
    F: FnMut(&B) -> K,
{
    let mut best: Option<(usize, K)> = None;

    for (index, bucket) in buckets.iter().enumerate() {
        if !admissible(bucket) {
            continue;
        }
        let candidate = key(bucket);
        let better = match &best {
            None => true,
            Some((_, current)) => match preference {
                Preference::Least => candidate < *current,
                Preference::Most => candidate > *current,
            },
        };
        if better {
            best = Some((index, candidate));
        }
    }

    best.map(|(index, _)| index)
}

// ────────────────────────────────────────────────────────────────────────────
// Weighted distribution
// ────────────────────────────────────────────────────────────────────────────

/// One bucket produced by `distribute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket<T> {
    pub index: usize,
    pub total_weight: u64,
    pub items: Vec<(u64, T)>,
}

/// Spreads weighted items over `bucket_count` buckets.
///
/// Items are visited heaviest first (stable for equal weights) and each goes
/// to the currently lightest bucket.
pub fn distribute<T>(
    mut items: Vec<(u64, T)>,
    bucket_count: usize,
) -> Result<Vec<Bucket<T>>, SeatingError> {
    if bucket_count == 0 {
        return Err(SeatingError::configuration(
            "bucket count must be positive",
        ));
    }

    items.sort_by_key(|(weight, _)| Reverse(*weight));

    let mut buckets: Vec<Bucket<T>> = (0..bucket_count)
        .map(|index| Bucket {
            index,
            total_weight: 0,
            items: Vec::new(),
        })
        .collect();

    for (weight, payload) in items {
        let target = select_bucket(&buckets, |_| true, |b| b.total_weight, Preference::Least)
            .ok_or_else(|| SeatingError::integrity("no bucket available for item"))?;
        let bucket = &mut buckets[target];
        bucket.total_weight = bucket.total_weight.checked_add(weight).ok_or_else(|| {
            SeatingError::configuration(format!(
                "total weight of bucket {} exceeds {}",
                bucket.index,
                u64::MAX
            ))
        })?;
        bucket.items.push((weight, payload));
    }

    Ok(buckets)
}

// ────────────────────────────────────────────────────────────────────────────
// Reporting
// ────────────────────────────────────────────────────────────────────────────

/// Spread of a set of loads (bucket weights, table occupancies).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub bucket_count: usize,
    pub min: u64,
    pub max: u64,
    pub spread: u64,
    pub mean: f64,
}

impl BalanceReport {
    pub fn from_loads(loads: &[u64]) -> Self {
        let min = loads.iter().copied().min().unwrap_or(0);
        let max = loads.iter().copied().max().unwrap_or(0);
        let mean = if loads.is_empty() {
            0.0
        } else {
            loads.iter().map(|l| u128::from(*l)).sum::<u128>() as f64 / loads.len() as f64
        };

        Self {
            bucket_count: loads.len(),
            min,
            max,
            spread: max - min,
            mean,
        }
    }

    pub fn from_buckets<T>(buckets: &[Bucket<T>]) -> Self {
        let loads: Vec<u64> = buckets.iter().map(|b| b.total_weight).collect();
        Self::from_loads(&loads)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Reviewer workload
// ────────────────────────────────────────────────────────────────────────────

/// A named piece of work, e.g. a heat with its entry count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadItem {
    pub label: String,
    pub weight: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewerLoad {
    pub reviewer: usize,
    pub total_weight: u64,
    pub items: Vec<WorkloadItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadPlan {
    pub reviewers: Vec<ReviewerLoad>,
    pub report: BalanceReport,
}

/// Balances workload items across a fixed number of reviewers (judges).
pub fn balance_workload(
    items: Vec<WorkloadItem>,
    reviewer_count: usize,
) -> Result<WorkloadPlan, SeatingError> {
    let weighted = items.into_iter().map(|item| (item.weight, item)).collect();
    let buckets = distribute(weighted, reviewer_count)?;
    let report = BalanceReport::from_buckets(&buckets);

    let reviewers = buckets
        .into_iter()
        .map(|bucket| ReviewerLoad {
            reviewer: bucket.index,
            total_weight: bucket.total_weight,
            items: bucket.items.into_iter().map(|(_, item)| item).collect(),
        })
        .collect();

    Ok(WorkloadPlan { reviewers, report })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
