//! Entry session: sets typed in by the user, held in memory until saved.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, TrainlogError};
use crate::models::SetRecord;
use crate::storage;

/// A set waiting to be saved. Its series index is assigned on save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingSet {
    pub exercise: String,
    pub week: String,
    pub weight: f64,
    pub reps: u32,
}

/// Sets entered but not yet written to the store.
///
/// A session belongs to one caller and is never persisted; saving clears it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pending: Vec<PendingSet>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        exercise: impl Into<String>,
        week: impl Into<String>,
        weight: f64,
        reps: u32,
    ) -> Result<&PendingSet> {
        let exercise = exercise.into();
        let week = week.into();
        if exercise.trim().is_empty() {
            return Err(TrainlogError::InvalidSet("exercise name is empty".into()));
        }
        if week.trim().is_empty() {
            return Err(TrainlogError::InvalidSet("week label is empty".into()));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(TrainlogError::InvalidSet(format!(
                "weight must be a non-negative number, got {weight}"
            )));
        }
        if reps == 0 {
            return Err(TrainlogError::InvalidSet("reps must be at least 1".into()));
        }

        self.pending.push(PendingSet {
            exercise,
            week,
            weight,
            reps,
        });
        Ok(&self.pending[self.pending.len() - 1])
    }

    /// Drop the pending set at `index` (0-based).
    pub fn remove(&mut self, index: usize) -> Result<PendingSet> {
        if index >= self.pending.len() {
            return Err(TrainlogError::PendingSetNotFound {
                index,
                len: self.pending.len(),
            });
        }
        Ok(self.pending.remove(index))
    }

    pub fn pending(&self) -> &[PendingSet] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Number the pending sets and append them to the store at `path`.
    ///
    /// Series indices continue after the highest index already stored for
    /// the same exercise and week. The session is cleared only when the
    /// append succeeds.
    pub fn save(&mut self, path: &Path) -> Result<Vec<SetRecord>> {
        if self.pending.is_empty() {
            return Ok(vec![]);
        }

        let mut next_series: HashMap<(String, String), u32> = HashMap::new();
        for record in storage::load_records(path)? {
            let next = next_series.entry((record.exercise, record.week)).or_insert(1);
            *next = (*next).max(record.series + 1);
        }

        let records: Vec<SetRecord> = self
            .pending
            .iter()
            .map(|set| {
                let next = next_series
                    .entry((set.exercise.clone(), set.week.clone()))
                    .or_insert(1);
                let series = *next;
                *next += 1;
                SetRecord::new(&set.exercise, &set.week, series, set.weight, set.reps)
            })
            .collect();

        storage::append_records(path, &records)?;
        self.pending.clear();
        info!(sets = records.len(), "Saved session");
        Ok(records)
    }
}
