//! Metrics engine: derives the per-exercise, per-week summary table from
//! raw set records.
//!
//! The summary is recomputed from scratch on every call. Rows are ordered
//! by exercise, then week, both compared as plain strings; week labels carry
//! no chronology, so "previous week" for `volume_delta` means the previous
//! row in that order.

use std::collections::BTreeMap;

use crate::models::{SetRecord, SummaryRecord};

/// Round to two decimals, exact halves going to the even neighbour.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Epley one-rep-max estimate: `weight * (1 + reps / 30)`.
pub fn estimate_one_rep_max(weight: f64, reps: u32) -> f64 {
    weight * (1.0 + reps as f64 / 30.0)
}

/// Build the summary table for `records`.
///
/// The 1RM of a group is estimated from its set with the lowest series
/// index only (the first such set in input order on ties), and the
/// intensity compares the group's mean weight against that rounded
/// estimate. A zero estimate gives a NaN intensity.
pub fn compute_summary(records: &[SetRecord]) -> Vec<SummaryRecord> {
    let mut groups: BTreeMap<(&str, &str), Vec<&SetRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.exercise.as_str(), record.week.as_str()))
            .or_default()
            .push(record);
    }

    let mut summary = Vec::with_capacity(groups.len());
    let mut previous: Option<(&str, f64)> = None;

    for ((exercise, week), sets) in groups {
        let Some(first) = sets.iter().min_by_key(|s| s.series) else {
            continue;
        };

        let set_count = sets.len();
        let mean_weight = sets.iter().map(|s| s.weight).sum::<f64>() / set_count as f64;
        let total_reps = sets.iter().map(|s| u64::from(s.reps)).sum::<u64>();
        let total_volume = sets.iter().map(|s| s.volume()).sum::<f64>();
        let max_weight = sets
            .iter()
            .map(|s| s.weight)
            .fold(f64::NEG_INFINITY, f64::max);

        let estimated_one_rep_max = round2(estimate_one_rep_max(first.weight, first.reps));
        let intensity_pct = if estimated_one_rep_max > 0.0 {
            round2(mean_weight / estimated_one_rep_max * 100.0)
        } else {
            f64::NAN
        };

        let volume_delta = match previous {
            Some((prev_exercise, prev_volume)) if prev_exercise == exercise => {
                Some(total_volume - prev_volume)
            }
            _ => None,
        };
        previous = Some((exercise, total_volume));

        summary.push(SummaryRecord {
            exercise: exercise.to_string(),
            week: week.to_string(),
            mean_weight,
            total_reps,
            total_volume,
            set_count,
            volume_per_set: round2(total_volume / set_count as f64),
            estimated_one_rep_max,
            intensity_pct,
            max_weight,
            volume_delta,
        });
    }

    summary
}
