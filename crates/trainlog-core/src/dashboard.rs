//! Filtering and headline figures over a computed summary table.

use serde::Serialize;

use crate::models::SummaryRecord;

/// Which weeks a dashboard view covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WeekFilter {
    #[default]
    All,
    Week(String),
}

impl WeekFilter {
    /// `None` and the literal "all" mean every week.
    pub fn from_option(week: Option<&str>) -> Self {
        match week {
            None => WeekFilter::All,
            Some(w) if w.eq_ignore_ascii_case("all") => WeekFilter::All,
            Some(w) => WeekFilter::Week(w.to_string()),
        }
    }

    pub fn matches(&self, week: &str) -> bool {
        match self {
            WeekFilter::All => true,
            WeekFilter::Week(w) => w == week,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            WeekFilter::All => "all weeks",
            WeekFilter::Week(w) => w,
        }
    }
}

/// Distinct weeks present in the summary, sorted.
pub fn available_weeks(summary: &[SummaryRecord]) -> Vec<String> {
    let mut weeks: Vec<String> = summary.iter().map(|r| r.week.clone()).collect();
    weeks.sort();
    weeks.dedup();
    weeks
}

/// Distinct exercises with data inside `filter`, sorted.
pub fn available_exercises(summary: &[SummaryRecord], filter: &WeekFilter) -> Vec<String> {
    let mut exercises: Vec<String> = summary
        .iter()
        .filter(|r| filter.matches(&r.week))
        .map(|r| r.exercise.clone())
        .collect();
    exercises.sort();
    exercises.dedup();
    exercises
}

/// Rows of one exercise inside `filter`, in summary order.
pub fn select<'a>(
    summary: &'a [SummaryRecord],
    filter: &WeekFilter,
    exercise: &str,
) -> Vec<&'a SummaryRecord> {
    summary
        .iter()
        .filter(|r| r.exercise == exercise && filter.matches(&r.week))
        .collect()
}

/// Every week of one exercise, regardless of any week filter.
pub fn exercise_history<'a>(summary: &'a [SummaryRecord], exercise: &str) -> Vec<&'a SummaryRecord> {
    select(summary, &WeekFilter::All, exercise)
}

/// Headline figures shown above a selection.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Headline {
    /// Mean of the weekly mean weights; NaN for an empty selection
    pub mean_weight: f64,
    pub total_reps: u64,
    pub total_volume: f64,
}

impl Headline {
    pub fn from_rows(rows: &[&SummaryRecord]) -> Self {
        let mean_weight = if rows.is_empty() {
            f64::NAN
        } else {
            rows.iter().map(|r| r.mean_weight).sum::<f64>() / rows.len() as f64
        };
        Self {
            mean_weight,
            total_reps: rows.iter().map(|r| r.total_reps).sum(),
            total_volume: rows.iter().map(|r| r.total_volume).sum(),
        }
    }
}
