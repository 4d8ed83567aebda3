//! Data models for trainlog.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainlogError};

/// Runtime configuration, read from `trainlog.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainlogConfig {
    /// CSV file holding every recorded set
    pub store_path: PathBuf,
    /// Workbook read by `trainlog import`
    pub workbook_path: PathBuf,
    /// First-cell text of the header row repeated inside workbook sheets
    pub header_marker: String,
    /// Directory `trainlog chart` writes SVG files into
    pub chart_dir: PathBuf,
    /// Host the dashboard server binds to
    pub host: String,
    /// Port the dashboard server binds to
    pub port: u16,
}

impl Default for TrainlogConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("data/progreso_entrenamiento.csv"),
            workbook_path: PathBuf::from("data/Progreso.xlsx"),
            header_marker: "Ejercicio".to_string(),
            chart_dir: PathBuf::from("charts"),
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl TrainlogConfig {
    pub const FILE_NAME: &'static str = "trainlog.yaml";

    /// Load the config from `path`, or from `trainlog.yaml` in the working
    /// directory when no path is given. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(Self::FILE_NAME));
        crate::storage::load_yaml(path)
    }
}

/// One performed set, the atomic row of the record store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetRecord {
    pub exercise: String,
    pub week: String,
    /// 1-based position within the exercise+week group
    pub series: u32,
    /// Kilograms
    pub weight: f64,
    pub reps: u32,
}

impl SetRecord {
    pub fn new(
        exercise: impl Into<String>,
        week: impl Into<String>,
        series: u32,
        weight: f64,
        reps: u32,
    ) -> Self {
        Self {
            exercise: exercise.into(),
            week: week.into(),
            series,
            weight,
            reps,
        }
    }

    pub fn volume(&self) -> f64 {
        self.weight * self.reps as f64
    }
}

/// Derived metrics for one exercise in one week.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryRecord {
    pub exercise: String,
    pub week: String,
    pub mean_weight: f64,
    pub total_reps: u64,
    pub total_volume: f64,
    pub set_count: usize,
    pub volume_per_set: f64,
    /// Epley estimate from the group's first set
    pub estimated_one_rep_max: f64,
    /// NaN when the estimated 1RM is zero
    pub intensity_pct: f64,
    pub max_weight: f64,
    /// None for the first week of each exercise
    pub volume_delta: Option<f64>,
}

/// A set produced by the spreadsheet import, carrying the group aggregates
/// the import attaches to every row.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSet {
    pub set: SetRecord,
    pub mean_weight: f64,
    pub total_reps: u64,
}

const MONTHS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// A week label in the log's "week of month + month name" convention,
/// e.g. "2ª Semana Marzo".
///
/// Labels are only ever composed, never parsed: the rest of the system
/// treats weeks as opaque strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekLabel {
    week_of_month: u8,
    month: u32,
}

impl WeekLabel {
    pub const MAX_WEEK_OF_MONTH: u8 = 4;

    pub fn new(week_of_month: u8, month: u32) -> Result<Self> {
        if !(1..=Self::MAX_WEEK_OF_MONTH).contains(&week_of_month) {
            return Err(TrainlogError::InvalidWeek(format!(
                "week of month must be between 1 and {}, got {week_of_month}",
                Self::MAX_WEEK_OF_MONTH
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(TrainlogError::InvalidWeek(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        Ok(Self {
            week_of_month,
            month,
        })
    }

    /// Label for the week containing `date`; days past the 28th count as
    /// the fourth week.
    pub fn for_date(date: NaiveDate) -> Self {
        let week = ((date.day() - 1) / 7 + 1).min(Self::MAX_WEEK_OF_MONTH as u32);
        Self {
            week_of_month: week as u8,
            month: date.month(),
        }
    }

    pub fn current() -> Self {
        Self::for_date(chrono::Local::now().date_naive())
    }

    pub fn month_name(&self) -> &'static str {
        MONTHS[(self.month - 1) as usize]
    }
}

impl fmt::Display for WeekLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ª Semana {}", self.week_of_month, self.month_name())
    }
}
