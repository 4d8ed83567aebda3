//! Storage layer: the CSV record store, the import output file, YAML config I/O.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{ImportedSet, SetRecord};

/// Column header of the record store, in file order.
pub const STORE_HEADER: [&str; 5] = ["Ejercicio", "Semana", "Serie", "Peso", "Reps"];

/// Column header of the import output: the store columns plus the group
/// aggregates attached by the import.
pub const IMPORT_HEADER: [&str; 7] = [
    "Ejercicio",
    "Semana",
    "Serie",
    "Peso",
    "Reps",
    "Peso medio",
    "Reps totales",
];

// ─── Directory helpers ────────────────────────────────────────────────────────

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

// ─── Record store ─────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct StoreRow {
    #[serde(rename = "Ejercicio")]
    exercise: String,
    #[serde(rename = "Semana")]
    week: String,
    #[serde(rename = "Serie")]
    series: u32,
    #[serde(rename = "Peso")]
    weight: f64,
    #[serde(rename = "Reps")]
    reps: u32,
}

impl From<StoreRow> for SetRecord {
    fn from(row: StoreRow) -> Self {
        SetRecord {
            exercise: row.exercise,
            week: row.week,
            series: row.series,
            weight: row.weight,
            reps: row.reps,
        }
    }
}

impl From<&SetRecord> for StoreRow {
    fn from(record: &SetRecord) -> Self {
        StoreRow {
            exercise: record.exercise.clone(),
            week: record.week.clone(),
            series: record.series,
            weight: record.weight,
            reps: record.reps,
        }
    }
}

#[derive(Serialize)]
struct ImportRow<'a> {
    #[serde(rename = "Ejercicio")]
    exercise: &'a str,
    #[serde(rename = "Semana")]
    week: &'a str,
    #[serde(rename = "Serie")]
    series: u32,
    #[serde(rename = "Peso")]
    weight: f64,
    #[serde(rename = "Reps")]
    reps: u32,
    #[serde(rename = "Peso medio")]
    mean_weight: f64,
    #[serde(rename = "Reps totales")]
    total_reps: u64,
}

/// Read every record in the store, in file order.
///
/// A missing file is an empty store. Rows may carry extra trailing columns
/// (the import output does) or be shorter than the header, as long as the
/// five store columns are present.
pub fn load_records(path: &Path) -> Result<Vec<SetRecord>> {
    if !path.exists() {
        return Ok(vec![]);
    }
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut records = vec![];
    for row in reader.deserialize::<StoreRow>() {
        records.push(row?.into());
    }
    debug!(path = %path.display(), records = records.len(), "Loaded record store");
    Ok(records)
}

/// Append records to the store. The header is written only when the file
/// does not exist yet.
pub fn append_records(path: &Path, records: &[SetRecord]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    ensure_parent(path)?;
    let write_header = !path.exists();

    let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if write_header {
        writer.write_record(STORE_HEADER)?;
    }
    for record in records {
        writer.serialize(StoreRow::from(record))?;
    }
    writer.flush()?;

    info!(path = %path.display(), records = records.len(), "Appended to record store");
    Ok(())
}

/// Write the full output of an import run, replacing any existing file.
pub fn write_imported(path: &Path, rows: &[ImportedSet]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(IMPORT_HEADER)?;
    for row in rows {
        writer.serialize(ImportRow {
            exercise: &row.set.exercise,
            week: &row.set.week,
            series: row.set.series,
            weight: row.set.weight,
            reps: row.set.reps,
            mean_weight: row.mean_weight,
            total_reps: row.total_reps,
        })?;
    }
    writer.flush()?;

    info!(path = %path.display(), records = rows.len(), "Wrote import output");
    Ok(())
}

// ─── YAML config I/O ─────────────────────────────────────────────────────────

pub fn save_yaml<T: serde::Serialize>(path: &Path, data: &T) -> Result<()> {
    ensure_parent(path)?;
    let content = serde_yaml::to_string(data)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T>
where
    T: Default,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let content = fs::read_to_string(path)?;
    let val = serde_yaml::from_str(&content)?;
    Ok(val)
}
