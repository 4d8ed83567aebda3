//! Spreadsheet ingestor: turns a one-sheet-per-week workbook into flat set
//! records.
//!
//! Every sheet is read positionally: exercise, weight cell, series count
//! (ignored), reps cell. Weight and reps cells hold comma-separated tokens,
//! one per performed set. Problems are collected per row and reported once
//! every row has been attempted.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Reader};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{ImportedSet, SetRecord};
use crate::storage;

/// Columns every sheet must provide, in order.
pub const REQUIRED_COLUMNS: usize = 4;

const EXERCISE_COL: usize = 0;
const WEIGHT_COL: usize = 1;
const REPS_COL: usize = 3;

/// One worksheet, reduced to cell text.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    /// Sheet name, used verbatim as the week label
    pub name: String,
    pub rows: Vec<SheetRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    /// 1-based row number as shown by a spreadsheet application
    pub number: usize,
    pub cells: Vec<String>,
}

impl SheetRow {
    fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

impl Sheet {
    /// Build a sheet from literal rows numbered from 1.
    pub fn from_rows<S: AsRef<str>>(name: impl Into<String>, rows: &[Vec<S>]) -> Self {
        Self {
            name: name.into(),
            rows: rows
                .iter()
                .enumerate()
                .map(|(i, cells)| SheetRow {
                    number: i + 1,
                    cells: cells.iter().map(|c| c.as_ref().to_string()).collect(),
                })
                .collect(),
        }
    }
}

/// What went wrong with a row or sheet.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestProblem {
    /// The row is rejected.
    #[error("malformed weight token '{token}'")]
    MalformedWeightToken { token: String },

    /// The token is dropped and the rest of the row is kept. Weight tokens
    /// are strict, rep tokens lenient.
    #[error("discarded non-numeric reps token '{token}'")]
    DiscardedRepToken { token: String },

    /// The sheet is skipped.
    #[error("expected at least {required} columns, found {found}", required = REQUIRED_COLUMNS)]
    MissingColumns { found: usize },
}

impl IngestProblem {
    /// Whether data was rejected, as opposed to partially kept.
    pub fn is_error(&self) -> bool {
        !matches!(self, IngestProblem::DiscardedRepToken { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestIssue {
    pub sheet: String,
    /// None for sheet-level problems
    pub row: Option<usize>,
    pub problem: IngestProblem,
}

/// Sets expanded from a single row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expansion {
    pub sets: Vec<SetRecord>,
    pub discarded_reps: Vec<String>,
}

/// Expand one row's weight and reps cells into individual sets.
///
/// Missing weights are filled by repeating the last one given, which also
/// covers a single weight held across every set. Extra weights beyond the
/// number of reps are dropped.
pub fn expand_series(
    exercise: &str,
    week: &str,
    weight_cell: &str,
    reps_cell: &str,
) -> std::result::Result<Expansion, IngestProblem> {
    let mut weights = parse_weights(weight_cell)?;

    let mut reps = vec![];
    let mut discarded_reps = vec![];
    for token in reps_cell.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match parse_reps(token) {
            Some(r) => reps.push(r),
            None => discarded_reps.push(token.to_string()),
        }
    }

    if let Some(&last) = weights.last() {
        if weights.len() < reps.len() {
            weights.resize(reps.len(), last);
        }
    }

    let sets = weights
        .into_iter()
        .zip(reps)
        .enumerate()
        .map(|(i, (weight, reps))| SetRecord::new(exercise, week, i as u32 + 1, weight, reps))
        .collect();

    Ok(Expansion {
        sets,
        discarded_reps,
    })
}

fn parse_weights(cell: &str) -> std::result::Result<Vec<f64>, IngestProblem> {
    cell.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|token| match token.parse::<f64>() {
            Ok(w) if w.is_finite() && w >= 0.0 => Ok(w),
            _ => Err(IngestProblem::MalformedWeightToken {
                token: token.to_string(),
            }),
        })
        .collect()
}

fn parse_reps(token: &str) -> Option<u32> {
    if token.bytes().all(|b| b.is_ascii_digit()) {
        token.parse().ok()
    } else {
        None
    }
}

/// Accumulates sets across the sheets of one import run.
pub struct Ingestor {
    header_marker: String,
    sets: Vec<SetRecord>,
    issues: Vec<IngestIssue>,
    sheets: usize,
    rows: usize,
}

impl Ingestor {
    pub fn new(header_marker: impl Into<String>) -> Self {
        Self {
            header_marker: header_marker.into(),
            sets: vec![],
            issues: vec![],
            sheets: 0,
            rows: 0,
        }
    }

    /// Expand every data row of `sheet`. The first row is the sheet's
    /// header; later rows repeating the header marker are skipped too.
    pub fn ingest_sheet(&mut self, sheet: &Sheet) {
        self.sheets += 1;

        let found = sheet.rows.first().map_or(0, |header| header.cells.len());
        if found < REQUIRED_COLUMNS {
            self.report(sheet, None, IngestProblem::MissingColumns { found });
            return;
        }

        for row in sheet.rows.iter().skip(1) {
            let exercise = row.cell(EXERCISE_COL);
            if exercise.trim().is_empty() || exercise == self.header_marker {
                continue;
            }
            self.rows += 1;

            match expand_series(exercise, &sheet.name, row.cell(WEIGHT_COL), row.cell(REPS_COL)) {
                Ok(expansion) => {
                    debug!(
                        sheet = %sheet.name,
                        row = row.number,
                        sets = expansion.sets.len(),
                        "Expanded row"
                    );
                    for token in expansion.discarded_reps {
                        self.report(sheet, Some(row.number), IngestProblem::DiscardedRepToken { token });
                    }
                    self.sets.extend(expansion.sets);
                }
                Err(problem) => self.report(sheet, Some(row.number), problem),
            }
        }
    }

    fn report(&mut self, sheet: &Sheet, row: Option<usize>, problem: IngestProblem) {
        warn!(sheet = %sheet.name, row = ?row, "{}", problem);
        self.issues.push(IngestIssue {
            sheet: sheet.name.clone(),
            row,
            problem,
        });
    }

    /// Attach each group's mean weight and total reps to its sets.
    pub fn finish(self) -> IngestReport {
        let mut groups: HashMap<(&str, &str), (f64, usize, u64)> = HashMap::new();
        for set in &self.sets {
            let entry = groups
                .entry((set.exercise.as_str(), set.week.as_str()))
                .or_insert((0.0, 0, 0));
            entry.0 += set.weight;
            entry.1 += 1;
            entry.2 += u64::from(set.reps);
        }

        let records = self
            .sets
            .iter()
            .map(|set| {
                let (weight_sum, count, total_reps) =
                    groups[&(set.exercise.as_str(), set.week.as_str())];
                ImportedSet {
                    set: set.clone(),
                    mean_weight: weight_sum / count as f64,
                    total_reps,
                }
            })
            .collect();

        IngestReport {
            records,
            issues: self.issues,
            sheets: self.sheets,
            rows: self.rows,
        }
    }
}

/// Outcome of an import run.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub records: Vec<ImportedSet>,
    pub issues: Vec<IngestIssue>,
    pub sheets: usize,
    /// Data rows attempted, header and blank rows excluded
    pub rows: usize,
}

impl IngestReport {
    pub fn errors(&self) -> impl Iterator<Item = &IngestIssue> {
        self.issues.iter().filter(|i| i.problem.is_error())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// Read every sheet of an `.xlsx`/`.xls`/`.ods` workbook as cell text, in
/// workbook order.
pub fn read_workbook(path: &Path) -> Result<Vec<Sheet>> {
    let mut workbook = open_workbook_auto(path)?;
    let mut sheets = vec![];
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let first_row = range.start().map_or(0, |(row, _)| row as usize);
        let rows = range
            .rows()
            .enumerate()
            .map(|(i, cells)| SheetRow {
                number: first_row + i + 1,
                cells: cells.iter().map(ToString::to_string).collect(),
            })
            .collect();
        sheets.push(Sheet { name, rows });
    }
    Ok(sheets)
}

/// Ingest already-loaded sheets in one go.
pub fn ingest_sheets(sheets: &[Sheet], header_marker: &str) -> IngestReport {
    let mut ingestor = Ingestor::new(header_marker);
    for sheet in sheets {
        ingestor.ingest_sheet(sheet);
    }
    ingestor.finish()
}

/// Read `workbook`, expand it, and regenerate `output` from the result.
///
/// Rows with problems are left out of the output and listed in the
/// returned report.
pub fn import_workbook(workbook: &Path, output: &Path, header_marker: &str) -> Result<IngestReport> {
    let sheets = read_workbook(workbook)?;
    let report = ingest_sheets(&sheets, header_marker);
    storage::write_imported(output, &report.records)?;
    info!(
        workbook = %workbook.display(),
        sheets = report.sheets,
        records = report.records.len(),
        issues = report.issues.len(),
        "Import finished"
    );
    Ok(report)
}
