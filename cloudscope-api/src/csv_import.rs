// Bulk instance import from CSV: exact header contract, per-row validation

use chrono::{DateTime, Utc};
use cloudscope_common::schema::{parse_instance_at, INSTANCE_CSV_COLUMNS};
use cloudscope_common::{FieldError, NewCloudInstance};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("CSV empty")]
    Empty,
    #[error("Invalid headers. Expected {}", INSTANCE_CSV_COLUMNS.join(","))]
    InvalidHeaders { found: Vec<String> },
    #[error("failed to read CSV: {0}")]
    Read(#[from] csv::Error),
}

/// A rejected data row. `row` is 1-based and counts data rows only.
#[derive(Debug, Serialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct RowError {
    pub row: usize,
    pub reason: String,
    pub details: Vec<FieldError>,
}

#[derive(Debug, Default)]
pub struct ImportOutcome {
    pub parsed: Vec<NewCloudInstance>,
    pub errors: Vec<RowError>,
}

pub fn parse_file(path: &Path, now: DateTime<Utc>) -> Result<ImportOutcome, ImportError> {
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    parse_instances(file, now)
}

/// The header must match [`INSTANCE_CSV_COLUMNS`] exactly, order included, or nothing
/// is imported. Each data row is then validated on its own.
pub fn parse_instances<R: Read>(reader: R, now: DateTime<Utc>) -> Result<ImportOutcome, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = rdr.records();
    let header = loop {
        match records.next() {
            None => return Err(ImportError::Empty),
            Some(rec) => {
                let rec = rec?;
                if !is_blank(&rec) {
                    break rec;
                }
            }
        }
    };
    check_header(&header)?;

    let mut outcome = ImportOutcome::default();
    let mut row = 0;
    for rec in records {
        let rec = match rec {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                row += 1;
                outcome.errors.push(RowError {
                    row,
                    reason: format!("Unreadable row: {e}"),
                    details: Vec::new(),
                });
                continue;
            }
        };
        if is_blank(&rec) {
            continue;
        }
        row += 1;

        if rec.len() != INSTANCE_CSV_COLUMNS.len() {
            outcome.errors.push(RowError {
                row,
                reason: format!(
                    "Expected {} columns, found {}",
                    INSTANCE_CSV_COLUMNS.len(),
                    rec.len()
                ),
                details: Vec::new(),
            });
            continue;
        }

        let fields: Map<String, Value> = INSTANCE_CSV_COLUMNS
            .iter()
            .zip(rec.iter())
            .map(|(col, cell)| (col.to_string(), Value::String(cell.to_string())))
            .collect();

        match parse_instance_at(&Value::Object(fields), now) {
            Ok(instance) => outcome.parsed.push(instance),
            Err(e) => outcome.errors.push(RowError {
                row,
                reason: format!("Invalid instance: {}", e.summary()),
                details: e.field_errors().to_vec(),
            }),
        }
    }

    Ok(outcome)
}

fn is_blank(rec: &csv::StringRecord) -> bool {
    rec.iter().all(|c| c.trim().is_empty())
}

fn check_header(header: &csv::StringRecord) -> Result<(), ImportError> {
    let found: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
            h.trim().to_string()
        })
        .collect();

    if found.iter().map(String::as_str).eq(INSTANCE_CSV_COLUMNS.iter().copied()) {
        Ok(())
    } else {
        Err(ImportError::InvalidHeaders { found })
    }
}
