//! CSV loading of the reservation export into a [`Dataset`].

pub mod columns;

use csv::{ReaderBuilder, StringRecord};
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info};

use crate::{
    config::Settings,
    error::IngestError,
    lead_time::date_parser::parse_date,
    record::{Dataset, DateField, Field, ReservationRecord},
};
use columns::ColumnLayout;

/// Trim whitespace + strip outer quotes and a leading BOM.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim_start_matches('\u{feff}').trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

fn text_cell(row: &StringRecord, layout: &ColumnLayout, field: Field) -> Option<String> {
    let cell = clean_str(row.get(layout.index(field))?);
    (!cell.is_empty()).then_some(cell)
}

fn date_cell(row: &StringRecord, layout: &ColumnLayout, field: Field) -> DateField {
    match text_cell(row, layout, field) {
        None => DateField::Missing,
        Some(raw) => match parse_date(&raw) {
            Some(date) => DateField::Parsed(date),
            None => DateField::Unparsable(raw),
        },
    }
}

fn to_record(row: &StringRecord, layout: &ColumnLayout) -> ReservationRecord {
    ReservationRecord {
        address: text_cell(row, layout, Field::Address),
        channel: text_cell(row, layout, Field::Channel),
        plan_name: text_cell(row, layout, Field::PlanName),
        application_date: date_cell(row, layout, Field::ApplicationDate),
        checkin_date: date_cell(row, layout, Field::CheckinDate),
    }
}

/// Read an export from any reader.
///
/// Skips `settings.header_rows_to_skip` rows, treats the next one as the
/// header row and every later row as a reservation, in file order.
pub fn read_records<R: Read>(reader: R, settings: &Settings) -> Result<Dataset, IngestError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut rows = rdr.records();

    let skip = settings.header_rows_to_skip;
    for seen in 0..skip {
        match rows.next() {
            Some(row) => {
                row?;
            }
            None => return Err(IngestError::HeaderRowOutOfRange { skip, rows: seen }),
        }
    }
    let header = rows
        .next()
        .ok_or(IngestError::HeaderRowOutOfRange { skip, rows: skip })??;
    let headers: Vec<String> = header.iter().map(clean_str).collect();
    debug!(columns = headers.len(), "header row");

    let layout = settings.columns.resolve(&headers)?;

    let mut records = Vec::new();
    for result in rows {
        let row = result?;
        records.push(to_record(&row, &layout));
    }

    info!(records = records.len(), "loaded reservations");
    Ok(Dataset::from_records(records))
}

#[tracing::instrument(level = "info", skip(path, settings), fields(path = %path.as_ref().display()))]
pub fn load_csv<P: AsRef<Path>>(path: P, settings: &Settings) -> Result<Dataset, IngestError> {
    let file = File::open(&path).map_err(|source| IngestError::Io {
        path: path.as_ref().to_path_buf(),
        source,
    })?;
    read_records(file, settings)
}
