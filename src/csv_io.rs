//! CSV import and export of leads.
//!
//! Import files have no header: each record is one raw lead description made
//! by joining its cells with `", "`. Exports carry `ID`, `Data` and the
//! enrichment keys as headers and leave `input_data` out.

use crate::errors::AppError;
use crate::models::{EnrichmentResult, Lead, ENRICHMENT_FIELDS};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde_json::{Map, Value};
use std::io::{Read, Write};

pub const EXPORT_ID_HEADER: &str = "ID";
pub const EXPORT_DATE_HEADER: &str = "Data";

/// One raw description per non-empty record, cells joined with `", "`.
pub fn read_import_rows<R: Read>(reader: R) -> Result<Vec<String>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.len() == 0 || (record.len() == 1 && record[0].is_empty()) {
            continue;
        }
        rows.push(record.iter().collect::<Vec<_>>().join(", "));
    }
    Ok(rows)
}

/// Creation time as shown in exports: `dd/mm/YYYY, HH:MM:SS` at the given offset.
pub fn format_export_timestamp(created_at: &DateTime<Utc>, utc_offset_hours: i32) -> String {
    let offset = FixedOffset::east_opt(utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix());
    created_at
        .with_timezone(&offset)
        .format("%d/%m/%Y, %H:%M:%S")
        .to_string()
}

/// Download name for an export made on `date`.
pub fn export_filename(date: NaiveDate) -> String {
    format!("leads_{}.csv", date.format("%Y-%m-%d"))
}

pub fn write_export<W: Write>(
    leads: &[Lead],
    utc_offset_hours: i32,
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec![EXPORT_ID_HEADER, EXPORT_DATE_HEADER];
    header.extend(ENRICHMENT_FIELDS.iter().map(|f| f.label));
    csv_writer.write_record(&header)?;

    for lead in leads {
        let enrichment = lead.enrichment();
        let mut record = vec![
            lead.id.to_string(),
            format_export_timestamp(&lead.created_at, utc_offset_hours),
        ];
        record.extend(enrichment.values().iter().map(|v| v.to_string()));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Renders the export as a UTF-8 string.
pub fn export_csv(leads: &[Lead], utc_offset_hours: i32) -> Result<String, AppError> {
    let mut buffer = Vec::new();
    write_export(leads, utc_offset_hours, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| AppError::InternalError(format!("Export is not valid UTF-8: {}", e)))
}

/// A record read back from an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedLead {
    pub id: i64,
    pub created_at: String,
    pub enrichment: EnrichmentResult,
}

/// Parses an export back into records. Unknown columns are ignored and missing
/// enrichment columns read as empty.
pub fn read_export<R: Read>(reader: R) -> Result<Vec<ExportedLead>, AppError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|e| AppError::BadRequest(format!("Invalid CSV header: {}", e)))?
        .clone();

    let position = |name: &str| headers.iter().position(|h| h == name);
    let id_column = position(EXPORT_ID_HEADER)
        .ok_or_else(|| AppError::BadRequest("Export is missing the ID column".to_string()))?;
    let date_column = position(EXPORT_DATE_HEADER);

    let mut leads = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| AppError::BadRequest(format!("Invalid CSV: {}", e)))?;

        let raw_id = record.get(id_column).unwrap_or("");
        let id = raw_id
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::BadRequest(format!("Invalid lead id '{}'", raw_id)))?;

        let mut fields = Map::new();
        for spec in ENRICHMENT_FIELDS.iter() {
            if let Some(value) = position(spec.label).and_then(|i| record.get(i)) {
                fields.insert(spec.label.to_string(), Value::String(value.to_string()));
            }
        }
        let enrichment: EnrichmentResult = serde_json::from_value(Value::Object(fields))
            .map_err(|e| AppError::InternalError(format!("Invalid export record: {}", e)))?;

        leads.push(ExportedLead {
            id,
            created_at: date_column
                .and_then(|i| record.get(i))
                .unwrap_or("")
                .to_string(),
            enrichment,
        });
    }

    Ok(leads)
}
