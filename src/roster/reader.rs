//! Roster CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::config::{ColumnLayout, InputConfig};
use crate::error::{Result, RosterError};

/// A CSV row with trimmed fields and its physical line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub line: u64,
    pub fields: Vec<String>,
}

/// The roster columns a student entry is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub line: u64,
    pub raw_name: String,
    pub dob: String,
    pub email: String,
    pub instrument: String,
}

impl RosterRow {
    /// Pick the configured columns out of a raw record.
    pub fn from_record(record: &RawRecord, layout: &ColumnLayout) -> Result<Self> {
        let field = |column: usize, name: &'static str| {
            record
                .fields
                .get(column)
                .cloned()
                .ok_or(RosterError::MissingColumn {
                    line: record.line,
                    column,
                    field: name,
                })
        };

        Ok(Self {
            line: record.line,
            raw_name: field(layout.name, "name")?,
            dob: field(layout.dob, "dob")?,
            email: field(layout.email, "email")?,
            instrument: field(layout.instrument, "instrument")?,
        })
    }
}

/// Read every data record from a roster file, skipping the preamble rows.
pub fn read_records(path: &Path, input: &InputConfig) -> Result<Vec<RawRecord>> {
    let file = File::open(path).map_err(|e| RosterError::Csv {
        path: path.display().to_string(),
        source: e.into(),
    })?;
    read_records_from(file, input).map_err(|e| match e {
        RosterError::Csv { source, .. } => RosterError::Csv {
            path: path.display().to_string(),
            source,
        },
        other => other,
    })
}

/// Read every data record from any reader, skipping the preamble rows.
pub fn read_records_from<R: Read>(reader: R, input: &InputConfig) -> Result<Vec<RawRecord>> {
    let delimiter = input.delimiter_byte()?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut record = StringRecord::new();
    let mut seen = 0usize;

    loop {
        let more = reader.read_record(&mut record).map_err(|e| RosterError::Csv {
            path: "<input>".to_string(),
            source: e,
        })?;
        if !more {
            break;
        }

        seen += 1;
        if seen <= input.header_rows {
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or(seen as u64);
        records.push(RawRecord {
            line,
            fields: record.iter().map(str::to_string).collect(),
        });
    }

    debug!(
        skipped = seen.min(input.header_rows),
        records = records.len(),
        "read roster csv"
    );

    Ok(records)
}
