//! Students command implementation
//!
//! Converts a roster CSV into `<dir>/out/<name>.json`.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::config::PrepConfig;
use crate::roster::{self, ProvisioningDocument};

/// Configuration for a students conversion
pub struct StudentsConfig {
    /// Roster CSV to read
    pub input: PathBuf,
    /// Explicit output file, overriding the default location
    pub output: Option<PathBuf>,
    /// Leave out rows that cannot be converted instead of failing
    pub skip_invalid: bool,
}

/// Summary of a finished conversion
#[derive(Debug)]
pub struct StudentsResult {
    pub output_path: PathBuf,
    pub accounts: usize,
    pub replaced: usize,
    pub disambiguated: usize,
    pub skipped: usize,
}

/// Default output location: an output directory next to the input, holding
/// a JSON file named after the input.
pub fn default_output_path(input: &Path, dir_name: &str) -> PathBuf {
    let folder = input.parent().unwrap_or_else(|| Path::new(""));
    let json_path = input.with_extension("json");
    let file_name = json_path
        .file_name()
        .unwrap_or_else(|| OsStr::new("students.json"));
    folder.join(dir_name).join(file_name)
}

/// Run the students conversion.
pub fn run(config: &StudentsConfig, prep: &PrepConfig) -> Result<StudentsResult> {
    let output_path = config
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&config.input, &prep.output.dir_name));

    let records = roster::read_records(&config.input, &prep.input)?;
    let report = roster::process_records(&records, prep, config.skip_invalid)
        .with_context(|| format!("Failed to convert roster {}", config.input.display()))?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    write_document(&output_path, &report.document, prep.output.indent)?;

    let result = StudentsResult {
        output_path,
        accounts: report.document.len(),
        replaced: report.replaced(),
        disambiguated: report.disambiguated(),
        skipped: report.skipped.len(),
    };

    info!(
        path = %result.output_path.display(),
        accounts = result.accounts,
        replaced = result.replaced,
        disambiguated = result.disambiguated,
        skipped = result.skipped,
        "wrote provisioning document"
    );

    Ok(result)
}

/// Write the document as pretty JSON with `indent` spaces per level.
pub fn write_document(path: &Path, document: &ProvisioningDocument, indent: usize) -> Result<()> {
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document
        .serialize(&mut serializer)
        .context("Failed to serialize provisioning document")?;

    fs::write(path, buf).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
