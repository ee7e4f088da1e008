//! Validate command implementation

use std::path::Path;

use anyhow::Result;

use crate::config::PrepConfig;
use crate::roster::{validate_roster, ValidationResult};

/// Run the validate command and print its findings.
///
/// Returns the result so the caller can decide the exit status.
pub fn run(path: &Path, config: &PrepConfig) -> Result<ValidationResult> {
    let result = validate_roster(path, config);

    for error in &result.errors {
        eprintln!("ERROR: {}", error);
    }

    for warning in &result.warnings {
        eprintln!("WARN: {}", warning);
    }

    if result.errors.is_empty() && result.warnings.is_empty() {
        println!(
            "Validation passed: no issues found ({} accounts)",
            result.accounts
        );
    } else {
        println!(
            "\nValidation complete: {} errors, {} warnings, {} accounts",
            result.errors.len(),
            result.warnings.len(),
            result.accounts
        );
    }

    Ok(result)
}
