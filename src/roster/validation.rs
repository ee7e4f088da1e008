//! Validation of roster files without producing output.

use std::fmt;
use std::path::{Path, PathBuf};

use super::dedup::EmailClaim;
use super::{process_records, read_records, RosterReport};
use crate::config::PrepConfig;
use crate::error::RosterError;

/// A validation error or warning.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the roster file
    pub path: PathBuf,
    /// CSV line, if the issue belongs to a row
    pub line: Option<u64>,
    /// Column or aspect the issue concerns
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(
                f,
                "{}:{}: {} - {}",
                self.path.display(),
                line,
                self.field,
                self.message
            ),
            None => write!(f, "{}: {} - {}", self.path.display(), self.field, self.message),
        }
    }
}

/// Result of validating a roster file.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Rows or file problems that would stop a conversion
    pub errors: Vec<ValidationIssue>,
    /// Rows that convert but deserve a look
    pub warnings: Vec<ValidationIssue>,
    /// Accounts the conversion would produce
    pub accounts: usize,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are no errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, path: &Path, line: Option<u64>, field: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_path_buf(),
            line,
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_warning(&mut self, path: &Path, line: Option<u64>, field: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_path_buf(),
            line,
            field: field.to_string(),
            message: message.to_string(),
        });
    }
}

fn error_field(err: &RosterError) -> &'static str {
    match err {
        RosterError::MissingColumn { field, .. } => *field,
        RosterError::EmptyName { .. } => "name",
        RosterError::InvalidBirthDate { .. } => "dob",
        RosterError::MalformedEmail { .. } => "email",
        RosterError::InvalidDelimiter(_) => "delimiter",
        RosterError::InvalidPrivilege(_) => "privilege_type",
        RosterError::Csv { .. } => "file",
    }
}

/// Validate a roster file against the conversion rules.
pub fn validate_roster(path: &Path, config: &PrepConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    if !path.exists() {
        result.add_error(path, None, "file", "File does not exist");
        return result;
    }

    let records = match read_records(path, &config.input) {
        Ok(records) => records,
        Err(e) => {
            result.add_error(path, e.line(), error_field(&e), &e.to_string());
            return result;
        }
    };

    if records.is_empty() {
        result.add_warning(path, None, "file", "No data rows after the header rows");
    }

    let report = match process_records(&records, config, true) {
        Ok(report) => report,
        Err(e) => {
            result.add_error(path, e.line(), error_field(&e), &e.to_string());
            return result;
        }
    };

    collect_report(path, &report, &mut result);
    result
}

fn collect_report(path: &Path, report: &RosterReport, result: &mut ValidationResult) {
    for err in &report.skipped {
        result.add_error(path, err.line(), error_field(err), &err.to_string());
    }

    for outcome in &report.outcomes {
        let line = Some(outcome.line);
        if outcome.replaced {
            result.add_warning(
                path,
                line,
                "name",
                &format!("Replaces an earlier row for '{}'", outcome.key),
            );
        }
        match &outcome.email {
            EmailClaim::Disambiguated { original, email } => result.add_warning(
                path,
                line,
                "email",
                &format!("'{}' already used, rewritten to '{}'", original, email),
            ),
            EmailClaim::Empty => result.add_warning(path, line, "email", "Email is empty"),
            EmailClaim::Unique(_) => {}
        }
        if outcome.missing_last_name {
            result.add_warning(path, line, "name", "Single word name, last name left empty");
        }
    }

    result.accounts = report.document.len();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_roster(dir: &TempDir, rows: &[&str]) -> PathBuf {
        let mut content = String::from(
            "Roster\nNo,Name,DOB,Phone,Parent,Email,Address,School,Instrument\n",
        );
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        let path = dir.path().join("students.csv");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_clean_roster_is_valid() {
        let dir = TempDir::new().unwrap();
        let path = write_roster(
            &dir,
            &["1,jane doe,03/04/2010,,,jane@example.com,,,Piano"],
        );

        let result = validate_roster(&path, &PrepConfig::default());
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
        assert_eq!(result.accounts, 1);
    }

    #[test]
    fn test_bad_rows_are_errors_with_lines() {
        let dir = TempDir::new().unwrap();
        let path = write_roster(
            &dir,
            &[
                "1,jane doe,2010-03-04,,,jane@example.com,,,Piano",
                "2,john roe,05/06/2011",
                "3,ann lee,07/08/2012,,,ann@example.com,,,Cello",
            ],
        );

        let result = validate_roster(&path, &PrepConfig::default());
        assert!(!result.is_valid());
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].line, Some(3));
        assert_eq!(result.errors[0].field, "dob");
        assert_eq!(result.errors[1].line, Some(4));
        assert_eq!(result.errors[1].field, "email");
        assert_eq!(result.accounts, 1);
    }

    #[test]
    fn test_duplicates_are_warnings() {
        let dir = TempDir::new().unwrap();
        let path = write_roster(
            &dir,
            &[
                "1,ann lee,01/01/2010,,,mom@example.com,,,Piano",
                "2,ben lee,02/02/2012,,,mom@example.com,,,Piano",
                "3,ann lee,01/01/2010,,,,,,Piano",
            ],
        );

        let result = validate_roster(&path, &PrepConfig::default());
        assert!(result.is_valid());
        let messages: Vec<String> = result.warnings.iter().map(|w| w.to_string()).collect();
        assert!(messages.iter().any(|m| m.contains("mom+ben@example.com")));
        assert!(messages.iter().any(|m| m.contains("Replaces an earlier row for 'Ann Lee-Piano'")));
        assert!(messages.iter().any(|m| m.contains("Email is empty")));
        assert_eq!(result.accounts, 2);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = validate_roster(&dir.path().join("nope.csv"), &PrepConfig::default());
        assert!(!result.is_valid());
        assert_eq!(result.errors[0].field, "file");
    }

    #[test]
    fn test_issue_display() {
        let issue = ValidationIssue {
            path: PathBuf::from("students.csv"),
            line: Some(4),
            field: "dob".to_string(),
            message: "bad".to_string(),
        };
        assert_eq!(issue.to_string(), "students.csv:4: dob - bad");
    }
}
