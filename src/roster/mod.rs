//! Roster conversion pipeline
//!
//! Reads roster rows, normalizes names, derives credentials and deduplicates
//! entries into a provisioning document.

mod account;
mod dedup;
mod name;
mod reader;
mod validation;

pub use account::{
    initial_password, Account, PrivilegeType, ProvisioningDocument, StudentEntry, UserDetail,
};
pub use dedup::{EmailClaim, EmailRegistry, PushOutcome, RosterBuilder};
pub use name::{capitalize_words, StudentName};
pub use reader::{read_records, read_records_from, RawRecord, RosterRow};
pub use validation::{validate_roster, ValidationIssue, ValidationResult};

use tracing::warn;

use crate::config::PrepConfig;
use crate::error::{Result, RosterError};

/// Everything a conversion run produced.
#[derive(Debug)]
pub struct RosterReport {
    pub document: ProvisioningDocument,
    /// One outcome per accepted row, in file order
    pub outcomes: Vec<PushOutcome>,
    /// Rows dropped because they could not be converted
    pub skipped: Vec<RosterError>,
}

impl RosterReport {
    pub fn replaced(&self) -> usize {
        self.outcomes.iter().filter(|o| o.replaced).count()
    }

    pub fn disambiguated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.email, EmailClaim::Disambiguated { .. }))
            .count()
    }
}

/// Convert raw records into a provisioning document.
///
/// With `skip_invalid` a row that fails is logged and left out; otherwise the
/// first failing row aborts the run.
pub fn process_records(
    records: &[RawRecord],
    config: &PrepConfig,
    skip_invalid: bool,
) -> Result<RosterReport> {
    let mut builder = RosterBuilder::new(config.privilege_type);
    let mut outcomes = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();

    for record in records {
        let pushed = RosterRow::from_record(record, &config.input.columns)
            .and_then(|row| builder.push(&row));
        match pushed {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) if skip_invalid => {
                warn!(line = record.line, error = %e, "skipping roster row");
                skipped.push(e);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(RosterReport {
        document: builder.finish(),
        outcomes,
        skipped,
    })
}
