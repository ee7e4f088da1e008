//! roster-prep library
//!
//! Converts student roster CSV exports into deduplicated account
//! provisioning JSON.

pub mod commands;
pub mod config;
pub mod error;
pub mod roster;

pub use config::PrepConfig;
pub use error::{Result, RosterError};
pub use roster::{ProvisioningDocument, ValidationIssue, ValidationResult};
