//! Duplicate handling for roster entries.
//!
//! Two kinds of duplicates exist in roster exports:
//! - the same student enrolled for the same instrument on several rows, which
//!   collapses to one account (the last row wins, the first position is kept);
//! - siblings sharing a parent's email, which get a `+<first name>` suffix.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::account::{
    initial_password, Account, PrivilegeType, ProvisioningDocument, StudentEntry, UserDetail,
};
use super::name::StudentName;
use super::reader::RosterRow;
use crate::error::{Result, RosterError};

/// Outcome of claiming an email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailClaim {
    /// The address was free
    Unique(String),
    /// The address was taken and has been rewritten
    Disambiguated { original: String, email: String },
    /// No address given
    Empty,
}

impl EmailClaim {
    pub fn email(&self) -> &str {
        match self {
            EmailClaim::Unique(email) | EmailClaim::Disambiguated { email, .. } => email,
            EmailClaim::Empty => "",
        }
    }
}

/// Tracks every email address handed out so far.
#[derive(Debug, Default)]
pub struct EmailRegistry {
    seen: HashSet<String>,
}

impl EmailRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `email` for the account `username`.
    ///
    /// A taken address becomes `local+<first username token>@domain`. The
    /// rewrite is attempted once and the result is registered as well.
    pub fn claim(&mut self, email: &str, username: &str, line: u64) -> Result<EmailClaim> {
        if email.is_empty() {
            return Ok(EmailClaim::Empty);
        }

        let claim = if self.seen.contains(email) {
            let (local, domain) =
                email
                    .split_once('@')
                    .ok_or_else(|| RosterError::MalformedEmail {
                        line,
                        email: email.to_string(),
                    })?;
            let suffix = username.split('.').next().unwrap_or_default();
            EmailClaim::Disambiguated {
                original: email.to_string(),
                email: format!("{}+{}@{}", local, suffix, domain),
            }
        } else {
            EmailClaim::Unique(email.to_string())
        };

        self.seen.insert(claim.email().to_string());
        Ok(claim)
    }

    pub fn contains(&self, email: &str) -> bool {
        self.seen.contains(email)
    }
}

/// What happened when a row was added to the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    pub line: u64,
    /// Dedup key of the entry
    pub key: String,
    /// The row replaced an earlier entry with the same key
    pub replaced: bool,
    pub email: EmailClaim,
    /// The name had a single word, so the last name is empty
    pub missing_last_name: bool,
}

/// Builds the provisioning document from roster rows in file order.
#[derive(Debug)]
pub struct RosterBuilder {
    privilege: PrivilegeType,
    entries: Vec<StudentEntry>,
    index: HashMap<String, usize>,
    emails: EmailRegistry,
}

impl RosterBuilder {
    pub fn new(privilege: PrivilegeType) -> Self {
        Self {
            privilege,
            entries: Vec::new(),
            index: HashMap::new(),
            emails: EmailRegistry::new(),
        }
    }

    /// Turn a row into a student entry without touching builder state.
    fn entry_for(&self, row: &RosterRow) -> Result<StudentEntry> {
        let parsed = StudentName::parse(&row.raw_name);
        if parsed.is_empty() {
            return Err(RosterError::EmptyName { line: row.line });
        }
        let password = initial_password(&row.dob, row.line)?;
        let username = parsed.username();

        Ok(StudentEntry {
            name: parsed.name,
            alias: parsed.alias,
            dob: row.dob.clone(),
            instrument: row.instrument.clone(),
            account: Account {
                email: row.email.clone(),
                username,
                password,
                user_detail: UserDetail {
                    first_name: parsed.first_name,
                    last_name: parsed.last_name,
                },
                privilege_type: self.privilege,
            },
        })
    }

    /// Add one roster row.
    ///
    /// A row that fails leaves the builder unchanged, so callers may skip it
    /// and continue.
    pub fn push(&mut self, row: &RosterRow) -> Result<PushOutcome> {
        let mut entry = self.entry_for(row)?;

        let claim = self
            .emails
            .claim(&row.email, &entry.account.username, row.line)?;
        if let EmailClaim::Disambiguated { original, email } = &claim {
            debug!(line = row.line, original = %original, email = %email, "disambiguated email");
        }
        entry.account.email = claim.email().to_string();

        let key = entry.dedup_key();
        let missing_last_name = entry.account.user_detail.last_name.is_empty();
        let replaced = match self.index.get(&key) {
            Some(&position) => {
                debug!(line = row.line, key = %key, "replacing earlier roster entry");
                self.entries[position] = entry;
                true
            }
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push(entry);
                false
            }
        };

        Ok(PushOutcome {
            line: row.line,
            key,
            replaced,
            email: claim,
            missing_last_name,
        })
    }

    pub fn entries(&self) -> &[StudentEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop the transient roster fields and keep only the accounts.
    pub fn finish(self) -> ProvisioningDocument {
        ProvisioningDocument {
            data: self.entries.into_iter().map(|entry| entry.account).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(line: u64, name: &str, dob: &str, email: &str, instrument: &str) -> RosterRow {
        RosterRow {
            line,
            raw_name: name.to_string(),
            dob: dob.to_string(),
            email: email.to_string(),
            instrument: instrument.to_string(),
        }
    }

    #[test]
    fn test_registry_disambiguates_second_claim() {
        let mut registry = EmailRegistry::new();
        let first = registry.claim("mom@example.com", "ann.lee", 3).unwrap();
        assert_eq!(first, EmailClaim::Unique("mom@example.com".to_string()));

        let second = registry.claim("mom@example.com", "ben.lee", 4).unwrap();
        assert_eq!(second.email(), "mom+ben@example.com");
        assert!(registry.contains("mom+ben@example.com"));
    }

    #[test]
    fn test_registry_rewrites_only_once() {
        let mut registry = EmailRegistry::new();
        registry.claim("mom@example.com", "ann.lee", 3).unwrap();
        registry.claim("mom@example.com", "ben.lee", 4).unwrap();
        // Same first name again: the rewritten address collides and is kept as is.
        let third = registry.claim("mom@example.com", "ben.lee", 5).unwrap();
        assert_eq!(third.email(), "mom+ben@example.com");
    }

    #[test]
    fn test_registry_splits_at_first_at_sign() {
        let mut registry = EmailRegistry::new();
        registry.claim("a@b@c", "x.y", 1).unwrap();
        assert_eq!(registry.claim("a@b@c", "z.y", 2).unwrap().email(), "a+z@b@c");
    }

    #[test]
    fn test_registry_empty_email_never_duplicates() {
        let mut registry = EmailRegistry::new();
        assert_eq!(registry.claim("", "a.b", 1).unwrap(), EmailClaim::Empty);
        assert_eq!(registry.claim("", "c.d", 2).unwrap(), EmailClaim::Empty);
    }

    #[test]
    fn test_registry_malformed_duplicate_is_error() {
        let mut registry = EmailRegistry::new();
        registry.claim("no-at-sign", "a.b", 1).unwrap();
        let err = registry.claim("no-at-sign", "c.d", 2).unwrap_err();
        assert!(matches!(err, RosterError::MalformedEmail { line: 2, .. }));
    }

    #[test]
    fn test_builder_builds_account() {
        let mut builder = RosterBuilder::new(PrivilegeType::Member);
        let outcome = builder
            .push(&row(3, "  jane   DOE (JJ)", "03/04/2010", "jane@example.com", "Piano"))
            .unwrap();
        assert!(!outcome.replaced);
        assert_eq!(outcome.key, "Jane Doe-Piano");

        let entry = &builder.entries()[0];
        assert_eq!(entry.alias, "jj");
        assert_eq!(entry.account.username, "jane.doe");
        assert_eq!(entry.account.password, "20100304");
        assert_eq!(entry.account.user_detail.first_name, "Jane");
        assert_eq!(entry.account.user_detail.last_name, "Doe");
        assert_eq!(entry.account.privilege_type, PrivilegeType::Member);
    }

    #[test]
    fn test_builder_replaces_same_student_instrument_in_place() {
        let mut builder = RosterBuilder::new(PrivilegeType::Member);
        builder
            .push(&row(3, "jane doe", "03/04/2010", "old@example.com", "Piano"))
            .unwrap();
        builder
            .push(&row(4, "john roe", "05/06/2011", "john@example.com", "Piano"))
            .unwrap();
        let outcome = builder
            .push(&row(5, "JANE DOE", "03/04/2010", "new@example.com", "Piano"))
            .unwrap();

        assert!(outcome.replaced);
        assert_eq!(builder.len(), 2);
        let doc = builder.finish();
        assert_eq!(doc.data[0].email, "new@example.com");
        assert_eq!(doc.data[1].username, "john.roe");
    }

    #[test]
    fn test_builder_same_student_other_instrument_is_separate() {
        let mut builder = RosterBuilder::new(PrivilegeType::Member);
        builder
            .push(&row(3, "jane doe", "03/04/2010", "jane@example.com", "Piano"))
            .unwrap();
        let outcome = builder
            .push(&row(4, "jane doe", "03/04/2010", "jane@example.com", "Violin"))
            .unwrap();

        assert!(!outcome.replaced);
        assert_eq!(outcome.email.email(), "jane+jane@example.com");
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_builder_replaced_rows_keep_their_email_claim() {
        let mut builder = RosterBuilder::new(PrivilegeType::Member);
        builder
            .push(&row(3, "ann lee", "01/01/2010", "mom@example.com", "Piano"))
            .unwrap();
        builder
            .push(&row(4, "ann lee", "01/01/2010", "mom@example.com", "Piano"))
            .unwrap();

        let doc = builder.finish();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.data[0].email, "mom+ann@example.com");
    }

    #[test]
    fn test_builder_failed_row_leaves_state_untouched() {
        let mut builder = RosterBuilder::new(PrivilegeType::Member);
        let err = builder
            .push(&row(3, "jane doe", "2010-03-04", "jane@example.com", "Piano"))
            .unwrap_err();
        assert!(matches!(err, RosterError::InvalidBirthDate { line: 3, .. }));
        assert!(builder.is_empty());

        let outcome = builder
            .push(&row(4, "jane doe", "03/04/2010", "jane@example.com", "Piano"))
            .unwrap();
        assert_eq!(outcome.email, EmailClaim::Unique("jane@example.com".to_string()));
    }

    #[test]
    fn test_builder_rejects_empty_name() {
        let mut builder = RosterBuilder::new(PrivilegeType::Member);
        let err = builder
            .push(&row(7, "  (nickname) ", "03/04/2010", "x@example.com", "Drums"))
            .unwrap_err();
        assert!(matches!(err, RosterError::EmptyName { line: 7 }));
    }

    #[test]
    fn test_builder_flags_single_word_names() {
        let mut builder = RosterBuilder::new(PrivilegeType::Member);
        let outcome = builder
            .push(&row(3, "cher", "03/04/2010", "cher@example.com", "Voice"))
            .unwrap();
        assert!(outcome.missing_last_name);
    }

    #[test]
    fn test_finish_uses_configured_privilege() {
        let mut builder = RosterBuilder::new(PrivilegeType::Staff);
        builder
            .push(&row(3, "jane doe", "03/04/2010", "jane@example.com", "Piano"))
            .unwrap();
        let json = serde_json::to_value(builder.finish()).unwrap();
        assert_eq!(json["data"][0]["privilegeType"], 300);
        assert!(json["data"][0].get("instrument").is_none());
        assert!(json["data"][0].get("dob").is_none());
    }
}
