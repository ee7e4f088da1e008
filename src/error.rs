use thiserror::Error;

/// Error types for roster conversion.
/// Row-level variants carry the 1-based line number of the offending CSV row.
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Failed to read roster {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Line {line}: missing column {column} ({field})")]
    MissingColumn {
        line: u64,
        column: usize,
        field: &'static str,
    },

    #[error("Line {line}: name is empty after normalization")]
    EmptyName { line: u64 },

    #[error("Line {line}: invalid date of birth '{value}', expected MM/DD/YYYY")]
    InvalidBirthDate { line: u64, value: String },

    #[error("Line {line}: email '{email}' is already taken and has no '@' to disambiguate")]
    MalformedEmail { line: u64, email: String },

    #[error("Delimiter must be a single ASCII character, got '{0}'")]
    InvalidDelimiter(char),

    #[error("Invalid privilege type '{0}'. Valid values: none, anonymous, member, staff, admin, super_admin")]
    InvalidPrivilege(String),
}

impl RosterError {
    /// Line number for row-level errors, `None` for file-level ones.
    pub fn line(&self) -> Option<u64> {
        match self {
            RosterError::MissingColumn { line, .. }
            | RosterError::EmptyName { line }
            | RosterError::InvalidBirthDate { line, .. }
            | RosterError::MalformedEmail { line, .. } => Some(*line),
            RosterError::Csv { .. }
            | RosterError::InvalidDelimiter(_)
            | RosterError::InvalidPrivilege(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
