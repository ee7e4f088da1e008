//! Configuration file support for roster-prep
//!
//! Values come from `~/.config/roster-prep/config.toml` (or `--config`),
//! then environment variables, then command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::RosterError;
use crate::roster::PrivilegeType;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    /// Privilege assigned to every provisioned account
    pub privilege_type: PrivilegeType,
}

/// How the roster CSV is read
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Rows at the top of the export discarded before data starts
    pub header_rows: usize,
    /// Field delimiter, must be a single ASCII character
    pub delimiter: char,
    pub columns: ColumnLayout,
}

/// Zero-based column positions within a roster row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub name: usize,
    pub dob: usize,
    pub email: usize,
    pub instrument: usize,
}

/// Where and how the provisioning JSON is written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory created next to the input file
    pub dir_name: String,
    /// Spaces per indentation level
    pub indent: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            header_rows: 2,
            delimiter: ',',
            columns: ColumnLayout::default(),
        }
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            name: 1,
            dob: 2,
            email: 5,
            instrument: 8,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir_name: "out".to_string(),
            indent: 4,
        }
    }
}

impl InputConfig {
    /// Delimiter as the byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> crate::error::Result<u8> {
        if !self.delimiter.is_ascii() {
            return Err(RosterError::InvalidDelimiter(self.delimiter));
        }
        Ok(self.delimiter as u8)
    }
}

impl PrepConfig {
    /// Returns the default path to the configuration file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("roster-prep").join("config.toml"))
    }

    /// Load configuration from file, falling back to defaults if not found.
    ///
    /// Environment variables `ROSTER_PREP_HEADER_ROWS` and
    /// `ROSTER_PREP_PRIVILEGE` override file values.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = config_path
            .map(Path::to_path_buf)
            .or_else(Self::config_path);

        let config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) if config_path.is_some() => {
                bail!("config file not found: {}", path.display())
            }
            _ => Self::default(),
        };

        let header_rows = match std::env::var("ROSTER_PREP_HEADER_ROWS") {
            Ok(value) => Some(
                value
                    .parse::<usize>()
                    .with_context(|| format!("invalid ROSTER_PREP_HEADER_ROWS: {}", value))?,
            ),
            Err(_) => None,
        };
        let privilege = match std::env::var("ROSTER_PREP_PRIVILEGE") {
            Ok(value) => Some(value.parse::<PrivilegeType>()?),
            Err(_) => None,
        };

        Ok(config.with_overrides(header_rows, privilege))
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Apply overrides that take precedence over file values.
    pub fn with_overrides(
        mut self,
        header_rows: Option<usize>,
        privilege: Option<PrivilegeType>,
    ) -> Self {
        if let Some(rows) = header_rows {
            self.input.header_rows = rows;
        }
        if let Some(privilege) = privilege {
            self.privilege_type = privilege;
        }
        self
    }
}
