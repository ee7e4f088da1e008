//! Provisioning account types.
//!
//! These mirror the backend's bulk user insertion payload, so field names and
//! key order are part of the output contract.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, RosterError};

/// Backend user privilege level, serialized as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrivilegeType {
    None,
    Anonymous,
    #[default]
    Member,
    Staff,
    Admin,
    SuperAdmin,
}

impl PrivilegeType {
    pub fn code(self) -> i32 {
        match self {
            PrivilegeType::None => 0,
            PrivilegeType::Anonymous => 100,
            PrivilegeType::Member => 200,
            PrivilegeType::Staff => 300,
            PrivilegeType::Admin => 400,
            PrivilegeType::SuperAdmin => 500,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(PrivilegeType::None),
            100 => Some(PrivilegeType::Anonymous),
            200 => Some(PrivilegeType::Member),
            300 => Some(PrivilegeType::Staff),
            400 => Some(PrivilegeType::Admin),
            500 => Some(PrivilegeType::SuperAdmin),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrivilegeType::None => "none",
            PrivilegeType::Anonymous => "anonymous",
            PrivilegeType::Member => "member",
            PrivilegeType::Staff => "staff",
            PrivilegeType::Admin => "admin",
            PrivilegeType::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for PrivilegeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PrivilegeType {
    type Err = RosterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let by_name = match normalized.as_str() {
            "none" => Some(PrivilegeType::None),
            "anonymous" => Some(PrivilegeType::Anonymous),
            "member" => Some(PrivilegeType::Member),
            "staff" => Some(PrivilegeType::Staff),
            "admin" => Some(PrivilegeType::Admin),
            "super_admin" => Some(PrivilegeType::SuperAdmin),
            _ => None,
        };
        by_name
            .or_else(|| normalized.parse().ok().and_then(Self::from_code))
            .ok_or_else(|| RosterError::InvalidPrivilege(s.to_string()))
    }
}

impl Serialize for PrivilegeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.code())
    }
}

impl<'de> Deserialize<'de> for PrivilegeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Code(i32),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Code(code) => Self::from_code(code)
                .ok_or_else(|| D::Error::custom(format!("unknown privilege code {}", code))),
            Repr::Name(name) => name.parse().map_err(D::Error::custom),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub first_name: String,
    pub last_name: String,
}

/// One account in the provisioning document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub email: String,
    pub username: String,
    pub password: String,
    pub user_detail: UserDetail,
    pub privilege_type: PrivilegeType,
}

/// An account together with the roster fields used to build and deduplicate
/// it. Only `account` reaches the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentEntry {
    pub name: String,
    pub alias: String,
    pub dob: String,
    pub instrument: String,
    pub account: Account,
}

impl StudentEntry {
    pub fn dedup_key(&self) -> String {
        format!("{}-{}", self.name, self.instrument)
    }
}

/// Root of the output JSON: `{"data": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProvisioningDocument {
    pub data: Vec<Account>,
}

impl ProvisioningDocument {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// True when `dob` is `M/D/YYYY` with 1-2 digit month and day and a
/// 4 digit year. chrono alone accepts short or signed years.
fn is_birth_date_shape(dob: &str) -> bool {
    let digits = |part: &str, min: usize, max: usize| {
        (min..=max).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
    };
    let parts: Vec<&str> = dob.split('/').collect();
    match parts.as_slice() {
        [month, day, year] => digits(month, 1, 2) && digits(day, 1, 2) && digits(year, 4, 4),
        _ => false,
    }
}

/// Initial password: the `MM/DD/YYYY` birth date rewritten as `YYYYMMDD`.
pub fn initial_password(dob: &str, line: u64) -> Result<String> {
    if !is_birth_date_shape(dob) {
        return Err(RosterError::InvalidBirthDate {
            line,
            value: dob.to_string(),
        });
    }
    NaiveDate::parse_from_str(dob, "%m/%d/%Y")
        .map(|date| date.format("%Y%m%d").to_string())
        .map_err(|_| RosterError::InvalidBirthDate {
            line,
            value: dob.to_string(),
        })
}
