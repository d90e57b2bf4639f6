//! Coded values carried by person records

use std::fmt;

use serde::{Deserialize, Serialize};

/// Administrative sex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sex {
    #[default]
    Male,
    Female,
    Unknown,
}

impl Sex {
    /// Single-letter code used in exported tables
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Unknown => "U",
        }
    }

    /// Parse a single-letter code
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "M" | "m" => Some(Self::Male),
            "F" | "f" => Some(Self::Female),
            "U" | "u" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// The sex a potential duplicate is flipped to
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Male => Self::Female,
            _ => Self::Male,
        }
    }
}

/// Marital status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MaritalStatus {
    #[default]
    Single,
    Married,
    Divorced,
    Widowed,
}

impl MaritalStatus {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::Married => "M",
            Self::Divorced => "D",
            Self::Widowed => "W",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "S" => Some(Self::Single),
            "M" => Some(Self::Married),
            "D" => Some(Self::Divorced),
            "W" => Some(Self::Widowed),
            _ => None,
        }
    }
}

/// Form of address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Title {
    #[default]
    Mr,
    Ms,
    Mrs,
}

impl Title {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Mr => "MR",
            Self::Ms => "MS",
            Self::Mrs => "MRS",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "MR" => Some(Self::Mr),
            "MS" => Some(Self::Ms),
            "MRS" => Some(Self::Mrs),
            _ => None,
        }
    }
}

/// Veterans' card colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DvaType {
    Gold,
    White,
    Orange,
}

impl DvaType {
    pub const ALL: [Self; 3] = [Self::Gold, Self::White, Self::Orange];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Gold => "GOL",
            Self::White => "WHT",
            Self::Orange => "ORN",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "GOL" => Some(Self::Gold),
            "WHT" => Some(Self::White),
            "ORN" => Some(Self::Orange),
            _ => None,
        }
    }
}

/// Aboriginal and Torres Strait Islander status (METeOR 602543)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IndigenousStatus {
    Aboriginal,
    TorresStraitIslander,
    Both,
    #[default]
    Neither,
}

impl IndigenousStatus {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Aboriginal => "1",
            Self::TorresStraitIslander => "2",
            Self::Both => "3",
            Self::Neither => "4",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(Self::Aboriginal),
            "2" => Some(Self::TorresStraitIslander),
            "3" => Some(Self::Both),
            "4" => Some(Self::Neither),
            _ => None,
        }
    }
}

/// A UR value as written to the PMI
///
/// Orphaned links with no spare UR available point at a syntactically
/// invalid value such as `100234X`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UrValue {
    Number(u64),
    Invalid(String),
}

impl UrValue {
    /// The same UR made syntactically invalid
    #[must_use]
    pub fn invalidated(&self) -> Self {
        Self::Invalid(format!("{self}X"))
    }

    #[must_use]
    pub const fn as_number(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Invalid(_) => None,
        }
    }
}

impl Default for UrValue {
    fn default() -> Self {
        Self::Number(0)
    }
}

impl From<u64> for UrValue {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl fmt::Display for UrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Invalid(s) => f.write_str(s),
        }
    }
}
