//! Divert classification types shared by payloads and stored records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What a hospital is diverting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DivertKind {
    Full,
    Partial,
    #[serde(alias = "ct-divert")]
    Ct,
    #[serde(alias = "labs-xray-divert")]
    LabsXray,
    Other,
}

impl DivertKind {
    /// Returns the wire name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Partial => "partial",
            Self::Ct => "ct",
            Self::LabsXray => "labs-xray",
            Self::Other => "other",
        }
    }

    /// Returns a human-readable name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Full => "Full divert",
            Self::Partial => "Partial divert",
            Self::Ct => "CT down",
            Self::LabsXray => "Labs/X-Ray unavailable",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for DivertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DivertKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "partial" => Ok(Self::Partial),
            "ct" | "ct-divert" => Ok(Self::Ct),
            "labs-xray" | "labs-xray-divert" => Ok(Self::LabsXray),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown divert kind: {other}")),
        }
    }
}

/// Lifecycle status of a stored divert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivertStatus {
    #[default]
    Active,
    Cleared,
}

impl DivertStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Who reported a divert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DivertSource {
    /// A signed-in or anonymous person.
    User,
    /// A registered reporting unit (e.g. a QR-coded station).
    Unit {
        #[serde(rename = "unitId")]
        unit_id: String,
    },
}

/// Trust level of the reporter at submission time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReporterTier {
    #[default]
    Anonymous,
    User,
    Verified,
}
