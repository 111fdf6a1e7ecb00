#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::common::require_text;
use crate::phone::PhoneNumber;
use crate::{ContractViolation, SchemaVersion, Validate};

pub const DIRECTORY_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    ElderCompanionship,
    SisterCompanionship,
    DistrictLeader,
    ZoneLeader,
    /// Exempt from every rule (mission office and similar lines).
    Special,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ElderCompanionship => "elder_companionship",
            Self::SisterCompanionship => "sister_companionship",
            Self::DistrictLeader => "district_leader",
            Self::ZoneLeader => "zone_leader",
            Self::Special => "special",
        }
    }

    pub const fn all() -> &'static [Self] {
        &[
            Self::ElderCompanionship,
            Self::SisterCompanionship,
            Self::DistrictLeader,
            Self::ZoneLeader,
            Self::Special,
        ]
    }

    /// Accepts the canonical names plus the spellings used in hand-kept
    /// directory sheets ("Elders", "Zone Leaders", "ZL", "Office", ...).
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw
            .trim()
            .to_ascii_lowercase()
            .replace(['_', '-'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        match normalized.as_str() {
            "elder companionship" | "elders" | "elder" => Some(Self::ElderCompanionship),
            "sister companionship" | "sisters" | "sister" => Some(Self::SisterCompanionship),
            "district leader" | "district leaders" | "dl" => Some(Self::DistrictLeader),
            "zone leader" | "zone leaders" | "zl" => Some(Self::ZoneLeader),
            "special" | "office" | "mission office" => Some(Self::Special),
            _ => None,
        }
    }

    pub fn allowed_names() -> Vec<&'static str> {
        Self::all().iter().map(|role| role.as_str()).collect()
    }

    pub fn is_special(self) -> bool {
        self == Self::Special
    }

    pub fn is_zone_leader(self) -> bool {
        self == Self::ZoneLeader
    }
}

/// One row of the directory feed before it is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryFeedRow {
    pub phone: String,
    pub zone: String,
    pub area: String,
    #[serde(default)]
    pub members: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub schema_version: SchemaVersion,
    pub phone: PhoneNumber,
    pub zone: String,
    pub area: String,
    pub members: String,
    pub role: Role,
}

impl DirectoryEntry {
    pub fn v1(
        phone: PhoneNumber,
        zone: String,
        area: String,
        members: String,
        role: Role,
    ) -> Result<Self, ContractViolation> {
        let e = Self {
            schema_version: DIRECTORY_CONTRACT_VERSION,
            phone,
            zone,
            area,
            members,
            role,
        };
        e.validate()?;
        Ok(e)
    }

    pub fn from_feed_row(row: &DirectoryFeedRow) -> Result<Self, ContractViolation> {
        let phone = PhoneNumber::new(&row.phone)?;
        let role = Role::parse(&row.role).ok_or(ContractViolation::InvalidValue {
            field: "directory_feed_row.role",
            reason: "unrecognized role",
        })?;
        Self::v1(
            phone,
            row.zone.trim().to_string(),
            row.area.trim().to_string(),
            row.members.trim().to_string(),
            role,
        )
    }

    pub fn is_zone_leader(&self) -> bool {
        self.role.is_zone_leader()
    }

    /// Display label used in every report row: `"{area}: {members}"`.
    pub fn label(&self) -> String {
        format!("{}: {}", self.area, self.members)
    }
}

impl Validate for DirectoryEntry {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != DIRECTORY_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "directory_entry.schema_version",
                reason: "must match DIRECTORY_CONTRACT_VERSION",
            });
        }
        self.phone.validate()?;
        require_text("directory_entry.zone", &self.zone, 128)?;
        require_text("directory_entry.area", &self.area, 128)?;
        if self.members.len() > 256 {
            return Err(ContractViolation::InvalidRange {
                field: "directory_entry.members",
                min: 0,
                max: 256,
                got: self.members.len() as i64,
            });
        }
        Ok(())
    }
}
