//! Fixed vocabularies for users, incidents and resources.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    Fire,
    Flood,
    Earthquake,
    Tornado,
    Hurricane,
    MedicalEmergency,
    PowerOutage,
    GasLeak,
    ChemicalSpill,
    RoadAccident,
    BuildingCollapse,
    ViolentIncident,
    Other,
}

impl IncidentType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            IncidentType::Fire => "fire",
            IncidentType::Flood => "flood",
            IncidentType::Earthquake => "earthquake",
            IncidentType::Tornado => "tornado",
            IncidentType::Hurricane => "hurricane",
            IncidentType::MedicalEmergency => "medical_emergency",
            IncidentType::PowerOutage => "power_outage",
            IncidentType::GasLeak => "gas_leak",
            IncidentType::ChemicalSpill => "chemical_spill",
            IncidentType::RoadAccident => "road_accident",
            IncidentType::BuildingCollapse => "building_collapse",
            IncidentType::ViolentIncident => "violent_incident",
            IncidentType::Other => "other",
        }
    }

    pub const fn all() -> &'static [IncidentType] {
        &[
            IncidentType::Fire,
            IncidentType::Flood,
            IncidentType::Earthquake,
            IncidentType::Tornado,
            IncidentType::Hurricane,
            IncidentType::MedicalEmergency,
            IncidentType::PowerOutage,
            IncidentType::GasLeak,
            IncidentType::ChemicalSpill,
            IncidentType::RoadAccident,
            IncidentType::BuildingCollapse,
            IncidentType::ViolentIncident,
            IncidentType::Other,
        ]
    }

    /// Map marker icon name.
    pub const fn icon(&self) -> &'static str {
        match self {
            IncidentType::Fire => "bi-fire",
            IncidentType::Flood => "bi-water",
            IncidentType::Earthquake => "bi-globe",
            IncidentType::Tornado => "bi-wind",
            IncidentType::Hurricane => "bi-cloud-hurricane",
            IncidentType::MedicalEmergency => "bi-heart-pulse",
            IncidentType::PowerOutage => "bi-lightbulb-off",
            IncidentType::GasLeak => "bi-cloud-fog",
            IncidentType::ChemicalSpill => "bi-flask",
            IncidentType::RoadAccident => "bi-car-crash",
            IncidentType::BuildingCollapse => "bi-building-damage",
            IncidentType::ViolentIncident => "bi-exclamation-triangle",
            IncidentType::Other => "bi-question-circle",
        }
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IncidentType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown incident type: {s}"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub const fn all() -> &'static [Severity] {
        &[Severity::Low, Severity::Medium, Severity::High, Severity::Critical]
    }

    pub const fn description(&self) -> &'static str {
        match self {
            Severity::Low => "Low - Non-urgent response needed",
            Severity::Medium => "Medium - Prompt response required",
            Severity::High => "High - Immediate response required",
            Severity::Critical => "Critical - Life-threatening situation",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::all()
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown severity: {s}"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    #[default]
    Reported,
    Validated,
    InProgress,
    Resolved,
}

impl IncidentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Reported => "reported",
            IncidentStatus::Validated => "validated",
            IncidentStatus::InProgress => "in_progress",
            IncidentStatus::Resolved => "resolved",
        }
    }

    pub const fn all() -> &'static [IncidentStatus] {
        &[
            IncidentStatus::Reported,
            IncidentStatus::Validated,
            IncidentStatus::InProgress,
            IncidentStatus::Resolved,
        ]
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IncidentStatus::all()
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown incident status: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Medical,
    Rescue,
    Shelter,
    Food,
    Water,
    Transportation,
    Communication,
    Power,
    Other,
}

impl ResourceType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Medical => "medical",
            ResourceType::Rescue => "rescue",
            ResourceType::Shelter => "shelter",
            ResourceType::Food => "food",
            ResourceType::Water => "water",
            ResourceType::Transportation => "transportation",
            ResourceType::Communication => "communication",
            ResourceType::Power => "power",
            ResourceType::Other => "other",
        }
    }

    pub const fn all() -> &'static [ResourceType] {
        &[
            ResourceType::Medical,
            ResourceType::Rescue,
            ResourceType::Shelter,
            ResourceType::Food,
            ResourceType::Water,
            ResourceType::Transportation,
            ResourceType::Communication,
            ResourceType::Power,
            ResourceType::Other,
        ]
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::all()
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown resource type: {s}"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    CommunityMember,
    Volunteer,
    Responder,
    Admin,
}

impl UserRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            UserRole::CommunityMember => "community_member",
            UserRole::Volunteer => "volunteer",
            UserRole::Responder => "responder",
            UserRole::Admin => "admin",
        }
    }

    pub const fn all() -> &'static [UserRole] {
        &[
            UserRole::CommunityMember,
            UserRole::Volunteer,
            UserRole::Responder,
            UserRole::Admin,
        ]
    }

    pub const fn label(&self) -> &'static str {
        match self {
            UserRole::CommunityMember => "Community Member",
            UserRole::Volunteer => "Volunteer",
            UserRole::Responder => "Emergency Responder",
            UserRole::Admin => "Administrator",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::all()
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown role: {s}"))
    }
}
