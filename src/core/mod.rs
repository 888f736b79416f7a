//! Shared vocabularies and formatting helpers.

pub mod catalog;
pub mod format;

pub use catalog::{IncidentStatus, IncidentType, ResourceType, Severity, UserRole};
pub use format::{format_rfc3339, format_timestamp, truncate_text, validate_coordinates};
