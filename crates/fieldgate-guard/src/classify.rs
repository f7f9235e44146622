//! Field Classification - retention tags from field identity
//!
//! Tags are derived from the field name alone, never from the value, and
//! classification is total: unknown fields fall through to `Archive`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse data-sensitivity classification of a telemetry field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetentionTag {
    /// Load-bearing health metrics (cpu, memory)
    Critical,
    /// Short-lived positional/traffic data (gps, network)
    Transient,
    /// Logs and sensor state
    Diagnostic,
    /// Everything else
    Archive,
}

impl RetentionTag {
    /// Record-trail spelling of the tag
    pub fn as_str(&self) -> &'static str {
        match self {
            RetentionTag::Critical => "critical",
            RetentionTag::Transient => "transient",
            RetentionTag::Diagnostic => "diagnostic",
            RetentionTag::Archive => "archive",
        }
    }
}

impl fmt::Display for RetentionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a field by name
pub fn classify_field(field: &str) -> RetentionTag {
    match field {
        "cpu_usage" | "memory_usage" => RetentionTag::Critical,
        "gps_location" | "network_activity" => RetentionTag::Transient,
        "log_entry" | "sensor_status" => RetentionTag::Diagnostic,
        _ => RetentionTag::Archive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::FIELDS;

    #[test]
    fn test_known_field_tags() {
        assert_eq!(classify_field("cpu_usage"), RetentionTag::Critical);
        assert_eq!(classify_field("memory_usage"), RetentionTag::Critical);
        assert_eq!(classify_field("gps_location"), RetentionTag::Transient);
        assert_eq!(classify_field("network_activity"), RetentionTag::Transient);
        assert_eq!(classify_field("log_entry"), RetentionTag::Diagnostic);
        assert_eq!(classify_field("sensor_status"), RetentionTag::Diagnostic);
        assert_eq!(classify_field("disk_usage"), RetentionTag::Archive);
        assert_eq!(classify_field("uptime_hours"), RetentionTag::Archive);
    }

    #[test]
    fn test_classification_is_total() {
        assert_eq!(classify_field("made_up_field"), RetentionTag::Archive);
        assert_eq!(classify_field(""), RetentionTag::Archive);
        // every canonical field gets exactly one tag
        for field in FIELDS {
            let _ = classify_field(field);
        }
    }

    #[test]
    fn test_tag_spelling() {
        assert_eq!(RetentionTag::Critical.to_string(), "critical");
        assert_eq!(RetentionTag::Archive.as_str(), "archive");
    }
}
