//! Telemetry Readings - one synthetic reading per device per cycle
//!
//! A reading is an ordered field-name → value mapping, immutable once
//! generated and never persisted. Field order is the canonical order of
//! [`FIELDS`], so evaluation and record columns are reproducible.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical field names of a reading, in evaluation order
pub const FIELDS: [&str; 8] = [
    "cpu_usage",
    "disk_usage",
    "memory_usage",
    "network_activity",
    "gps_location",
    "sensor_status",
    "uptime_hours",
    "log_entry",
];

/// Sensor states that count as an alert
pub const ALERT_STATES: [&str; 3] = ["Critical", "Overheat", "Motion"];

/// Sensor states a device can report
const SENSOR_STATES: [&str; 4] = ["OK", "Overheat", "Motion", "Critical"];

/// Log lines a device can emit
const LOG_ENTRIES: [&str; 4] = [
    "INFO: Boot complete",
    "WARN: Temp spike",
    "ERROR: Failed handshake",
    "DEBUG: Maintenance mode",
];

/// A single telemetry field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Percentage-style measurement, two-decimal presentation
    Num(f64),
    /// Counter-style measurement
    Int(u64),
    /// Categorical or free-form text
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value, if it has one
    ///
    /// Text parses as a float where possible, so `"85.5"` is numeric and
    /// `"3041 KB/s"` is not. Threshold rules treat `None` as a violation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Num(n) => Some(*n),
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Two decimals: generated percentages are rounded to two
            // decimals, and the digest keys off this exact string form.
            FieldValue::Num(n) => write!(f, "{n:.2}"),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<u64> for FieldValue {
    fn from(i: u64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Num(n)
    }
}

/// One telemetry reading: an ordered field → value mapping
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reading {
    fields: Vec<(String, FieldValue)>,
}

impl Reading {
    /// Create an empty reading
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate one synthetic reading
    ///
    /// Percentages are uniform over their ranges and rounded to two
    /// decimals; categorical fields are drawn uniformly. Each call is
    /// independent — no seed is persisted.
    pub fn synthetic() -> Self {
        let mut rng = rand::thread_rng();
        let pct = |rng: &mut rand::rngs::ThreadRng, lo: f64, hi: f64| {
            (rng.gen_range(lo..=hi) * 100.0).round() / 100.0
        };

        let mut reading = Self::new();
        reading.set("cpu_usage", FieldValue::Num(pct(&mut rng, 10.0, 100.0)));
        reading.set("disk_usage", FieldValue::Num(pct(&mut rng, 30.0, 100.0)));
        reading.set("memory_usage", FieldValue::Num(pct(&mut rng, 40.0, 100.0)));
        reading.set(
            "network_activity",
            FieldValue::Text(format!("{} KB/s", rng.gen_range(100..=8000))),
        );
        reading.set("gps_location", FieldValue::from("19.07°N, 72.87°E"));
        reading.set(
            "sensor_status",
            FieldValue::from(*SENSOR_STATES.choose(&mut rng).unwrap_or(&"OK")),
        );
        reading.set("uptime_hours", FieldValue::Int(rng.gen_range(1..=5000)));
        reading.set(
            "log_entry",
            FieldValue::from(*LOG_ENTRIES.choose(&mut rng).unwrap_or(&LOG_ENTRIES[0])),
        );
        reading
    }

    /// Set a field, replacing any existing value and keeping insert order
    pub fn set(&mut self, field: &str, value: FieldValue) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, v)) => *v = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }

    /// Look up a field value
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| v)
    }

    /// Iterate fields in stable order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, v)| (name.as_str(), v))
    }

    /// Number of fields in the reading
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the reading has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether the reading's sensor status counts as an alert
    ///
    /// Computed once per reading; alert-override policies share every
    /// field when this is true.
    pub fn alert_triggered(&self) -> bool {
        self.get("sensor_status")
            .map(|v| ALERT_STATES.contains(&v.to_string().as_str()))
            .unwrap_or(false)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_reading_has_all_fields() {
        let reading = Reading::synthetic();
        assert_eq!(reading.len(), FIELDS.len());
        for field in FIELDS {
            assert!(reading.get(field).is_some(), "missing field {field}");
        }
        // generated order matches the canonical order
        let order: Vec<&str> = reading.iter().map(|(name, _)| name).collect();
        assert_eq!(order, FIELDS);
    }

    #[test]
    fn test_synthetic_ranges() {
        for _ in 0..50 {
            let reading = Reading::synthetic();
            let cpu = reading.get("cpu_usage").unwrap().as_f64().unwrap();
            let disk = reading.get("disk_usage").unwrap().as_f64().unwrap();
            let memory = reading.get("memory_usage").unwrap().as_f64().unwrap();
            assert!((10.0..=100.0).contains(&cpu));
            assert!((30.0..=100.0).contains(&disk));
            assert!((40.0..=100.0).contains(&memory));

            let uptime = reading.get("uptime_hours").unwrap().as_f64().unwrap();
            assert!((1.0..=5000.0).contains(&uptime));
        }
    }

    #[test]
    fn test_field_value_numeric_view() {
        assert_eq!(FieldValue::Num(85.5).as_f64(), Some(85.5));
        assert_eq!(FieldValue::Int(42).as_f64(), Some(42.0));
        assert_eq!(FieldValue::from("85.5").as_f64(), Some(85.5));
        assert_eq!(FieldValue::from("3041 KB/s").as_f64(), None);
        assert_eq!(FieldValue::from("not_a_number").as_f64(), None);
    }

    #[test]
    fn test_field_value_string_forms() {
        assert_eq!(FieldValue::Num(85.0).to_string(), "85.00");
        assert_eq!(FieldValue::Int(42).to_string(), "42");
        assert_eq!(FieldValue::from("Overheat").to_string(), "Overheat");
    }

    #[test]
    fn test_alert_detection() {
        let mut reading = Reading::new();
        reading.set("sensor_status", FieldValue::from("OK"));
        assert!(!reading.alert_triggered());

        for state in ALERT_STATES {
            reading.set("sensor_status", FieldValue::from(state));
            assert!(reading.alert_triggered(), "{state} should trigger alert");
        }

        let empty = Reading::new();
        assert!(!empty.alert_triggered());
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut reading = Reading::new();
        reading.set("cpu_usage", FieldValue::Int(1));
        reading.set("gps_location", FieldValue::from("nowhere"));
        reading.set("cpu_usage", FieldValue::Int(2));

        assert_eq!(reading.len(), 2);
        assert_eq!(reading.get("cpu_usage"), Some(&FieldValue::Int(2)));
        let order: Vec<&str> = reading.iter().map(|(name, _)| name).collect();
        assert_eq!(order, vec!["cpu_usage", "gps_location"]);
    }
}
