//! Sharing Policies - versioned per-device rule tables
//!
//! Rule names arrive as strings in the policy input document and are
//! resolved into the closed [`RuleKind`] enum once, at load time.
//! Unrecognized names are rejected there — a rule is never silently
//! defaulted and never re-parsed during evaluation.

use crate::{GuardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One sharing rule, applied to a single field of a reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuleKind {
    /// Share the field unconditionally
    AlwaysShare,
    /// Drop the field unconditionally (the default for unlisted fields)
    NeverShare,
    /// Share when the numeric value strictly exceeds the threshold
    ShareIfAbove(f64),
    /// Share when the device's role matches
    ShareIfRole(String),
    /// Share when the value itself is an alert state
    ShareIfAlert,
    /// Share when the value contains the substring, case-insensitive
    ShareIfPattern(String),
}

impl RuleKind {
    /// Resolve a wire rule name, e.g. `share_if_above_85`
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "always_share" => Some(RuleKind::AlwaysShare),
            "do_not_share" => Some(RuleKind::NeverShare),
            "share_if_alert" => Some(RuleKind::ShareIfAlert),
            _ => {
                if let Some(threshold) = name.strip_prefix("share_if_above_") {
                    return threshold
                        .parse::<i64>()
                        .ok()
                        .map(|t| RuleKind::ShareIfAbove(t as f64));
                }
                if let Some(role) = name.strip_prefix("share_if_role_") {
                    if !role.is_empty() {
                        return Some(RuleKind::ShareIfRole(role.to_string()));
                    }
                }
                if let Some(pattern) = name.strip_prefix("share_if_pattern_") {
                    if !pattern.is_empty() {
                        return Some(RuleKind::ShareIfPattern(pattern.to_string()));
                    }
                }
                None
            }
        }
    }

    /// Wire name of the rule, as it appears in violation records
    pub fn name(&self) -> String {
        match self {
            RuleKind::AlwaysShare => "always_share".to_string(),
            RuleKind::NeverShare => "do_not_share".to_string(),
            RuleKind::ShareIfAbove(t) => format!("share_if_above_{}", *t as i64),
            RuleKind::ShareIfRole(role) => format!("share_if_role_{role}"),
            RuleKind::ShareIfAlert => "share_if_alert".to_string(),
            RuleKind::ShareIfPattern(pattern) => format!("share_if_pattern_{pattern}"),
        }
    }
}

/// One device's policy: a version string, a field → rule table, and the
/// alert-override flag. Immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyVersion {
    /// Policy version string, e.g. `1.2.4`
    pub version: String,
    /// Per-field rules; unlisted fields default to [`RuleKind::NeverShare`]
    pub rules: HashMap<String, RuleKind>,
    /// When true, an alerting reading shares every field unconditionally
    pub override_on_alert: bool,
}

impl PolicyVersion {
    /// The rule governing a field
    pub fn rule_for(&self, field: &str) -> &RuleKind {
        static NEVER: RuleKind = RuleKind::NeverShare;
        self.rules.get(field).unwrap_or(&NEVER)
    }
}

/// Wire form of one device's policy in the input document
#[derive(Debug, Deserialize)]
struct PolicyDoc {
    #[serde(rename = "v")]
    version: String,
    rules: BTreeMap<String, String>,
    #[serde(default)]
    override_on_alert: bool,
}

/// Versioned per-device policy table, loaded once at process start
#[derive(Debug, Clone, Default)]
pub struct PolicyStore {
    policies: HashMap<String, PolicyVersion>,
}

impl PolicyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a store from its JSON input document
    ///
    /// # Errors
    /// Returns [`GuardError::PolicyParse`] for a malformed document and
    /// [`GuardError::UnknownRule`] for any unrecognized rule name.
    pub fn from_json(doc: &str) -> Result<Self> {
        let parsed: BTreeMap<String, PolicyDoc> =
            serde_json::from_str(doc).map_err(|e| GuardError::PolicyParse(e.to_string()))?;

        let mut store = Self::new();
        for (device_id, entry) in parsed {
            let mut rules = HashMap::new();
            for (field, rule_name) in entry.rules {
                let rule = RuleKind::parse(&rule_name).ok_or_else(|| GuardError::UnknownRule {
                    device: device_id.clone(),
                    field: field.clone(),
                    rule: rule_name.clone(),
                })?;
                rules.insert(field, rule);
            }
            store.insert(
                &device_id,
                PolicyVersion {
                    version: entry.version,
                    rules,
                    override_on_alert: entry.override_on_alert,
                },
            );
        }
        Ok(store)
    }

    /// The built-in policies for the two-device demo fleet
    pub fn demo() -> Self {
        let doc = r#"{
            "device_alpha": {
                "v": "1.2.4",
                "rules": {
                    "cpu_usage": "share_if_above_85",
                    "disk_usage": "always_share",
                    "memory_usage": "share_if_above_90",
                    "network_activity": "share_if_role_admin",
                    "gps_location": "do_not_share",
                    "sensor_status": "share_if_alert",
                    "uptime_hours": "always_share",
                    "log_entry": "share_if_pattern_error"
                },
                "override_on_alert": true
            },
            "device_beta": {
                "v": "1.0.9",
                "rules": {
                    "cpu_usage": "do_not_share",
                    "disk_usage": "share_if_above_70",
                    "memory_usage": "do_not_share",
                    "network_activity": "do_not_share",
                    "gps_location": "do_not_share",
                    "sensor_status": "share_if_alert",
                    "uptime_hours": "always_share",
                    "log_entry": "do_not_share"
                },
                "override_on_alert": false
            }
        }"#;
        // the built-in document always parses
        Self::from_json(doc).unwrap_or_default()
    }

    /// Add or replace a device's policy
    pub fn insert(&mut self, device_id: &str, policy: PolicyVersion) {
        self.policies.insert(device_id.to_string(), policy);
    }

    /// Look up a device's policy
    pub fn get(&self, device_id: &str) -> Option<&PolicyVersion> {
        self.policies.get(device_id)
    }

    /// Number of policies in the store
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
