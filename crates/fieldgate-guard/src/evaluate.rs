//! Policy Evaluator - applying one device's policy to one reading
//!
//! Every field of the reading lands in exactly one bucket: shared
//! (digested), violation, or silently dropped. Violations are reserved
//! for type-precondition failures — a value a rule cannot be evaluated
//! against, such as non-numeric input to a threshold comparison.
//! Policy-compliant non-sharing (below threshold, role mismatch, pattern
//! miss, `do_not_share`) is silent by design and never recorded.

use crate::classify::{classify_field, RetentionTag};
use crate::digest::digest_value;
use crate::policy::{PolicyVersion, RuleKind};
use crate::telemetry::{FieldValue, Reading, ALERT_STATES};
use fieldgate_registry::DeviceIdentity;
use serde::{Deserialize, Serialize};

/// A recorded failure to evaluate a rule's precondition against a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Field the rule was applied to
    pub field: String,
    /// Raw value, in canonical string form
    pub value: String,
    /// Wire name of the rule that failed
    pub rule: String,
}

/// Outcome of evaluating one reading against one device's policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evaluation {
    /// Shared fields with their digested values, in encounter order
    pub shared: Vec<(String, String)>,
    /// Violations, in encounter order
    pub violations: Vec<Violation>,
    /// One retention tag per reading field, in encounter order
    pub tags: Vec<RetentionTag>,
}

impl Evaluation {
    /// Names of the shared fields, in encounter order
    pub fn shared_fields(&self) -> Vec<&str> {
        self.shared.iter().map(|(field, _)| field.as_str()).collect()
    }

    /// Union of retention tags touched, first-encounter order
    pub fn tag_set(&self) -> Vec<RetentionTag> {
        let mut set = Vec::new();
        for tag in &self.tags {
            if !set.contains(tag) {
                set.push(*tag);
            }
        }
        set
    }
}

/// Apply a device's policy to one reading
///
/// Walks the reading in its stable field order. `alert_triggered` is
/// computed once per reading; with `override_on_alert` set it shares
/// every field unconditionally and produces zero violations.
pub fn evaluate(reading: &Reading, policy: &PolicyVersion, identity: &DeviceIdentity) -> Evaluation {
    let alert = reading.alert_triggered();
    let mut result = Evaluation::default();

    for (field, value) in reading.iter() {
        result.tags.push(classify_field(field));

        if policy.override_on_alert && alert {
            result.shared.push((field.to_string(), digest_value(value)));
            continue;
        }

        match policy.rule_for(field) {
            RuleKind::AlwaysShare => {
                result.shared.push((field.to_string(), digest_value(value)));
            }
            RuleKind::NeverShare => {}
            RuleKind::ShareIfAbove(threshold) => match value.as_f64() {
                Some(n) if n > *threshold => {
                    result.shared.push((field.to_string(), digest_value(value)));
                }
                Some(_) => {} // below threshold is compliant, not a violation
                None => result.violations.push(Violation {
                    field: field.to_string(),
                    value: value.to_string(),
                    rule: policy.rule_for(field).name(),
                }),
            },
            RuleKind::ShareIfRole(role) => {
                if identity.role == *role {
                    result.shared.push((field.to_string(), digest_value(value)));
                }
            }
            RuleKind::ShareIfAlert => {
                if ALERT_STATES.contains(&value.to_string().as_str()) {
                    result.shared.push((field.to_string(), digest_value(value)));
                }
            }
            RuleKind::ShareIfPattern(pattern) => {
                let haystack = value.to_string().to_uppercase();
                if haystack.contains(&pattern.to_uppercase()) {
                    result.shared.push((field.to_string(), digest_value(value)));
                }
            }
        }
    }

    result
}
