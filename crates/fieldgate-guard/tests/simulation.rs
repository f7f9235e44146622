//! End-to-end simulation runs against a temporary output directory.

use fieldgate_guard::{
    PolicyStore, SimulationEngine, CLOUD_STORAGE_FILE, TRUST_SCORE_FILE, UPLOAD_LOG_FILE,
    VIOLATION_LOG_FILE,
};
use fieldgate_registry::DeviceRegistry;
use std::fs;
use std::path::Path;

fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|l| l.to_string())
        .collect()
}

#[test]
fn demo_fleet_produces_all_trails() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = SimulationEngine::new(DeviceRegistry::demo(), PolicyStore::demo(), dir.path());

    engine.run(3).unwrap();

    // both demo devices carry an always_share rule, so every cycle uploads
    let cloud = lines(&dir.path().join(CLOUD_STORAGE_FILE));
    assert!(cloud.len() >= 1 + 3 * 2, "cloud trail: {}", cloud.len());

    let audit = lines(&dir.path().join(UPLOAD_LOG_FILE));
    assert_eq!(audit.len(), cloud.len());
    assert_eq!(
        audit[0],
        "timestamp,device_id,fields_shared,count,tags,alert_override,cycle_id"
    );

    let trust = lines(&dir.path().join(TRUST_SCORE_FILE));
    assert_eq!(trust.len(), cloud.len());
    // exactly one header across all appends
    assert_eq!(
        trust
            .iter()
            .filter(|l| *l == "timestamp,device_id,score_delta,current_score")
            .count(),
        1
    );
}

#[test]
fn trust_scores_grow_by_twice_the_shared_fields() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = SimulationEngine::new(DeviceRegistry::demo(), PolicyStore::demo(), dir.path());

    engine.run(4).unwrap();

    let cloud = lines(&dir.path().join(CLOUD_STORAGE_FILE));
    // each cloud row shares: columns beyond timestamp,device_id.
    // Instead of re-parsing per-row column counts (rows are positional),
    // check the invariant on the trust trail itself.
    assert!(!cloud.is_empty());

    for device_id in ["device_alpha", "device_beta"] {
        let mut running = 0u64;
        for line in lines(&dir.path().join(TRUST_SCORE_FILE))
            .iter()
            .skip(1)
            .filter(|l| l.contains(device_id))
        {
            let cols: Vec<&str> = line.split(',').collect();
            let delta: u64 = cols[cols.len() - 2].parse().unwrap();
            let current: u64 = cols[cols.len() - 1].parse().unwrap();
            assert!(delta >= 2 && delta % 2 == 0, "delta {delta}");
            running += delta;
            assert_eq!(current, running, "trust must be monotone and exact");
        }
        let final_score = engine.registry().get(device_id).unwrap().trust_score;
        assert_eq!(final_score, running);
    }
}

#[test]
fn device_without_policy_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();

    let devices = r#"{
        "device_alpha": {"user": "admin_node", "role": "admin", "trust_score": 0},
        "device_orphan": {"user": "ghost", "role": "none", "trust_score": 0}
    }"#;
    let policies = r#"{
        "device_alpha": {
            "v": "1.2.4",
            "rules": {"uptime_hours": "always_share"},
            "override_on_alert": false
        }
    }"#;

    let registry = DeviceRegistry::from_json(devices).unwrap();
    let store = PolicyStore::from_json(policies).unwrap();
    let mut engine = SimulationEngine::new(registry, store, dir.path());

    engine.run(2).unwrap();

    // the orphan produced no rows anywhere
    for file in [
        CLOUD_STORAGE_FILE,
        UPLOAD_LOG_FILE,
        TRUST_SCORE_FILE,
        VIOLATION_LOG_FILE,
    ] {
        for line in lines(&dir.path().join(file)) {
            assert!(!line.contains("device_orphan"), "{file}: {line}");
        }
    }

    // the healthy device still ran both cycles
    let trust = lines(&dir.path().join(TRUST_SCORE_FILE));
    assert_eq!(trust.len(), 1 + 2);
    assert_eq!(engine.registry().get("device_orphan").unwrap().trust_score, 0);
}

#[test]
fn threshold_rule_on_text_field_writes_violations() {
    let dir = tempfile::tempdir().unwrap();

    // network_activity is always "<n> KB/s", which no float parse accepts
    let devices = r#"{
        "device_alpha": {"user": "admin_node", "role": "admin", "trust_score": 0}
    }"#;
    let policies = r#"{
        "device_alpha": {
            "v": "2.0.0",
            "rules": {"network_activity": "share_if_above_50"},
            "override_on_alert": false
        }
    }"#;

    let registry = DeviceRegistry::from_json(devices).unwrap();
    let store = PolicyStore::from_json(policies).unwrap();
    let mut engine = SimulationEngine::new(registry, store, dir.path());

    engine.run(3).unwrap();

    let violations = lines(&dir.path().join(VIOLATION_LOG_FILE));
    assert_eq!(violations.len(), 1 + 3, "one violation per cycle");
    assert_eq!(
        violations[0],
        "timestamp,device_id,field,value,policy_rule,violation_type"
    );
    for row in &violations[1..] {
        assert!(row.contains("network_activity"));
        assert!(row.ends_with("share_if_above_50,PolicyMismatch"));
    }

    // a violating field never reaches the cloud trail
    assert!(lines(&dir.path().join(CLOUD_STORAGE_FILE)).is_empty());
}
