//! Simulation Engine - driving N cycles across the fleet
//!
//! The engine owns the registry, the policy store and the sinks, and
//! processes devices strictly sequentially: generate a reading, apply
//! the device's policy, dispatch the outcome. No state carries between
//! cycles except trust scores and whatever the sinks have appended.
//! Per-device per-cycle progress goes to the tracing status stream;
//! that stream is diagnostic only.

use crate::evaluate::evaluate;
use crate::policy::PolicyStore;
use crate::records::RecordSinks;
use crate::telemetry::Reading;
use crate::Result;
use fieldgate_registry::DeviceRegistry;
use std::path::Path;
use tracing::{info, warn};

/// Trust-score boost per shared field
const TRUST_BOOST_PER_FIELD: u64 = 2;

/// The simulation engine
#[derive(Debug)]
pub struct SimulationEngine {
    registry: DeviceRegistry,
    policies: PolicyStore,
    sinks: RecordSinks,
}

impl SimulationEngine {
    /// Create an engine writing its record trails under `out_dir`
    pub fn new<P: AsRef<Path>>(
        registry: DeviceRegistry,
        policies: PolicyStore,
        out_dir: P,
    ) -> Self {
        Self {
            registry,
            policies,
            sinks: RecordSinks::new(out_dir),
        }
    }

    /// Run the simulation to completion
    ///
    /// # Errors
    /// A sink write failure aborts the run; per-field anomalies are
    /// captured as violation records instead and never abort anything.
    pub fn run(&mut self, cycles: u32) -> Result<()> {
        for cycle in 1..=cycles {
            self.run_cycle(cycle)?;
        }
        Ok(())
    }

    /// Process one cycle across all registered devices
    pub fn run_cycle(&mut self, cycle_id: u32) -> Result<()> {
        for device_id in self.registry.device_ids() {
            // registered ids are never removed mid-run
            let Some(identity) = self.registry.get(&device_id).cloned() else {
                continue;
            };
            info!(cycle = cycle_id, device = %device_id, role = %identity.role, "processing device");

            let reading = Reading::synthetic();
            info!(cycle = cycle_id, device = %device_id, "raw: {reading}");

            let Some(policy) = self.policies.get(&device_id) else {
                // configuration error: skip this device, keep the run alive
                warn!(cycle = cycle_id, device = %device_id, "no policy assigned, skipping");
                continue;
            };

            let evaluation = evaluate(&reading, policy, &identity);
            info!(
                cycle = cycle_id,
                device = %device_id,
                shared = evaluation.shared.len(),
                violations = evaluation.violations.len(),
                "shared: [{}]",
                evaluation.shared_fields().join(", ")
            );

            let override_on_alert = policy.override_on_alert;
            if !evaluation.shared.is_empty() {
                self.sinks.record_cloud_upload(&device_id, &evaluation.shared)?;
                self.sinks
                    .record_audit(&device_id, &evaluation, override_on_alert, cycle_id)?;

                let delta = TRUST_BOOST_PER_FIELD * evaluation.shared.len() as u64;
                let current = self.registry.boost_trust(&device_id, delta)?;
                self.sinks.record_trust(&device_id, delta, current)?;
            }
            if !evaluation.violations.is_empty() {
                self.sinks
                    .record_violations(&device_id, &evaluation.violations)?;
            }
        }
        Ok(())
    }

    /// The engine's registry (current trust scores included)
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }
}
