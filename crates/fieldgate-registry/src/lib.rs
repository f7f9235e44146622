//! Device Registry - identity and trust for the simulated fleet
//!
//! Each device carries an owning user, a role, and a mutable trust score.
//! The registry is an owned object handed to the simulation engine; trust
//! mutation goes through [`DeviceRegistry::boost_trust`] and only ever
//! increments, so scores are monotonically non-decreasing across a run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from registry operations
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown device: {0}")]
    UnknownDevice(String),
    #[error("device document parse error: {0}")]
    Parse(String),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Identity of one registered device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Stable device identifier
    pub device_id: String,
    /// User the device reports under
    pub owning_user: String,
    /// Role used by role-gated sharing rules
    pub role: String,
    /// Cumulative trust score, incremented by sharing activity
    pub trust_score: u64,
}

/// Wire form of one device entry in the registry input document
#[derive(Debug, Deserialize)]
struct DeviceDoc {
    user: String,
    role: String,
    #[serde(default)]
    trust_score: u64,
}

/// The device registry
///
/// Iteration order is stable for a given input: devices are kept sorted
/// by device id, so every cycle visits the fleet in the same order.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<DeviceIdentity>,
}

impl DeviceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a registry from its JSON input document
    ///
    /// The document maps device id to `{ user, role, trust_score }`.
    ///
    /// # Errors
    /// Returns an error if the document is not valid JSON of that shape.
    pub fn from_json(doc: &str) -> Result<Self> {
        let parsed: BTreeMap<String, DeviceDoc> =
            serde_json::from_str(doc).map_err(|e| RegistryError::Parse(e.to_string()))?;

        let mut registry = Self::new();
        for (device_id, entry) in parsed {
            registry.register(DeviceIdentity {
                device_id,
                owning_user: entry.user,
                role: entry.role,
                trust_score: entry.trust_score,
            });
        }
        Ok(registry)
    }

    /// The built-in two-device demo fleet
    pub fn demo() -> Self {
        let mut registry = Self::new();
        registry.register(DeviceIdentity {
            device_id: "device_alpha".to_string(),
            owning_user: "admin_node".to_string(),
            role: "admin".to_string(),
            trust_score: 0,
        });
        registry.register(DeviceIdentity {
            device_id: "device_beta".to_string(),
            owning_user: "ops_node".to_string(),
            role: "technician".to_string(),
            trust_score: 0,
        });
        registry
    }

    /// Add or replace a device, keeping the registry sorted by id
    pub fn register(&mut self, identity: DeviceIdentity) {
        match self
            .devices
            .binary_search_by(|d| d.device_id.cmp(&identity.device_id))
        {
            Ok(i) => self.devices[i] = identity,
            Err(i) => self.devices.insert(i, identity),
        }
    }

    /// Look up a device by id
    pub fn get(&self, device_id: &str) -> Option<&DeviceIdentity> {
        self.devices
            .binary_search_by(|d| d.device_id.as_str().cmp(device_id))
            .ok()
            .map(|i| &self.devices[i])
    }

    /// Iterate devices in stable (id-sorted) order
    pub fn iter(&self) -> impl Iterator<Item = &DeviceIdentity> {
        self.devices.iter()
    }

    /// Device ids in stable order
    pub fn device_ids(&self) -> Vec<String> {
        self.devices.iter().map(|d| d.device_id.clone()).collect()
    }

    /// Increment a device's trust score and return the new score
    ///
    /// # Errors
    /// Returns [`RegistryError::UnknownDevice`] if the id is not registered.
    pub fn boost_trust(&mut self, device_id: &str, delta: u64) -> Result<u64> {
        let i = self
            .devices
            .binary_search_by(|d| d.device_id.as_str().cmp(device_id))
            .map_err(|_| RegistryError::UnknownDevice(device_id.to_string()))?;
        self.devices[i].trust_score += delta;
        Ok(self.devices[i].trust_score)
    }

    /// Number of registered devices
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
