// Device records and the router directory collaborator.
//
// The directory owns device storage; the gateway only reads records and
// never caches them process-wide -- every call passes its `DeviceRecord`
// explicitly.

use std::collections::HashMap;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::Error;

/// Which control protocol a stored device speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiType {
    /// Binary sentence API (ports 8728/8729).
    Legacy,
    /// JSON REST API under `/rest`.
    Rest,
}

/// A stored router record, as supplied by the directory.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceRecord {
    #[serde(default)]
    pub id: String,
    pub host: String,
    pub user: String,
    pub password: SecretString,
    pub port: u16,
    pub api_type: ApiType,
}

impl DeviceRecord {
    /// Validate the record before any device I/O.
    pub fn validate(&self) -> Result<(), Error> {
        if self.host.trim().is_empty() {
            return Err(Error::Config {
                message: format!("device {:?} has an empty host", self.id),
            });
        }
        if self.user.trim().is_empty() {
            return Err(Error::Config {
                message: format!("device {:?} has an empty user", self.id),
            });
        }
        Ok(())
    }
}

/// Router directory lookup, consumed synchronously before any device call.
///
/// The directory itself (persistence, CRUD) is outside this core; tests
/// and the CLI use [`StaticDirectory`].
pub trait RouterDirectory: Send + Sync {
    fn lookup(&self, router_id: &str) -> Option<DeviceRecord>;
}

/// In-memory directory backed by a fixed map of records.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    devices: HashMap<String, DeviceRecord>,
}

impl StaticDirectory {
    pub fn new(devices: HashMap<String, DeviceRecord>) -> Self {
        Self { devices }
    }

    /// Insert a record under its own id.
    pub fn insert(&mut self, mut device: DeviceRecord) {
        if device.id.is_empty() {
            device.id = device.host.clone();
        }
        self.devices.insert(device.id.clone(), device);
    }
}

impl RouterDirectory for StaticDirectory {
    fn lookup(&self, router_id: &str) -> Option<DeviceRecord> {
        self.devices.get(router_id).cloned()
    }
}
