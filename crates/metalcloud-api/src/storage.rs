//! Storage pool types

use std::fmt;

use serde::{Deserialize, Serialize};

/// A storage pool backing drives and shared volumes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoragePool {
    pub storage_pool_id: u64,
    pub storage_pool_name: String,
    #[serde(default)]
    pub datacenter_name: String,
    #[serde(default)]
    pub storage_driver: String,
    #[serde(default)]
    pub storage_technology: String,
    #[serde(default)]
    pub storage_type: String,
    #[serde(default)]
    pub storage_pool_status: String,
    #[serde(default)]
    pub storage_pool_endpoint: String,
    #[serde(default)]
    pub storage_capacity_total_mbytes: u64,
    #[serde(default)]
    pub storage_capacity_used_mbytes: u64,
    #[serde(default)]
    pub storage_pool_in_maintenance: bool,
    #[serde(default)]
    pub storage_pool_is_experimental: bool,
}

impl StoragePool {
    /// Used capacity as a percentage of total, `None` when total is unknown
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn usage_percent(&self) -> Option<f64> {
        if self.storage_capacity_total_mbytes == 0 {
            return None;
        }
        Some(
            self.storage_capacity_used_mbytes as f64 * 100.0
                / self.storage_capacity_total_mbytes as f64,
        )
    }
}

/// Body for registering a new storage pool
#[derive(Clone, Serialize, Deserialize)]
pub struct StoragePoolCreateRequest {
    pub storage_pool_name: String,
    pub datacenter_name: String,
    pub storage_driver: String,
    pub storage_technology: String,
    pub storage_type: String,
    pub storage_pool_endpoint: String,
    pub storage_admin_username: String,
    pub storage_admin_password: String,
    #[serde(default)]
    pub storage_pool_in_maintenance: bool,
    #[serde(default)]
    pub storage_pool_is_experimental: bool,
}

// Keeps the admin password out of logs and error reports.
impl fmt::Debug for StoragePoolCreateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoragePoolCreateRequest")
            .field("storage_pool_name", &self.storage_pool_name)
            .field("datacenter_name", &self.datacenter_name)
            .field("storage_driver", &self.storage_driver)
            .field("storage_technology", &self.storage_technology)
            .field("storage_type", &self.storage_type)
            .field("storage_pool_endpoint", &self.storage_pool_endpoint)
            .field("storage_admin_username", &self.storage_admin_username)
            .field("storage_admin_password", &"<redacted>")
            .finish_non_exhaustive()
    }
}
