//! Server types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseEnumError;

/// Lifecycle status of a bare-metal server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerStatus {
    Registering,
    Available,
    Used,
    Cleaning,
    Unavailable,
    Defective,
    Decommissioned,
    RemovedFromRack,
    /// A status this client does not know about yet
    #[serde(other)]
    Unknown,
}

impl ServerStatus {
    const EXPECTED: &'static str = "registering, available, used, cleaning, unavailable, \
                                    defective, decommissioned, removed_from_rack";

    /// Wire name of the status
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ServerStatus::Registering => "registering",
            ServerStatus::Available => "available",
            ServerStatus::Used => "used",
            ServerStatus::Cleaning => "cleaning",
            ServerStatus::Unavailable => "unavailable",
            ServerStatus::Defective => "defective",
            ServerStatus::Decommissioned => "decommissioned",
            ServerStatus::RemovedFromRack => "removed_from_rack",
            ServerStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "registering" => Ok(ServerStatus::Registering),
            "available" => Ok(ServerStatus::Available),
            "used" => Ok(ServerStatus::Used),
            "cleaning" => Ok(ServerStatus::Cleaning),
            "unavailable" => Ok(ServerStatus::Unavailable),
            "defective" => Ok(ServerStatus::Defective),
            "decommissioned" => Ok(ServerStatus::Decommissioned),
            "removed_from_rack" => Ok(ServerStatus::RemovedFromRack),
            _ => Err(ParseEnumError::new("server status", s, Self::EXPECTED)),
        }
    }
}

/// Power state reported by the server's BMC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerStatus {
    On,
    Off,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerStatus::On => write!(f, "on"),
            PowerStatus::Off => write!(f, "off"),
            PowerStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Power control operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerCommand {
    On,
    Off,
    Reset,
    /// ACPI soft shutdown
    Soft,
}

impl fmt::Display for PowerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerCommand::On => write!(f, "on"),
            PowerCommand::Off => write!(f, "off"),
            PowerCommand::Reset => write!(f, "reset"),
            PowerCommand::Soft => write!(f, "soft"),
        }
    }
}

impl FromStr for PowerCommand {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "on" => Ok(PowerCommand::On),
            "off" => Ok(PowerCommand::Off),
            "reset" => Ok(PowerCommand::Reset),
            "soft" => Ok(PowerCommand::Soft),
            _ => Err(ParseEnumError::new(
                "power command",
                s,
                "on, off, reset, soft",
            )),
        }
    }
}

/// A bare-metal server registered with the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub server_id: u64,
    #[serde(default)]
    pub server_uuid: String,
    #[serde(default)]
    pub server_serial_number: String,
    #[serde(default)]
    pub server_vendor: String,
    #[serde(default)]
    pub server_product_name: String,
    #[serde(default)]
    pub datacenter_name: String,
    pub server_status: ServerStatus,
    #[serde(default)]
    pub server_power_status: PowerStatus,
    #[serde(default)]
    pub server_processor_count: u32,
    #[serde(default)]
    pub server_ram_gbytes: u64,
    #[serde(default)]
    pub server_disk_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_created_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerPowerRequest {
    pub command: PowerCommand,
}

/// Partial server update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEditRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_status: Option<ServerStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_comments: Option<String>,
}

impl ServerEditRequest {
    /// True when no field would be changed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.server_status.is_none() && self.server_comments.is_none()
    }

    /// Overlay `other` on top of `self`, fields set in `other` win
    #[must_use]
    pub fn merge(self, other: ServerEditRequest) -> Self {
        Self {
            server_status: other.server_status.or(self.server_status),
            server_comments: other.server_comments.or(self.server_comments),
        }
    }
}
