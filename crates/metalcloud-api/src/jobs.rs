//! Asynchronous job types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseEnumError;

/// Execution status of an asynchronous job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    ReturnedSuccess,
    ThrownError,
    Killed,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Whether the job will not change status again
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::ReturnedSuccess | JobStatus::ThrownError | JobStatus::Killed
        )
    }

    /// Whether the job finished without error
    #[must_use]
    pub fn is_success(self) -> bool {
        self == JobStatus::ReturnedSuccess
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::ReturnedSuccess => "returned_success",
            JobStatus::ThrownError => "thrown_error",
            JobStatus::Killed => "killed",
            JobStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "returned_success" => Ok(JobStatus::ReturnedSuccess),
            "thrown_error" => Ok(JobStatus::ThrownError),
            "killed" => Ok(JobStatus::Killed),
            _ => Err(ParseEnumError::new(
                "job status",
                s,
                "pending, running, returned_success, thrown_error, killed",
            )),
        }
    }
}

/// An asynchronous job queued by a mutating API call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_group_id: Option<u64>,
    pub function_name: String,
    pub status: JobStatus,
    #[serde(default)]
    pub retry_count: u32,
    pub created_timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
