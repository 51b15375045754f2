//! metalcloud-api: Shared API types
//!
//! Contains the wire types for servers, storage pools and jobs, plus the
//! paginated search envelope returned by the search endpoints. Used by the
//! HTTP client and the CLI.

pub mod error;
pub mod jobs;
pub mod responses;
pub mod servers;
pub mod storage;

pub use error::ParseEnumError;
pub use jobs::{Job, JobStatus};
pub use responses::{ApiErrorBody, HealthResponse, PaginatedResponse, Pagination};
pub use servers::{
    PowerCommand, PowerStatus, Server, ServerEditRequest, ServerPowerRequest, ServerStatus,
};
pub use storage::{StoragePool, StoragePoolCreateRequest};
