//! metalcloud-client: HTTP client library
//!
//! Provides an async client for the metalcloud REST API, the search filter
//! translator used by the search endpoints, and a poller for watching
//! resources change over time.
//!
//! # Examples
//!
//! ## Searching
//!
//! ```no_run
//! use metalcloud_client::HttpClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::builder("https://api.example.com/api/v2")
//!     .api_key("secret")
//!     .build()?;
//!
//! // `status:available,used` is sent as `+status:available +status:used`
//! let servers = client.search_servers()
//!     .filter("status:available,used")
//!     .page(1)
//!     .per_page(50)
//!     .send()
//!     .await?;
//!
//! for server in servers.data {
//!     println!("{} {}", server.server_id, server.server_status);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Waiting for a job
//!
//! ```no_run
//! use std::time::Duration;
//! use metalcloud_client::HttpClient;
//! use metalcloud_api::PowerCommand;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new("https://api.example.com/api/v2")?;
//! let job = client.server_power(12, PowerCommand::On).await?;
//!
//! let mut poller = client.watch_job(job.job_id, Duration::from_secs(2));
//! while let Some(job) = poller.recv().await {
//!     let job = job?;
//!     println!("job {}: {}", job.job_id, job.status);
//!     if job.status.is_terminal() {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod filter;
pub mod http;
pub mod poll;

pub use error::{ClientError, Result};
pub use http::{HttpClient, HttpClientBuilder, MATCH_ALL, SearchBuilder};
pub use poll::Poller;
