//! HTTP client for the metalcloud API

use std::marker::PhantomData;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use metalcloud_api::{
    ApiErrorBody, HealthResponse, Job, PaginatedResponse, PowerCommand, Server, ServerEditRequest,
    ServerPowerRequest, StoragePool, StoragePoolCreateRequest,
};

use crate::error::{ClientError, Result};
use crate::filter;
use crate::poll::Poller;

const DEFAULT_USER_AGENT: &str = concat!("metalcloud-client/", env!("CARGO_PKG_VERSION"));

/// Filter used by search requests when none is given
pub const MATCH_ALL: &str = "*";

/// HTTP client for communicating with the metalcloud API
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    /// Create a new HTTP client without authentication
    ///
    /// # Errors
    /// Returns an error if the endpoint URL is invalid.
    ///
    /// # Example
    /// ```no_run
    /// use metalcloud_client::HttpClient;
    ///
    /// let client = HttpClient::new("https://api.example.com/api/v2")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(endpoint: impl AsRef<str>) -> Result<Self> {
        Self::builder(endpoint).build()
    }

    /// Start configuring a client for `endpoint`
    ///
    /// # Example
    /// ```no_run
    /// use std::time::Duration;
    /// use metalcloud_client::HttpClient;
    ///
    /// let client = HttpClient::builder("https://api.example.com/api/v2")
    ///     .api_key("secret")
    ///     .timeout(Duration::from_secs(30))
    ///     .build()?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn builder(endpoint: impl AsRef<str>) -> HttpClientBuilder {
        HttpClientBuilder::new(endpoint.as_ref())
    }

    /// Create a new HTTP client with custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the endpoint URL is invalid.
    pub fn with_client(endpoint: impl AsRef<str>, client: Client) -> Result<Self> {
        let base_url = parse_base_url(endpoint.as_ref())?;
        Ok(Self { client, base_url })
    }

    /// Base URL all resource paths are resolved against
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a full URL from a resource path
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(ClientError::Url)
    }

    /// Send a request and turn non-2xx statuses into `ClientError::Api`
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or(text);
        tracing::warn!(status = status.as_u16(), %message, "API request failed");

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Perform a GET request and deserialize the response
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");
        let response = self.execute(self.client.get(url)).await?;
        Ok(response.json().await?)
    }

    /// Perform a POST request with JSON body
    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl serde::Serialize,
    ) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(%url, "POST");
        let response = self.execute(self.client.post(url).json(&body)).await?;
        Ok(response.json().await?)
    }

    /// Perform a PATCH request with JSON body
    async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl serde::Serialize,
    ) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(%url, "PATCH");
        let response = self.execute(self.client.patch(url).json(&body)).await?;
        Ok(response.json().await?)
    }

    /// Perform a DELETE request
    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        tracing::debug!(%url, "DELETE");
        self.execute(self.client.delete(url)).await?;
        Ok(())
    }

    // System endpoints

    /// Get API health status
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn health(&self) -> Result<HealthResponse> {
        self.get("health").await
    }

    // Server endpoints

    /// Search servers
    ///
    /// # Example
    /// ```no_run
    /// # use metalcloud_client::HttpClient;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = HttpClient::new("https://api.example.com/api/v2")?;
    /// let servers = client.search_servers()
    ///     .filter("server_status:available,used datacenter_name:us-west")
    ///     .per_page(50)
    ///     .send()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn search_servers(&self) -> SearchBuilder<Server> {
        SearchBuilder::new(self.clone(), "servers")
    }

    /// Get a single server by id
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn get_server(&self, id: u64) -> Result<Server> {
        self.get(&format!("servers/{id}")).await
    }

    /// Send a power command to a server, returning the queued job
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    ///
    /// # Example
    /// ```no_run
    /// # use metalcloud_client::HttpClient;
    /// # use metalcloud_api::PowerCommand;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = HttpClient::new("https://api.example.com/api/v2")?;
    /// let job = client.server_power(12, PowerCommand::Reset).await?;
    /// println!("queued job {}", job.job_id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn server_power(&self, id: u64, command: PowerCommand) -> Result<Job> {
        self.post(&format!("servers/{id}/power"), ServerPowerRequest { command })
            .await
    }

    /// Update server fields
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn edit_server(&self, id: u64, request: &ServerEditRequest) -> Result<Server> {
        self.patch(&format!("servers/{id}"), request).await
    }

    /// Delete a server
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn delete_server(&self, id: u64) -> Result<()> {
        self.delete(&format!("servers/{id}")).await
    }

    // Storage pool endpoints

    /// Search storage pools
    #[must_use]
    pub fn search_storage_pools(&self) -> SearchBuilder<StoragePool> {
        SearchBuilder::new(self.clone(), "storage-pools")
    }

    /// Get a single storage pool by id
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn get_storage_pool(&self, id: u64) -> Result<StoragePool> {
        self.get(&format!("storage-pools/{id}")).await
    }

    /// Register a new storage pool
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn create_storage_pool(
        &self,
        request: &StoragePoolCreateRequest,
    ) -> Result<StoragePool> {
        self.post("storage-pools", request).await
    }

    /// Delete a storage pool
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn delete_storage_pool(&self, id: u64) -> Result<()> {
        self.delete(&format!("storage-pools/{id}")).await
    }

    // Job endpoints

    /// Search jobs
    #[must_use]
    pub fn search_jobs(&self) -> SearchBuilder<Job> {
        SearchBuilder::new(self.clone(), "jobs")
    }

    /// Get a single job by id
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn get_job(&self, id: u64) -> Result<Job> {
        self.get(&format!("jobs/{id}")).await
    }

    /// Re-queue a failed job
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn retry_job(&self, id: u64) -> Result<Job> {
        self.post(&format!("jobs/{id}/retry"), serde_json::json!({}))
            .await
    }

    /// Stop a pending or running job
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn kill_job(&self, id: u64) -> Result<Job> {
        self.post(&format!("jobs/{id}/kill"), serde_json::json!({}))
            .await
    }

    /// Poll a job every `interval` until the returned poller is dropped
    ///
    /// # Example
    /// ```no_run
    /// # use std::time::Duration;
    /// # use metalcloud_client::HttpClient;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = HttpClient::new("https://api.example.com/api/v2")?;
    /// let mut poller = client.watch_job(1001, Duration::from_secs(2));
    ///
    /// while let Some(result) = poller.recv().await {
    ///     let job = result?;
    ///     if job.status.is_terminal() {
    ///         break;
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn watch_job(&self, id: u64, interval: Duration) -> Poller<Job> {
        let client = self.clone();
        Poller::spawn(interval, move || {
            let client = client.clone();
            async move { client.get_job(id).await }
        })
    }
}

/// Builder for [`HttpClient`]
#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    endpoint: String,
    api_key: Option<String>,
    timeout: Option<Duration>,
    user_agent: String,
}

impl HttpClientBuilder {
    fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            api_key: None,
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// API key sent as a bearer token on every request
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Overall timeout for each request
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client
    ///
    /// # Errors
    /// Returns an error if the endpoint is not a valid URL, the API key is
    /// not a valid header value, or the TLS backend fails to initialize.
    pub fn build(self) -> Result<HttpClient> {
        let base_url = parse_base_url(&self.endpoint)?;

        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| ClientError::InvalidHeader(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(self.user_agent);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(HttpClient {
            client: builder.build()?,
            base_url,
        })
    }
}

/// Parse an endpoint so that relative paths join beneath it
fn parse_base_url(endpoint: &str) -> Result<Url> {
    let mut url = Url::parse(endpoint)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Builder for search requests with filters and pagination
#[derive(Debug)]
pub struct SearchBuilder<T> {
    client: HttpClient,
    path: &'static str,
    filter: Option<String>,
    page: Option<u64>,
    per_page: Option<u64>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> SearchBuilder<T> {
    fn new(client: HttpClient, path: &'static str) -> Self {
        Self {
            client,
            path,
            filter: None,
            page: None,
            per_page: None,
            _marker: PhantomData,
        }
    }

    /// Filter expression, e.g. `status:available,used datacenter_name:us-west`
    ///
    /// Translated with [`filter::translate`] before being sent.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set page number (default: 1)
    #[must_use]
    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    /// Set items per page
    #[must_use]
    pub fn per_page(mut self, per_page: u64) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// URL the request will be sent to
    ///
    /// # Errors
    /// Returns an error if the resource path cannot be joined to the base URL.
    pub fn request_url(&self) -> Result<Url> {
        let mut url = self.client.url(self.path)?;

        {
            let raw = self.filter.as_deref().unwrap_or(MATCH_ALL);
            let mut query = url.query_pairs_mut();
            query.append_pair("filter", &filter::translate(raw));
            if let Some(page) = self.page {
                query.append_pair("page", &page.to_string());
            }
            if let Some(per_page) = self.per_page {
                query.append_pair("per_page", &per_page.to_string());
            }
        }

        Ok(url)
    }

    /// Execute the request
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn send(self) -> Result<PaginatedResponse<T>> {
        let url = self.request_url()?;
        tracing::debug!(%url, "GET");
        let response = self.client.execute(self.client.client.get(url)).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_value(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new("http://localhost:8080");
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let client = HttpClient::new("not a url");
        assert!(matches!(client, Err(ClientError::Url(_))));
    }

    #[test]
    fn test_invalid_api_key() {
        let client = HttpClient::builder("http://localhost:8080")
            .api_key("bad\nkey")
            .build();
        assert!(matches!(client, Err(ClientError::InvalidHeader(_))));
    }

    #[test]
    fn test_url_building() {
        let client = HttpClient::new("http://localhost:8080").unwrap();
        let url = client.url("/servers").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/servers");
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = HttpClient::new("https://api.example.com/api/v2").unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.example.com/api/v2/");

        let url = client.url("servers/7/power").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/v2/servers/7/power");

        let url = client.url("/jobs").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/v2/jobs");
    }

    #[test]
    fn test_search_defaults_to_match_all() {
        let client = HttpClient::new("http://localhost:8080").unwrap();
        let url = client.search_servers().request_url().unwrap();

        assert_eq!(url.path(), "/servers");
        assert_eq!(query_value(&url, "filter").as_deref(), Some("*"));
        assert!(query_value(&url, "page").is_none());
    }

    #[test]
    fn test_search_url_building() {
        let client = HttpClient::new("http://localhost:8080/api").unwrap();
        let url = client
            .search_jobs()
            .filter("status:running,pending")
            .page(2)
            .per_page(50)
            .request_url()
            .unwrap();

        assert_eq!(url.path(), "/api/jobs");
        assert_eq!(
            query_value(&url, "filter").as_deref(),
            Some("+status:running +status:pending")
        );
        assert_eq!(query_value(&url, "page").as_deref(), Some("2"));
        assert_eq!(query_value(&url, "per_page").as_deref(), Some("50"));
    }

    #[test]
    fn test_storage_pool_search_path() {
        let client = HttpClient::new("http://localhost:8080").unwrap();
        let url = client
            .search_storage_pools()
            .filter("datacenter_name=us-west")
            .request_url()
            .unwrap();

        assert_eq!(url.path(), "/storage-pools");
        assert_eq!(
            query_value(&url, "filter").as_deref(),
            Some("+datacenter_name:us-west")
        );
    }
}
