//! Background polling of API resources

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::error::Result;

const CHANNEL_CAPACITY: usize = 16;
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Re-fetches a resource on an interval from a background task
///
/// Each fetch result, successful or not, is delivered through [`recv`].
/// After a failure the next fetch is delayed with exponential backoff
/// (starting at the interval, capped at one minute); a success resets it.
/// The task stops once the poller is dropped.
///
/// [`recv`]: Poller::recv
#[derive(Debug)]
pub struct Poller<T> {
    receiver: mpsc::Receiver<Result<T>>,
    task_handle: tokio::task::JoinHandle<()>,
}

impl<T: Send + 'static> Poller<T> {
    /// Start polling with `fetch` every `interval`
    ///
    /// The first fetch happens immediately.
    ///
    /// # Example
    /// ```no_run
    /// use std::time::Duration;
    /// use metalcloud_client::{HttpClient, Poller};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = HttpClient::new("https://api.example.com/api/v2")?;
    /// let mut poller = Poller::spawn(Duration::from_secs(5), move || {
    ///     let client = client.clone();
    ///     async move { client.search_servers().filter("status:cleaning").send().await }
    /// });
    ///
    /// while let Some(page) = poller.recv().await {
    ///     println!("{} servers cleaning", page?.data.len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn<F, Fut>(interval: Duration, fetch: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let task_handle = tokio::spawn(Self::poll_loop(interval, fetch, tx));

        Self {
            receiver: rx,
            task_handle,
        }
    }

    /// Receive the next fetch result
    ///
    /// Returns `None` once the polling task has stopped.
    pub async fn recv(&mut self) -> Option<Result<T>> {
        self.receiver.recv().await
    }

    /// Fetch loop with backoff on failure
    async fn poll_loop<F, Fut>(interval: Duration, mut fetch: F, tx: mpsc::Sender<Result<T>>)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut backoff = interval;

        loop {
            let result = fetch().await;
            let delay = match &result {
                Ok(_) => {
                    backoff = interval;
                    interval
                }
                Err(e) => {
                    let delay = backoff;
                    tracing::warn!("poll failed: {}, retrying in {:?}", e, delay);
                    backoff = backoff.saturating_mul(2).min(MAX_BACKOFF.max(interval));
                    delay
                }
            };

            if tx.send(result).await.is_err() {
                // Receiver dropped, exit
                return;
            }

            sleep(delay).await;
        }
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        self.task_handle.abort();
    }
}
