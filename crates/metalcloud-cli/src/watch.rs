//! Periodic re-rendering for `--watch`

use std::future::Future;
use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::bail;
use metalcloud_client::Poller;

use crate::output::OutputFormat;

/// Fetch with `fetch` every `interval_secs` and render each result until Ctrl-C
///
/// Table output clears the screen and prints a timestamp before each
/// render. Fetch failures are reported and polling continues.
///
/// # Errors
/// Returns error if rendering fails or polling stops on its own
pub async fn watch<T, F, Fut, R>(
    interval_secs: u64,
    format: OutputFormat,
    fetch: F,
    mut render: R,
) -> Result<()>
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = metalcloud_client::Result<T>> + Send + 'static,
    R: FnMut(&T) -> Result<()>,
{
    let mut poller = Poller::spawn(Duration::from_secs(interval_secs), fetch);
    let interactive = format == OutputFormat::Table;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::debug!("watch interrupted");
                break;
            }
            next = poller.recv() => {
                let Some(result) = next else {
                    bail!("polling stopped unexpectedly");
                };
                match result {
                    Ok(value) => {
                        if interactive {
                            // ESC[2J clears the screen, ESC[H moves the cursor home
                            print!("\x1b[2J\x1b[H");
                            let now = chrono::Local::now();
                            println!("Updated: {}\n", now.format("%Y-%m-%d %H:%M:%S"));
                        }
                        render(&value)?;
                        if interactive {
                            println!("\n(Press Ctrl+C to stop watching)");
                        }
                    }
                    Err(e) => tracing::warn!("fetch failed: {e}"),
                }
            }
        }
    }

    Ok(())
}
