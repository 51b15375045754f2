//! `job` subcommands

use std::time::Duration;

use chrono::{DateTime, Utc};
use color_eyre::eyre::{self, bail, eyre};
use metalcloud_api::Job;
use metalcloud_client::HttpClient;

use crate::cli::JobCommand;
use crate::commands::{Context, list};
use crate::confirm::confirm;
use crate::output::{Tabular, or_dash};
use crate::watch::watch;

fn timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

impl Tabular for Job {
    const NOUN: &'static str = "job";

    fn headers() -> &'static [&'static str] {
        &[
            "ID",
            "GROUP",
            "FUNCTION",
            "STATUS",
            "RETRIES",
            "CREATED",
            "EXECUTED",
            "DURATION (ms)",
            "ERROR",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.job_id.to_string(),
            or_dash(self.job_group_id),
            self.function_name.clone(),
            self.status.to_string(),
            self.retry_count.to_string(),
            timestamp(&self.created_timestamp),
            or_dash(self.executed_timestamp.as_ref().map(timestamp)),
            or_dash(self.duration_ms),
            or_dash(self.error_message.as_deref()),
        ]
    }
}

pub async fn run(cmd: JobCommand, ctx: &Context) -> eyre::Result<()> {
    match cmd {
        JobCommand::List(args) => list(args, ctx, HttpClient::search_jobs).await,
        JobCommand::Get { id, watch: None } => {
            let job = ctx.client.get_job(id).await?;
            ctx.printer.item(&mut std::io::stdout().lock(), &job)
        }
        JobCommand::Get {
            id,
            watch: Some(secs),
        } => {
            let client = ctx.client.clone();
            let printer = ctx.printer;
            watch(
                secs,
                printer.format(),
                move || {
                    let client = client.clone();
                    async move { client.get_job(id).await }
                },
                |job| printer.item(&mut std::io::stdout().lock(), job),
            )
            .await
        }
        JobCommand::Retry { id, confirm: flags } => {
            if !confirm(&format!("retry job {id}"), flags.autoconfirm)? {
                return ctx.printer.cancelled(&mut std::io::stdout().lock());
            }
            let job = ctx.client.retry_job(id).await?;
            ctx.printer.outcome(
                &mut std::io::stdout().lock(),
                &format!("Job {id} re-queued (retry {})", job.retry_count),
                &job,
            )
        }
        JobCommand::Kill { id, confirm: flags } => {
            if !confirm(&format!("kill job {id}"), flags.autoconfirm)? {
                return ctx.printer.cancelled(&mut std::io::stdout().lock());
            }
            let job = ctx.client.kill_job(id).await?;
            ctx.printer.outcome(
                &mut std::io::stdout().lock(),
                &format!("Job {id} is now {}", job.status),
                &job,
            )
        }
        JobCommand::Wait {
            id,
            interval,
            timeout,
        } => {
            let job = wait_for_job(&ctx.client, id, interval, timeout).await?;
            ctx.printer.item(&mut std::io::stdout().lock(), &job)?;
            if !job.status.is_success() {
                bail!("job {id} finished with status {}", job.status);
            }
            Ok(())
        }
    }
}

/// Poll a job until it reaches a terminal status
async fn wait_for_job(
    client: &HttpClient,
    id: u64,
    interval: u64,
    timeout: Option<u64>,
) -> eyre::Result<Job> {
    let mut poller = client.watch_job(id, Duration::from_secs(interval));

    let wait = async {
        while let Some(result) = poller.recv().await {
            match result {
                Ok(job) if job.status.is_terminal() => return Ok(job),
                Ok(job) => tracing::info!(job = id, status = %job.status, "waiting for job"),
                // A missing job will never finish
                Err(e) if e.is_not_found() => return Err(eyre::Report::from(e)),
                Err(e) => tracing::warn!(job = id, "failed to fetch job: {e}"),
            }
        }
        Err(eyre!("stopped polling job {id}"))
    };

    match timeout {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), wait)
            .await
            .map_err(|_| eyre!("timed out after {secs}s waiting for job {id}"))?,
        None => wait.await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use axum::{Json, Router};
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use metalcloud_api::JobStatus;
    use serde_json::json;

    use super::*;
    use crate::output::{OutputFormat, Printer};

    /// Job 1 fails, job 2 runs once then succeeds, anything else is missing
    async fn spawn_jobs_api() -> HttpClient {
        let polls = Arc::new(AtomicU32::new(0));
        let app = Router::new().route(
            "/api/v2/jobs/{id}",
            get(move |Path(id): Path<u64>| {
                let polls = polls.clone();
                async move {
                    let status = match id {
                        1 => "thrown_error",
                        2 if polls.fetch_add(1, Ordering::SeqCst) == 0 => "running",
                        2 => "returned_success",
                        _ => {
                            return (
                                StatusCode::NOT_FOUND,
                                Json(json!({"code": "NOT_FOUND", "message": format!("job {id} not found")})),
                            )
                                .into_response();
                        }
                    };
                    Json(json!({
                        "job_id": id,
                        "function_name": "server_power_set",
                        "status": status,
                        "retry_count": 0,
                        "created_timestamp": "2024-05-01T10:00:00Z"
                    }))
                    .into_response()
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        HttpClient::new(format!("http://{addr}/api/v2")).unwrap()
    }

    fn context(client: HttpClient) -> Context {
        Context {
            client,
            printer: Printer::new(OutputFormat::Json),
        }
    }

    fn wait(id: u64) -> JobCommand {
        JobCommand::Wait {
            id,
            interval: 1,
            timeout: Some(10),
        }
    }

    fn job() -> Job {
        serde_json::from_str(
            r#"{
                "job_id": 1001,
                "job_group_id": 40,
                "function_name": "server_power_set",
                "status": "returned_success",
                "retry_count": 1,
                "created_timestamp": "2024-05-01T10:00:00Z",
                "executed_timestamp": "2024-05-01T10:00:05Z",
                "duration_ms": 4800
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_job_row() {
        let job = job();
        let row = job.row();

        assert_eq!(row.len(), Job::headers().len());
        assert_eq!(row[0], "1001");
        assert_eq!(row[1], "40");
        assert_eq!(row[3], "returned_success");
        assert_eq!(row[5], "2024-05-01 10:00:00");
        assert_eq!(row[6], "2024-05-01 10:00:05");
        assert_eq!(row[7], "4800");
        assert_eq!(row[8], "-");
    }

    #[test]
    fn test_pending_job_row() {
        let mut job = job();
        job.status = JobStatus::Pending;
        job.executed_timestamp = None;
        job.duration_ms = None;

        let row = job.row();
        assert_eq!(row[3], "pending");
        assert_eq!(row[6], "-");
        assert_eq!(row[7], "-");
    }

    #[tokio::test]
    async fn test_wait_times_out_on_unreachable_api() {
        // Nothing listens on port 1, so every poll fails and the timeout wins
        let client = HttpClient::new("http://127.0.0.1:1/api/v2").unwrap();
        let err = wait_for_job(&client, 5, 1, Some(1)).await.unwrap_err();
        assert!(err.to_string().contains("timed out after 1s"));
    }

    #[tokio::test]
    async fn test_wait_fails_when_job_errors() {
        let ctx = context(spawn_jobs_api().await);
        let err = run(wait(1), &ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "job 1 finished with status thrown_error");
    }

    #[tokio::test]
    async fn test_wait_succeeds_after_job_finishes() {
        let ctx = context(spawn_jobs_api().await);
        run(wait(2), &ctx).await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_fails_fast_on_missing_job() {
        let client = spawn_jobs_api().await;
        let err = tokio::time::timeout(
            Duration::from_secs(5),
            wait_for_job(&client, 77, 1, Some(30)),
        )
        .await
        .expect("missing job should not wait for the timeout")
        .unwrap_err();

        let client_err = err
            .downcast_ref::<metalcloud_client::ClientError>()
            .expect("client error");
        assert!(client_err.is_not_found());
    }
}
