//! `server` subcommands

use color_eyre::eyre::{self, bail};
use metalcloud_api::{Server, ServerEditRequest};
use metalcloud_client::HttpClient;

use crate::cli::ServerCommand;
use crate::commands::{Context, list, load_document};
use crate::confirm::confirm;
use crate::output::{Tabular, or_dash};
use crate::watch::watch;

impl Tabular for Server {
    const NOUN: &'static str = "server";

    fn headers() -> &'static [&'static str] {
        &[
            "ID",
            "SERIAL",
            "VENDOR",
            "PRODUCT",
            "DATACENTER",
            "STATUS",
            "POWER",
            "CPUS",
            "RAM (GB)",
            "DISKS",
            "COMMENTS",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.server_id.to_string(),
            self.server_serial_number.clone(),
            self.server_vendor.clone(),
            self.server_product_name.clone(),
            self.datacenter_name.clone(),
            self.server_status.to_string(),
            self.server_power_status.to_string(),
            self.server_processor_count.to_string(),
            self.server_ram_gbytes.to_string(),
            self.server_disk_count.to_string(),
            or_dash(self.server_comments.as_deref()),
        ]
    }
}

pub async fn run(cmd: ServerCommand, ctx: &Context) -> eyre::Result<()> {
    match cmd {
        ServerCommand::List(args) => list(args, ctx, HttpClient::search_servers).await,
        ServerCommand::Get { id, watch: None } => {
            let server = ctx.client.get_server(id).await?;
            ctx.printer.item(&mut std::io::stdout().lock(), &server)
        }
        ServerCommand::Get {
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
                    async move { client.get_server(id).await }
                },
                |server| printer.item(&mut std::io::stdout().lock(), server),
            )
            .await
        }
        ServerCommand::Power {
            id,
            command,
            confirm: flags,
        } => {
            let action = format!("send power command '{command}' to server {id}");
            if !confirm(&action, flags.autoconfirm)? {
                return ctx.printer.cancelled(&mut std::io::stdout().lock());
            }
            let job = ctx.client.server_power(id, command).await?;
            tracing::info!(server = id, job = job.job_id, %command, "power command queued");
            ctx.printer.outcome(
                &mut std::io::stdout().lock(),
                &format!("Power command '{command}' queued for server {id} as job {}", job.job_id),
                &job,
            )
        }
        ServerCommand::Edit {
            id,
            status,
            comments,
            from_file,
        } => {
            let base = match &from_file {
                Some(path) => load_document::<ServerEditRequest>(path)?,
                None => ServerEditRequest::default(),
            };
            let request = base.merge(ServerEditRequest {
                server_status: status,
                server_comments: comments,
            });
            if request.is_empty() {
                bail!("nothing to change; pass --status, --comments or --from-file");
            }

            let server = ctx.client.edit_server(id, &request).await?;
            ctx.printer.outcome(
                &mut std::io::stdout().lock(),
                &format!("Server {id} updated"),
                &server,
            )
        }
        ServerCommand::Delete { id, confirm: flags } => {
            if !confirm(&format!("delete server {id}"), flags.autoconfirm)? {
                return ctx.printer.cancelled(&mut std::io::stdout().lock());
            }
            ctx.client.delete_server(id).await?;
            ctx.printer
                .message(&mut std::io::stdout().lock(), &format!("Server {id} deleted"))
        }
    }
}
