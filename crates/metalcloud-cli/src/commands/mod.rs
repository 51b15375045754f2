//! Command handlers

pub mod job;
pub mod server;
pub mod storage;

use std::path::Path;

use color_eyre::eyre::{self, WrapErr};
use metalcloud_client::{HttpClient, SearchBuilder};
use serde::de::DeserializeOwned;

use crate::cli::{Commands, ListArgs};
use crate::output::{Printer, Tabular};
use crate::watch::watch;

/// Shared state for command handlers
#[derive(Debug, Clone)]
pub struct Context {
    pub client: HttpClient,
    pub printer: Printer,
}

/// Dispatch a parsed command
///
/// # Errors
/// Returns error if the API call, a prompt or rendering fails
pub async fn run(command: Commands, ctx: &Context) -> eyre::Result<()> {
    match command {
        Commands::Server(cmd) => server::run(cmd, ctx).await,
        Commands::StoragePool(cmd) => storage::run(cmd, ctx).await,
        Commands::Job(cmd) => job::run(cmd, ctx).await,
    }
}

/// Run a search built by `search` and print the page, once or under `--watch`
///
/// # Errors
/// Returns error if the search or rendering fails
pub async fn list<T, S>(args: ListArgs, ctx: &Context, search: S) -> eyre::Result<()>
where
    T: Tabular + DeserializeOwned + Send + 'static,
    S: Fn(&HttpClient) -> SearchBuilder<T> + Send + 'static,
{
    let client = ctx.client.clone();
    let fetch = move || {
        let mut builder = search(&client).filter(args.filter.clone());
        if let Some(page) = args.page {
            builder = builder.page(page);
        }
        if let Some(per_page) = args.per_page {
            builder = builder.per_page(per_page);
        }
        builder.send()
    };

    let printer = ctx.printer;
    match args.watch {
        Some(secs) => {
            watch(secs, printer.format(), fetch, |page| {
                printer.list(&mut std::io::stdout().lock(), &page.data, Some(&page.pagination))
            })
            .await
        }
        None => {
            let page = fetch().await?;
            printer.list(&mut std::io::stdout().lock(), &page.data, Some(&page.pagination))
        }
    }
}

/// Read a JSON or YAML document, chosen by file extension (YAML by default)
///
/// # Errors
/// Returns error if the file cannot be read or parsed
pub fn load_document<T: DeserializeOwned>(path: &Path) -> eyre::Result<T> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        serde_json::from_str(&content).map_err(eyre::Report::from)
    } else {
        serde_yaml::from_str(&content).map_err(eyre::Report::from)
    };

    parsed.wrap_err_with(|| format!("failed to parse {}", path.display()))
}
