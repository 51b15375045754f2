//! `storage-pool` subcommands

use color_eyre::eyre;
use metalcloud_api::{StoragePool, StoragePoolCreateRequest};
use metalcloud_client::HttpClient;

use crate::cli::StoragePoolCommand;
use crate::commands::{Context, list, load_document};
use crate::confirm::confirm;
use crate::output::Tabular;

fn yes_no(flag: bool) -> String {
    let text = if flag { "yes" } else { "no" };
    text.to_string()
}

impl Tabular for StoragePool {
    const NOUN: &'static str = "storage pool";

    fn headers() -> &'static [&'static str] {
        &[
            "ID",
            "NAME",
            "DATACENTER",
            "DRIVER",
            "TECHNOLOGY",
            "TYPE",
            "STATUS",
            "ENDPOINT",
            "USED (MiB)",
            "TOTAL (MiB)",
            "USAGE",
            "MAINTENANCE",
            "EXPERIMENTAL",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.storage_pool_id.to_string(),
            self.storage_pool_name.clone(),
            self.datacenter_name.clone(),
            self.storage_driver.clone(),
            self.storage_technology.clone(),
            self.storage_type.clone(),
            self.storage_pool_status.clone(),
            self.storage_pool_endpoint.clone(),
            self.storage_capacity_used_mbytes.to_string(),
            self.storage_capacity_total_mbytes.to_string(),
            self.usage_percent()
                .map_or_else(|| "-".to_string(), |p| format!("{p:.1}%")),
            yes_no(self.storage_pool_in_maintenance),
            yes_no(self.storage_pool_is_experimental),
        ]
    }
}

pub async fn run(cmd: StoragePoolCommand, ctx: &Context) -> eyre::Result<()> {
    match cmd {
        StoragePoolCommand::List(args) => list(args, ctx, HttpClient::search_storage_pools).await,
        StoragePoolCommand::Get { id } => {
            let pool = ctx.client.get_storage_pool(id).await?;
            ctx.printer.item(&mut std::io::stdout().lock(), &pool)
        }
        StoragePoolCommand::Create { from_file } => {
            let request: StoragePoolCreateRequest = load_document(&from_file)?;
            tracing::debug!(?request, "creating storage pool");
            let pool = ctx.client.create_storage_pool(&request).await?;
            ctx.printer.outcome(
                &mut std::io::stdout().lock(),
                &format!(
                    "Storage pool '{}' created with id {}",
                    pool.storage_pool_name, pool.storage_pool_id
                ),
                &pool,
            )
        }
        StoragePoolCommand::Delete { id, confirm: flags } => {
            if !confirm(&format!("delete storage pool {id}"), flags.autoconfirm)? {
                return ctx.printer.cancelled(&mut std::io::stdout().lock());
            }
            ctx.client.delete_storage_pool(id).await?;
            ctx.printer.message(
                &mut std::io::stdout().lock(),
                &format!("Storage pool {id} deleted"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_pool_row() {
        let pool = StoragePool {
            storage_pool_id: 3,
            storage_pool_name: "iscsi-a".into(),
            datacenter_name: "us-west".into(),
            storage_driver: "truenas".into(),
            storage_technology: "iscsi".into(),
            storage_type: "ssd".into(),
            storage_pool_status: "active".into(),
            storage_pool_endpoint: "https://10.0.0.5".into(),
            storage_capacity_total_mbytes: 1000,
            storage_capacity_used_mbytes: 125,
            storage_pool_in_maintenance: true,
            storage_pool_is_experimental: false,
        };

        let row = pool.row();
        assert_eq!(row.len(), StoragePool::headers().len());
        assert_eq!(row[10], "12.5%");
        assert_eq!(row[11], "yes");
        assert_eq!(row[12], "no");
    }
}
