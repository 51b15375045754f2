//! Command-line argument definitions

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use metalcloud_api::{PowerCommand, ServerStatus};
use metalcloud_client::MATCH_ALL;

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "metalcloud-cli", version)]
#[command(about = "Manage servers, storage pools and jobs of a metalcloud deployment", long_about = None)]
pub struct Cli {
    /// API endpoint
    #[arg(long, env = "METALCLOUD_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// API key
    #[arg(long, env = "METALCLOUD_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Path to config file
    #[arg(long, env = "METALCLOUD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage servers
    #[command(subcommand)]
    Server(ServerCommand),

    /// Manage storage pools
    #[command(subcommand, visible_alias = "storage")]
    StoragePool(StoragePoolCommand),

    /// Inspect and control asynchronous jobs
    #[command(subcommand)]
    Job(JobCommand),
}

/// Search flags shared by list commands
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Filter, e.g. `status:available,used datacenter_name:us-west`
    #[arg(long, default_value = MATCH_ALL)]
    pub filter: String,

    /// Page number
    #[arg(long)]
    pub page: Option<u64>,

    /// Items per page
    #[arg(long)]
    pub per_page: Option<u64>,

    /// Refresh every SECS seconds until interrupted
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub watch: Option<u64>,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct ConfirmArgs {
    /// Skip the confirmation prompt
    #[arg(long)]
    pub autoconfirm: bool,
}

#[derive(Subcommand, Debug)]
pub enum ServerCommand {
    /// List servers
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show a server
    Get {
        /// Server id
        #[arg(long)]
        id: u64,

        /// Refresh every SECS seconds until interrupted
        #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
        watch: Option<u64>,
    },

    /// Power a server on, off, reset it or request a soft shutdown
    Power {
        /// Server id
        #[arg(long)]
        id: u64,

        /// One of: on, off, reset, soft
        #[arg(long)]
        command: PowerCommand,

        #[command(flatten)]
        confirm: ConfirmArgs,
    },

    /// Change server status or comments
    Edit {
        /// Server id
        #[arg(long)]
        id: u64,

        /// New status (available, used, cleaning, defective, ...)
        #[arg(long)]
        status: Option<ServerStatus>,

        /// New comments
        #[arg(long)]
        comments: Option<String>,

        /// JSON or YAML file with fields to change; flags take precedence
        #[arg(long, value_name = "PATH")]
        from_file: Option<PathBuf>,
    },

    /// Delete a server
    #[command(visible_alias = "rm")]
    Delete {
        /// Server id
        #[arg(long)]
        id: u64,

        #[command(flatten)]
        confirm: ConfirmArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum StoragePoolCommand {
    /// List storage pools
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show a storage pool
    Get {
        /// Storage pool id
        #[arg(long)]
        id: u64,
    },

    /// Register a storage pool from a JSON or YAML file
    Create {
        /// File describing the pool
        #[arg(long, value_name = "PATH")]
        from_file: PathBuf,
    },

    /// Delete a storage pool
    #[command(visible_alias = "rm")]
    Delete {
        /// Storage pool id
        #[arg(long)]
        id: u64,

        #[command(flatten)]
        confirm: ConfirmArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum JobCommand {
    /// List jobs
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show a job
    Get {
        /// Job id
        #[arg(long)]
        id: u64,

        /// Refresh every SECS seconds until interrupted
        #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
        watch: Option<u64>,
    },

    /// Re-queue a failed job
    Retry {
        /// Job id
        #[arg(long)]
        id: u64,

        #[command(flatten)]
        confirm: ConfirmArgs,
    },

    /// Stop a pending or running job
    Kill {
        /// Job id
        #[arg(long)]
        id: u64,

        #[command(flatten)]
        confirm: ConfirmArgs,
    },

    /// Wait until a job finishes; fails unless it succeeded
    Wait {
        /// Job id
        #[arg(long)]
        id: u64,

        /// Seconds between polls
        #[arg(long, value_name = "SECS", default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,

        /// Give up after SECS seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["metalcloud-cli"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("valid arguments")
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_defaults_to_match_all() {
        let cli = parse(&["server", "list"]);
        match cli.command {
            Commands::Server(ServerCommand::List(args)) => {
                assert_eq!(args.filter, "*");
                assert!(args.page.is_none());
                assert!(args.watch.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_list_with_filter_and_paging() {
        let cli = parse(&[
            "job",
            "ls",
            "--filter",
            "status:running,pending",
            "--page",
            "3",
            "--per-page",
            "20",
            "--watch",
            "5",
        ]);
        match cli.command {
            Commands::Job(JobCommand::List(args)) => {
                assert_eq!(args.filter, "status:running,pending");
                assert_eq!(args.page, Some(3));
                assert_eq!(args.per_page, Some(20));
                assert_eq!(args.watch, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_watch_must_be_positive() {
        let result = Cli::try_parse_from(["metalcloud-cli", "server", "list", "--watch", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["storage-pool", "get", "--id", "4", "-f", "yaml", "-vv"]);
        assert_eq!(cli.format, Some(OutputFormat::Yaml));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::StoragePool(StoragePoolCommand::Get { id: 4 })
        ));
    }

    #[test]
    fn test_storage_alias() {
        let cli = parse(&["storage", "list"]);
        assert!(matches!(
            cli.command,
            Commands::StoragePool(StoragePoolCommand::List(_))
        ));
    }

    #[test]
    fn test_power_command() {
        let cli = parse(&["server", "power", "--id", "12", "--command", "reset", "--autoconfirm"]);
        match cli.command {
            Commands::Server(ServerCommand::Power {
                id,
                command,
                confirm,
            }) => {
                assert_eq!(id, 12);
                assert_eq!(command, PowerCommand::Reset);
                assert!(confirm.autoconfirm);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_power_command() {
        let result = Cli::try_parse_from([
            "metalcloud-cli",
            "server",
            "power",
            "--id",
            "12",
            "--command",
            "hibernate",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_edit_status_parsed() {
        let cli = parse(&["server", "edit", "--id", "3", "--status", "defective"]);
        match cli.command {
            Commands::Server(ServerCommand::Edit { status, comments, .. }) => {
                assert_eq!(status, Some(ServerStatus::Defective));
                assert!(comments.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_id_required() {
        assert!(Cli::try_parse_from(["metalcloud-cli", "job", "get"]).is_err());
    }

    #[test]
    fn test_wait_defaults() {
        let cli = parse(&["job", "wait", "--id", "9"]);
        match cli.command {
            Commands::Job(JobCommand::Wait {
                id,
                interval,
                timeout,
            }) => {
                assert_eq!(id, 9);
                assert_eq!(interval, 2);
                assert!(timeout.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
