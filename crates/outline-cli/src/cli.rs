//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use outline_telemetry::{LogFormat, LoggingConfig, Verbosity, build_dispatch};
use tracing::instrument::WithSubscriber;

use crate::client::{AppContext, CliResult};
use crate::commands::keys::{
    handle_keys_create, handle_keys_delete, handle_keys_edit, handle_keys_list,
};
use crate::commands::servers::{
    handle_print_config, handle_server_add, handle_server_add_json, handle_server_delete,
    handle_server_get, handle_server_list, handle_server_metrics, handle_server_update,
    handle_version,
};

const EXAMPLES: &str = "Examples:
  outline-cli servers add myserver https://example.com/secret --cert-sha256 abc123def456...
  outline-cli servers add-json myserver '{\"apiUrl\":\"https://example.com/secret\",\"certSha256\":\"abc123def456...\"}'
  outline-cli keys create -s myserver -k mykey -l 1GB
  outline-cli keys list -s myserver
  outline-cli servers metrics -s myserver";

/// Parses CLI arguments, executes the requested command with logging scoped
/// to it, and returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let dispatch = build_dispatch(&LoggingConfig {
        verbosity: cli.verbosity,
        format: cli.log_format,
    });

    match execute(cli).with_subscriber(dispatch).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

pub(crate) async fn execute(cli: Cli) -> CliResult<()> {
    if matches!(cli.command, Command::Version) {
        handle_version();
        return Ok(());
    }

    let mut ctx = AppContext::open(cli.config)?;
    dispatch(&mut ctx, cli.command).await
}

pub(crate) async fn dispatch(ctx: &mut AppContext, command: Command) -> CliResult<()> {
    match command {
        Command::Version => {
            handle_version();
            Ok(())
        }
        Command::PrintConfig => handle_print_config(ctx),
        Command::Servers(servers) => match servers {
            ServersCommand::List => handle_server_list(ctx),
            ServersCommand::Add(args) => handle_server_add(ctx, args),
            ServersCommand::AddJson(args) => handle_server_add_json(ctx, args),
            ServersCommand::Get(args) => handle_server_get(ctx, args).await,
            ServersCommand::Update(args) => handle_server_update(ctx, args),
            ServersCommand::Delete(args) => handle_server_delete(ctx, args),
            ServersCommand::Metrics(args) => handle_server_metrics(ctx, args).await,
        },
        Command::Keys(keys) => match keys {
            KeysCommand::List(args) => handle_keys_list(ctx, args).await,
            KeysCommand::Create(args) => handle_keys_create(ctx, args).await,
            KeysCommand::Delete(args) => handle_keys_delete(ctx, args).await,
            KeysCommand::Edit(args) => handle_keys_edit(ctx, args).await,
        },
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "outline-cli",
    version,
    about = "Command-line interface for managing Outline VPN servers and access keys",
    after_help = EXAMPLES
)]
pub(crate) struct Cli {
    #[arg(
        short = 'v',
        long,
        global = true,
        env = "OUTLINE_CLI_VERBOSITY",
        default_value_t = Verbosity::Info,
        value_name = "error|warning|info|debug",
        help = "Verbosity level"
    )]
    pub(crate) verbosity: Verbosity,
    #[arg(
        long,
        global = true,
        env = "OUTLINE_CLI_LOG_FORMAT",
        default_value_t = LogFormat::Text,
        value_name = "text|json",
        help = "Log line format"
    )]
    pub(crate) log_format: LogFormat,
    #[arg(
        long,
        global = true,
        env = "OUTLINE_CLI_CONFIG",
        help = "Server registry file (default: ~/.config/outline-cli/config.yaml)"
    )]
    pub(crate) config: Option<PathBuf>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Show version information
    Version,
    /// Print configuration in YAML format
    PrintConfig,
    /// Manage Outline servers
    #[command(subcommand)]
    Servers(ServersCommand),
    /// Manage access keys
    #[command(subcommand)]
    Keys(KeysCommand),
}

#[derive(Subcommand, Debug)]
pub(crate) enum ServersCommand {
    /// List all configured servers
    List,
    /// Add a new server with individual parameters
    Add(ServerAddArgs),
    /// Add a new server from the installer's JSON output
    AddJson(ServerAddJsonArgs),
    /// Show server details
    Get(ServerNameArgs),
    /// Update server details
    Update(ServerUpdateArgs),
    /// Delete a server
    Delete(ServerNameArgs),
    /// View transfer metrics
    Metrics(ServerArgs),
}

#[derive(Subcommand, Debug)]
pub(crate) enum KeysCommand {
    /// List access keys
    List(KeysListArgs),
    /// Create a new access key
    Create(KeysCreateArgs),
    /// Delete an access key
    Delete(KeysDeleteArgs),
    /// Edit an existing access key
    Edit(KeysEditArgs),
}

/// Flag group naming the registered server a command talks to.
#[derive(Args, Debug, Clone)]
pub(crate) struct ServerArgs {
    #[arg(short = 's', long = "server-name", help = "Server name")]
    pub(crate) server_name: String,
}

#[derive(Args, Debug)]
pub(crate) struct ServerNameArgs {
    #[arg(help = "Server name")]
    pub(crate) name: String,
}

#[derive(Args, Debug)]
pub(crate) struct ServerAddArgs {
    #[arg(help = "Server name/label")]
    pub(crate) name: String,
    #[arg(help = "Server URL with secret path")]
    pub(crate) url: String,
    #[arg(long = "cert-sha256", help = "Certificate SHA256 hash")]
    pub(crate) cert_sha256: String,
}

#[derive(Args, Debug)]
pub(crate) struct ServerAddJsonArgs {
    #[arg(help = "Server name/label")]
    pub(crate) name: String,
    #[arg(help = "JSON input with apiUrl and certSha256 fields")]
    pub(crate) json: String,
}

#[derive(Args, Debug)]
pub(crate) struct ServerUpdateArgs {
    #[arg(help = "Server name")]
    pub(crate) name: String,
    #[arg(long, help = "New server URL")]
    pub(crate) url: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct KeysListArgs {
    #[command(flatten)]
    pub(crate) server: ServerArgs,
}

#[derive(Args, Debug)]
pub(crate) struct KeysCreateArgs {
    #[command(flatten)]
    pub(crate) server: ServerArgs,
    #[arg(short = 'k', long = "key-name", help = "Access key name")]
    pub(crate) key_name: Option<String>,
    #[arg(
        short = 'm',
        long,
        help = "Encryption method (aes-256-gcm, aes-192-gcm, aes-128-gcm, chacha20-poly1305)"
    )]
    pub(crate) method: Option<String>,
    #[arg(short = 'p', long, help = "Port number")]
    pub(crate) port: Option<String>,
    #[arg(
        short = 'l',
        long = "data-limit",
        help = "Data limit (e.g., '1GB', '500MB', '2TB')"
    )]
    pub(crate) data_limit: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct KeysDeleteArgs {
    #[command(flatten)]
    pub(crate) server: ServerArgs,
    #[arg(short = 'k', long = "key-id", help = "Access key ID")]
    pub(crate) key_id: Option<String>,
    #[arg(short = 'n', long = "key-name", help = "Access key name")]
    pub(crate) key_name: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct KeysEditArgs {
    #[command(flatten)]
    pub(crate) server: ServerArgs,
    #[arg(short = 'k', long = "key-id", help = "Access key ID")]
    pub(crate) key_id: Option<String>,
    #[arg(short = 'n', long = "key-name", help = "Access key name")]
    pub(crate) key_name: Option<String>,
    #[arg(long = "new-name", help = "New name for the access key")]
    pub(crate) new_name: Option<String>,
    #[arg(
        short = 'l',
        long = "data-limit",
        help = "New data limit (e.g., '1GB', '500MB', '2TB')"
    )]
    pub(crate) data_limit: Option<String>,
    #[arg(long = "remove-limit", help = "Remove the data limit from the key")]
    pub(crate) remove_limit: bool,
}
