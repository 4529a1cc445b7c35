use outline_values::{CertFingerprint, ServerUrl};

use crate::cli::{ServerAddArgs, ServerAddJsonArgs, ServerArgs, ServerNameArgs, ServerUpdateArgs};
use crate::client::{AppContext, CliResult};
use crate::output::{render_metrics, render_server_entry, render_server_info, render_server_list};

pub(crate) fn handle_version() {
    println!("outline-cli version {}", env!("CARGO_PKG_VERSION"));
}

pub(crate) fn handle_print_config(ctx: &AppContext) -> CliResult<()> {
    print!("{}", ctx.registry.to_yaml()?);
    Ok(())
}

pub(crate) fn handle_server_list(ctx: &AppContext) -> CliResult<()> {
    if ctx.registry.is_empty() {
        tracing::info!("no servers configured");
        return Ok(());
    }
    print!("{}", render_server_list(ctx.registry.list_all()));
    Ok(())
}

pub(crate) fn handle_server_add(ctx: &mut AppContext, args: ServerAddArgs) -> CliResult<()> {
    let ServerAddArgs {
        name,
        url,
        cert_sha256,
    } = args;
    let url = ServerUrl::parse(&url)?;
    let cert_sha256 = CertFingerprint::parse(&cert_sha256)?;
    ctx.registry.add(&name, url, cert_sha256)?;
    println!("Server '{name}' added");
    Ok(())
}

pub(crate) fn handle_server_add_json(
    ctx: &mut AppContext,
    args: ServerAddJsonArgs,
) -> CliResult<()> {
    let ServerAddJsonArgs { name, json } = args;
    ctx.registry.add_from_json(&name, &json)?;
    println!("Server '{name}' added");
    Ok(())
}

/// Print the registry entry, then whatever the server reports about itself.
/// An unreachable server only produces a warning.
pub(crate) async fn handle_server_get(ctx: &AppContext, args: ServerNameArgs) -> CliResult<()> {
    let entry = ctx.registry.lookup(&args.name)?;
    print!("{}", render_server_entry(&args.name, entry));

    let server = ServerArgs {
        server_name: args.name,
    };
    let info = match ctx.client_for(&server) {
        Ok(client) => client.server_info().await.map_err(|err| err.to_string()),
        Err(err) => Err(err.display_message()),
    };
    match info {
        Ok(info) => print!("{}", render_server_info(&info)),
        Err(message) => {
            tracing::warn!(
                server = %server.server_name,
                error = %message,
                "failed to get server info from API"
            );
        }
    }
    Ok(())
}

pub(crate) fn handle_server_update(ctx: &mut AppContext, args: ServerUpdateArgs) -> CliResult<()> {
    let ServerUpdateArgs { name, url } = args;
    match url.as_deref().map(str::trim).filter(|url| !url.is_empty()) {
        Some(url) => {
            let url = ServerUrl::parse(url)?;
            ctx.registry.update_url(&name, url)?;
            println!("Server '{name}' updated");
        }
        None => {
            ctx.registry.lookup(&name)?;
            tracing::info!(name = %name, "nothing to update");
        }
    }
    Ok(())
}

pub(crate) fn handle_server_delete(ctx: &mut AppContext, args: ServerNameArgs) -> CliResult<()> {
    let ServerNameArgs { name } = args;
    ctx.registry.delete(&name)?;
    println!("Server '{name}' deleted");
    Ok(())
}

pub(crate) async fn handle_server_metrics(ctx: &AppContext, args: ServerArgs) -> CliResult<()> {
    let client = ctx.client_for(&args)?;
    let metrics = client.transfer_metrics().await?;
    let ServerArgs { server_name } = args;
    print!("{}", render_metrics(&server_name, &metrics));
    Ok(())
}
