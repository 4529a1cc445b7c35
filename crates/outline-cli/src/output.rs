//! Plain-text renderers for command output.

use outline_api::{AccessKey, ServerInfo, TransferMetrics};
use outline_config::ServerEntry;
use outline_values::DataSize;

fn lines_to_text(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Human-readable byte count; zero renders as `0 B`.
pub(crate) fn format_bytes(bytes: u64) -> String {
    let size = DataSize::from_bytes(bytes);
    if size.is_unset() {
        "0 B".to_string()
    } else {
        size.to_string()
    }
}

pub(crate) fn render_server_list<'a>(
    servers: impl IntoIterator<Item = (&'a str, &'a ServerEntry)>,
) -> String {
    let mut lines = vec![
        "Configured servers:".to_string(),
        "===================".to_string(),
    ];
    for (name, entry) in servers {
        lines.push(format!("Name: {name}"));
        lines.push(format!("URL:  {}", entry.url));
        lines.push(format!("Cert: {}", entry.cert_sha256));
        lines.push("---".to_string());
    }
    lines_to_text(&lines)
}

pub(crate) fn render_server_entry(name: &str, entry: &ServerEntry) -> String {
    lines_to_text(&[
        format!("Server: {name}"),
        format!("URL:   {}", entry.url),
        format!("Cert:  {}", entry.cert_sha256),
    ])
}

pub(crate) fn render_server_info(info: &ServerInfo) -> String {
    let mut lines = vec![
        "API Info:".to_string(),
        format!("  Name:                    {}", info.name),
        format!("  Server ID:               {}", info.server_id),
        format!("  Version:                 {}", info.version),
        format!("  Metrics Enabled:         {}", info.metrics_enabled),
        format!("  Port for New Keys:       {}", info.port_for_new_access_keys),
        format!("  Hostname for Keys:       {}", info.hostname_for_access_keys),
    ];
    if let Some(limit) = info.access_key_data_limit {
        lines.push(format!(
            "  Access Key Data Limit:   {}",
            format_bytes(limit.bytes)
        ));
    }
    lines_to_text(&lines)
}

fn key_lines(key: &AccessKey, with_password: bool) -> Vec<String> {
    let mut lines = vec![
        format!("ID:         {}", key.id),
        format!("Name:       {}", key.name),
    ];
    if with_password {
        lines.push(format!("Password:   {}", key.password));
    }
    lines.push(format!("Port:       {}", key.port));
    lines.push(format!("Method:     {}", key.method));
    lines.push(format!("Access URL: {}", key.access_url));
    if let Some(limit) = key.data_limit {
        lines.push(format!("Data Limit: {}", format_bytes(limit.bytes)));
    }
    lines
}

pub(crate) fn render_access_keys(server_name: &str, keys: &[AccessKey]) -> String {
    let mut lines = vec![
        format!("Access keys for server '{server_name}':"),
        "==================================".to_string(),
    ];
    for key in keys {
        lines.extend(key_lines(key, false));
        lines.push("---".to_string());
    }
    lines_to_text(&lines)
}

pub(crate) fn render_created_key(key: &AccessKey) -> String {
    let mut lines = vec!["Access key created successfully!".to_string()];
    lines.extend(key_lines(key, true));
    lines_to_text(&lines)
}

pub(crate) fn render_metrics(server_name: &str, metrics: &TransferMetrics) -> String {
    let mut lines = vec![
        format!("Transfer metrics for server '{server_name}':"),
        "==================================".to_string(),
    ];
    for (key_id, bytes) in &metrics.bytes_transferred_by_user_id {
        lines.push(format!("User {key_id}: {}", format_bytes(*bytes)));
    }
    if metrics.bytes_transferred_by_user_id.is_empty() {
        lines.push("No transfer data available".to_string());
    } else {
        lines.push(format!("Total: {}", format_bytes(metrics.total_bytes())));
    }
    lines_to_text(&lines)
}
