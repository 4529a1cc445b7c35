use outline_api::{CreateAccessKeyRequest, OutlineClient, find_key_by_name};
use outline_values::{DataSize, EncryptionMethod, Port};

use crate::cli::{KeysCreateArgs, KeysDeleteArgs, KeysEditArgs, KeysListArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{format_bytes, render_access_keys, render_created_key};

/// How the user identified an access key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeySelector {
    Id(String),
    Name(String),
}

impl KeySelector {
    /// At least one of `--key-id` and `--key-name` must be non-empty. A
    /// non-empty name takes precedence over an id.
    pub(crate) fn from_flags(
        key_id: Option<String>,
        key_name: Option<String>,
        operation: &str,
    ) -> CliResult<Self> {
        let key_id = key_id.filter(|value| !value.is_empty());
        let key_name = key_name.filter(|value| !value.is_empty());
        match (key_id, key_name) {
            (_, Some(name)) => Ok(Self::Name(name)),
            (Some(id), None) => Ok(Self::Id(id)),
            (None, None) => Err(CliError::validation(format!(
                "either --key-id or --key-name must be specified for {operation} operation"
            ))),
        }
    }
}

/// Changes requested by `keys edit`, validated before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EditPlan {
    pub(crate) new_name: Option<String>,
    pub(crate) limit: LimitChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LimitChange {
    Keep,
    Set(DataSize),
    Remove,
}

impl EditPlan {
    pub(crate) fn from_flags(
        new_name: Option<String>,
        data_limit: Option<&str>,
        remove_limit: bool,
    ) -> CliResult<Self> {
        let new_name = new_name.filter(|value| !value.is_empty());
        let limit = data_limit
            .map(DataSize::parse)
            .transpose()?
            .filter(|size| !size.is_unset());

        // --remove-limit wins over --data-limit; the limit text is still validated.
        let limit = match (limit, remove_limit) {
            (_, true) => LimitChange::Remove,
            (Some(size), false) => LimitChange::Set(size),
            (None, false) => LimitChange::Keep,
        };

        if new_name.is_none() && limit == LimitChange::Keep {
            return Err(CliError::validation(
                "at least one of --new-name, --data-limit, or --remove-limit must be specified for edit operation",
            ));
        }
        Ok(Self { new_name, limit })
    }
}

/// Turn a selector into a key id. Names are resolved with one listing and
/// the first exact match wins.
pub(crate) async fn resolve_key_id(
    client: &OutlineClient,
    selector: KeySelector,
    server_name: &str,
) -> CliResult<String> {
    match selector {
        KeySelector::Id(id) => Ok(id),
        KeySelector::Name(name) => {
            let keys = client.list_access_keys().await?;
            find_key_by_name(&keys, &name)
                .map(|key| key.id.clone())
                .ok_or_else(|| {
                    tracing::error!(server = server_name, key_name = %name, "access key not found");
                    CliError::not_found(format!(
                        "access key with name '{name}' not found on server '{server_name}'"
                    ))
                })
        }
    }
}

pub(crate) async fn handle_keys_list(ctx: &AppContext, args: KeysListArgs) -> CliResult<()> {
    let KeysListArgs { server } = args;
    let client = ctx.client_for(&server)?;
    let keys = client.list_access_keys().await?;
    if keys.is_empty() {
        tracing::info!(server = %server.server_name, "no access keys found on server");
        return Ok(());
    }
    print!("{}", render_access_keys(&server.server_name, &keys));
    Ok(())
}

pub(crate) async fn handle_keys_create(ctx: &AppContext, args: KeysCreateArgs) -> CliResult<()> {
    let KeysCreateArgs {
        server,
        key_name,
        method,
        port,
        data_limit,
    } = args;

    let method = EncryptionMethod::parse(method.as_deref().unwrap_or_default())?;
    let port = port
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .map(Port::parse)
        .transpose()?;
    let limit = data_limit.as_deref().map(DataSize::parse).transpose()?;
    let request = CreateAccessKeyRequest::new(
        key_name.as_deref().unwrap_or_default(),
        Some(method),
        "",
        port,
        limit,
    );

    let client = ctx.client_for(&server)?;
    let key = client.create_access_key(&request).await?;
    tracing::info!(server = %server.server_name, key_id = %key.id, "access key created");
    print!("{}", render_created_key(&key));
    Ok(())
}

pub(crate) async fn handle_keys_delete(ctx: &AppContext, args: KeysDeleteArgs) -> CliResult<()> {
    let KeysDeleteArgs {
        server,
        key_id,
        key_name,
    } = args;
    let selector = KeySelector::from_flags(key_id, key_name, "delete")?;

    let client = ctx.client_for(&server)?;
    let id = resolve_key_id(&client, selector, &server.server_name).await?;
    client.delete_access_key(&id).await?;
    tracing::info!(server = %server.server_name, key_id = %id, "access key deleted");
    println!("Access key '{id}' deleted");
    Ok(())
}

pub(crate) async fn handle_keys_edit(ctx: &AppContext, args: KeysEditArgs) -> CliResult<()> {
    let KeysEditArgs {
        server,
        key_id,
        key_name,
        new_name,
        data_limit,
        remove_limit,
    } = args;
    let selector = KeySelector::from_flags(key_id, key_name, "edit")?;
    let plan = EditPlan::from_flags(new_name, data_limit.as_deref(), remove_limit)?;

    let client = ctx.client_for(&server)?;
    let id = resolve_key_id(&client, selector, &server.server_name).await?;

    if let Some(name) = &plan.new_name {
        client.rename_access_key(&id, name).await?;
        println!("Access key renamed successfully to: {name}");
    }
    match plan.limit {
        LimitChange::Keep => {}
        LimitChange::Set(size) => {
            client.set_access_key_data_limit(&id, size).await?;
            println!(
                "Data limit updated successfully to: {}",
                format_bytes(size.bytes())
            );
        }
        LimitChange::Remove => {
            client.remove_access_key_data_limit(&id).await?;
            println!("Data limit removed successfully");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use httpmock::prelude::*;
    use outline_config::ServerRegistry;
    use outline_values::{CertFingerprint, ServerUrl};
    use serde_json::json;
    use tempfile::TempDir;

    use crate::cli::ServerArgs;

    const HASH: &str = "1234567890ABCDEF1234567890ABCDEF1234567890ABCDEF1234567890ABCDEF";

    fn context_with(server: &MockServer) -> Result<(TempDir, AppContext)> {
        let dir = tempfile::tempdir()?;
        let mut registry = ServerRegistry::open(dir.path().join("config.yaml"))?;
        registry.add(
            "test",
            ServerUrl::parse(&format!("{}/secret", server.base_url()))?,
            CertFingerprint::parse(HASH)?,
        )?;
        Ok((dir, AppContext { registry }))
    }

    fn server_args() -> ServerArgs {
        ServerArgs {
            server_name: "test".to_string(),
        }
    }

    fn mock_two_keys(server: &MockServer) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(GET).path("/secret/access-keys");
            then.status(200).json_body(json!({
                "accessKeys": [
                    {"id": "1", "name": "A", "port": 443, "method": "aes-192-gcm"},
                    {"id": "2", "name": "B", "port": 443, "method": "aes-192-gcm"}
                ]
            }));
        })
    }

    #[test]
    fn selector_requires_exactly_one_identifier() -> Result<()> {
        assert_eq!(
            KeySelector::from_flags(Some("7".into()), None, "delete")?,
            KeySelector::Id("7".into())
        );
        assert_eq!(
            KeySelector::from_flags(Some(String::new()), Some("bob".into()), "delete")?,
            KeySelector::Name("bob".into())
        );

        let err = KeySelector::from_flags(None, None, "delete").expect_err("nothing given");
        assert_eq!(
            err.display_message(),
            "either --key-id or --key-name must be specified for delete operation"
        );
        assert_eq!(err.exit_code(), 2);
        Ok(())
    }

    #[test]
    fn selector_prefers_name_over_id() -> Result<()> {
        assert_eq!(
            KeySelector::from_flags(Some("7".into()), Some("bob".into()), "delete")?,
            KeySelector::Name("bob".into())
        );
        assert_eq!(
            KeySelector::from_flags(Some("7".into()), Some(String::new()), "edit")?,
            KeySelector::Id("7".into())
        );
        Ok(())
    }

    #[test]
    fn edit_plan_requires_a_change() -> Result<()> {
        let err = EditPlan::from_flags(None, None, false).expect_err("no change");
        assert_eq!(
            err.display_message(),
            "at least one of --new-name, --data-limit, or --remove-limit must be specified for edit operation"
        );
        assert!(EditPlan::from_flags(Some(String::new()), Some(""), false).is_err());

        let plan = EditPlan::from_flags(None, Some("1GB"), false)?;
        assert_eq!(plan.limit, LimitChange::Set(DataSize::from_bytes(1_000_000_000)));

        let plan = EditPlan::from_flags(Some("bob".into()), None, true)?;
        assert_eq!(plan.new_name.as_deref(), Some("bob"));
        assert_eq!(plan.limit, LimitChange::Remove);
        Ok(())
    }

    #[test]
    fn edit_plan_rejects_bad_limits() {
        let err = EditPlan::from_flags(None, Some("1ZB"), false).expect_err("unknown unit");
        assert_eq!(err.exit_code(), 2);
        let err = EditPlan::from_flags(None, Some("1ZB"), true).expect_err("still parsed");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn remove_limit_wins_over_data_limit() -> Result<()> {
        let plan = EditPlan::from_flags(None, Some("1GB"), true)?;
        assert_eq!(plan.limit, LimitChange::Remove);
        assert!(plan.new_name.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn delete_by_name_resolves_the_matching_id() -> Result<()> {
        let server = MockServer::start_async().await;
        let list = mock_two_keys(&server);
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/secret/access-keys/2");
            then.status(204);
        });

        let (_dir, ctx) = context_with(&server)?;
        handle_keys_delete(
            &ctx,
            KeysDeleteArgs {
                server: server_args(),
                key_id: None,
                key_name: Some("B".to_string()),
            },
        )
        .await?;
        list.assert();
        delete.assert();
        Ok(())
    }

    #[tokio::test]
    async fn delete_by_unknown_name_is_not_found() -> Result<()> {
        let server = MockServer::start_async().await;
        let list = mock_two_keys(&server);

        let (_dir, ctx) = context_with(&server)?;
        let err = handle_keys_delete(
            &ctx,
            KeysDeleteArgs {
                server: server_args(),
                key_id: None,
                key_name: Some("C".to_string()),
            },
        )
        .await
        .expect_err("no key named C");
        list.assert();
        assert!(matches!(err, CliError::NotFound(_)));
        assert_eq!(err.exit_code(), 4);
        assert_eq!(
            err.display_message(),
            "access key with name 'C' not found on server 'test'"
        );
        Ok(())
    }

    #[tokio::test]
    async fn delete_without_identifier_fails_before_any_request() -> Result<()> {
        let server = MockServer::start_async().await;
        let (_dir, ctx) = context_with(&server)?;
        let err = handle_keys_delete(
            &ctx,
            KeysDeleteArgs {
                server: server_args(),
                key_id: None,
                key_name: None,
            },
        )
        .await
        .expect_err("identifier required");
        assert_eq!(err.exit_code(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_server_is_not_found() -> Result<()> {
        let server = MockServer::start_async().await;
        let (_dir, ctx) = context_with(&server)?;
        let err = handle_keys_list(
            &ctx,
            KeysListArgs {
                server: ServerArgs {
                    server_name: "ghost".to_string(),
                },
            },
        )
        .await
        .expect_err("ghost is not registered");
        assert_eq!(err.display_message(), "server 'ghost' not found");
        assert_eq!(err.exit_code(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn create_sends_parsed_values() -> Result<()> {
        let server = MockServer::start_async().await;
        let create = server.mock(|when, then| {
            when.method(POST).path("/secret/access-keys").json_body(json!({
                "name": "alice",
                "method": "aes-192-gcm",
                "port": 8443,
                "limit": {"bytes": 500_000_000_u64}
            }));
            then.status(201).json_body(json!({
                "id": "k1",
                "name": "alice",
                "password": "p",
                "port": 8443,
                "method": "aes-192-gcm",
                "accessUrl": "ss://example"
            }));
        });

        let (_dir, ctx) = context_with(&server)?;
        handle_keys_create(
            &ctx,
            KeysCreateArgs {
                server: server_args(),
                key_name: Some("alice".to_string()),
                method: None,
                port: Some("8443".to_string()),
                data_limit: Some("500MB".to_string()),
            },
        )
        .await?;
        create.assert();
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_invalid_flags_locally() -> Result<()> {
        let server = MockServer::start_async().await;
        let (_dir, ctx) = context_with(&server)?;

        for (method, port, limit) in [
            (Some("rc4-md5"), None, None),
            (None, Some("70000"), None),
            (None, None, Some("-1GB")),
        ] {
            let err = handle_keys_create(
                &ctx,
                KeysCreateArgs {
                    server: server_args(),
                    key_name: None,
                    method: method.map(str::to_string),
                    port: port.map(str::to_string),
                    data_limit: limit.map(str::to_string),
                },
            )
            .await
            .expect_err("invalid flag");
            assert_eq!(err.exit_code(), 2);
        }
        Ok(())
    }

    #[tokio::test]
    async fn edit_by_id_renames_and_sets_limit() -> Result<()> {
        let server = MockServer::start_async().await;
        let rename = server.mock(|when, then| {
            when.method(PUT)
                .path("/secret/access-keys/7/name")
                .json_body(json!({"name": "bob"}));
            then.status(204);
        });
        let limit = server.mock(|when, then| {
            when.method(PUT)
                .path("/secret/access-keys/7/data-limit")
                .json_body(json!({"limit": {"bytes": 2_000_000_000_u64}}));
            then.status(204);
        });

        let (_dir, ctx) = context_with(&server)?;
        handle_keys_edit(
            &ctx,
            KeysEditArgs {
                server: server_args(),
                key_id: Some("7".to_string()),
                key_name: None,
                new_name: Some("bob".to_string()),
                data_limit: Some("2GB".to_string()),
                remove_limit: false,
            },
        )
        .await?;
        rename.assert();
        limit.assert();
        Ok(())
    }

    #[tokio::test]
    async fn edit_by_name_removes_limit() -> Result<()> {
        let server = MockServer::start_async().await;
        let list = mock_two_keys(&server);
        let remove = server.mock(|when, then| {
            when.method(DELETE).path("/secret/access-keys/1/data-limit");
            then.status(204);
        });

        let (_dir, ctx) = context_with(&server)?;
        handle_keys_edit(
            &ctx,
            KeysEditArgs {
                server: server_args(),
                key_id: None,
                key_name: Some("A".to_string()),
                new_name: None,
                data_limit: None,
                remove_limit: true,
            },
        )
        .await?;
        list.assert();
        remove.assert();
        Ok(())
    }
}
