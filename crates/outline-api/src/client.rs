//! Typed operations against one Outline management API.

use outline_values::{CertFingerprint, DataSize, ServerUrl};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    AccessKey, AccessKeysResponse, CreateAccessKeyRequest, DataLimit, ServerInfo, TransferMetrics,
};
use crate::tls::pinned_http_client;

const OP_SERVER_INFO: &str = "GET /server";
const OP_LIST_KEYS: &str = "GET /access-keys";
const OP_CREATE_KEY: &str = "POST /access-keys";
const OP_DELETE_KEY: &str = "DELETE /access-keys/{id}";
const OP_RENAME_KEY: &str = "PUT /access-keys/{id}/name";
const OP_SET_LIMIT: &str = "PUT /access-keys/{id}/data-limit";
const OP_REMOVE_LIMIT: &str = "DELETE /access-keys/{id}/data-limit";
const OP_METRICS: &str = "GET /metrics/transfer";

#[derive(Serialize)]
struct RenameRequest<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct DataLimitRequest {
    limit: DataLimit,
}

/// Handle bound to a single server's secret base URL.
///
/// Requests are relative to the base URL: its secret path prefix is kept and
/// each path segment is percent-encoded.
#[derive(Debug, Clone)]
pub struct OutlineClient {
    http: Client,
    base_url: Url,
}

impl OutlineClient {
    /// Client whose connections must present the certificate `fingerprint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pinned transport cannot be built.
    pub fn new(server_url: &ServerUrl, fingerprint: &CertFingerprint) -> ApiResult<Self> {
        let http = pinned_http_client(fingerprint)?;
        Ok(Self::with_http_client(http, server_url.url().clone()))
    }

    /// Client over a caller-supplied transport.
    #[must_use]
    pub const fn with_http_client(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch server metadata.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, any status other than 200, or an
    /// undecodable body.
    pub async fn server_info(&self) -> ApiResult<ServerInfo> {
        let url = self.endpoint(&["server"])?;
        let response = self
            .send(OP_SERVER_INFO, self.http.get(url), StatusCode::OK)
            .await?;
        decode(OP_SERVER_INFO, response).await
    }

    /// List every access key in server order.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, any status other than 200, or an
    /// undecodable body.
    pub async fn list_access_keys(&self) -> ApiResult<Vec<AccessKey>> {
        let url = self.endpoint(&["access-keys"])?;
        let response = self
            .send(OP_LIST_KEYS, self.http.get(url), StatusCode::OK)
            .await?;
        let payload: AccessKeysResponse = decode(OP_LIST_KEYS, response).await?;
        Ok(payload.access_keys)
    }

    /// Create an access key.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, any status other than 201, or an
    /// undecodable body.
    pub async fn create_access_key(
        &self,
        request: &CreateAccessKeyRequest,
    ) -> ApiResult<AccessKey> {
        let url = self.endpoint(&["access-keys"])?;
        let response = self
            .send(
                OP_CREATE_KEY,
                self.http.post(url).json(request),
                StatusCode::CREATED,
            )
            .await?;
        decode(OP_CREATE_KEY, response).await
    }

    /// Delete the key with the given id.
    ///
    /// # Errors
    ///
    /// Fails on transport errors or any status other than 204.
    pub async fn delete_access_key(&self, id: &str) -> ApiResult<()> {
        let url = self.endpoint(&["access-keys", id])?;
        self.send(OP_DELETE_KEY, self.http.delete(url), StatusCode::NO_CONTENT)
            .await?;
        Ok(())
    }

    /// Rename the key with the given id.
    ///
    /// # Errors
    ///
    /// Fails on transport errors or any status other than 204.
    pub async fn rename_access_key(&self, id: &str, name: &str) -> ApiResult<()> {
        let url = self.endpoint(&["access-keys", id, "name"])?;
        self.send(
            OP_RENAME_KEY,
            self.http.put(url).json(&RenameRequest { name }),
            StatusCode::NO_CONTENT,
        )
        .await?;
        Ok(())
    }

    /// Set the byte quota of the key with the given id.
    ///
    /// # Errors
    ///
    /// Fails on transport errors or any status other than 204.
    pub async fn set_access_key_data_limit(&self, id: &str, limit: DataSize) -> ApiResult<()> {
        let url = self.endpoint(&["access-keys", id, "data-limit"])?;
        let body = DataLimitRequest {
            limit: DataLimit::from(limit),
        };
        self.send(
            OP_SET_LIMIT,
            self.http.put(url).json(&body),
            StatusCode::NO_CONTENT,
        )
        .await?;
        Ok(())
    }

    /// Remove the byte quota of the key with the given id.
    ///
    /// # Errors
    ///
    /// Fails on transport errors or any status other than 204.
    pub async fn remove_access_key_data_limit(&self, id: &str) -> ApiResult<()> {
        let url = self.endpoint(&["access-keys", id, "data-limit"])?;
        self.send(OP_REMOVE_LIMIT, self.http.delete(url), StatusCode::NO_CONTENT)
            .await?;
        Ok(())
    }

    /// Fetch bytes transferred per key.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, any status other than 200, or an
    /// undecodable body.
    pub async fn transfer_metrics(&self) -> ApiResult<TransferMetrics> {
        let url = self.endpoint(&["metrics", "transfer"])?;
        let response = self
            .send(OP_METRICS, self.http.get(url), StatusCode::OK)
            .await?;
        decode(OP_METRICS, response).await
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        expected: StatusCode,
    ) -> ApiResult<Response> {
        tracing::debug!(
            operation,
            server = %self.base_url.host_str().unwrap_or_default(),
            "sending request"
        );
        let response = request.send().await.map_err(|source| {
            tracing::error!(operation, error = %source, "request failed");
            ApiError::Transport { operation, source }
        })?;

        let status = response.status();
        if status == expected {
            tracing::debug!(operation, status = status.as_u16(), "request succeeded");
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(source) => {
                tracing::warn!(operation, error = %source, "failed to read error response body");
                format!("failed to read response body: {source}")
            }
        };
        tracing::error!(
            operation,
            status = status.as_u16(),
            body = %body,
            "unexpected status from server"
        );
        Err(ApiError::UnexpectedStatus {
            operation,
            status,
            body,
        })
    }
}

async fn decode<T: DeserializeOwned>(operation: &'static str, response: Response) -> ApiResult<T> {
    response.json::<T>().await.map_err(|source| {
        tracing::error!(operation, error = %source, "failed to decode response");
        ApiError::Decode { operation, source }
    })
}
