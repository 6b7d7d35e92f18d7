//! HTTPサービング層クライアント
//!
//! マネージドサービング層のREST配置に従う:
//!
//! - invoke: `POST {base_url}/endpoints/{name}/invocations`
//! - describe: `GET {base_url}/endpoints/{name}` → `{"EndpointStatus": "InService", ...}`

use super::{InvocationClient, StatusClient, IMAGE_CONTENT_TYPE};
use crate::common::error::{BenchError, BenchResult, CommonError};
use crate::common::truncate_chars;
use crate::types::{EndpointIdentity, EndpointStatus};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// エラー応答ボディを保持する最大文字数
const MAX_ERROR_BODY_CHARS: usize = 512;

/// リージョンからデフォルトのベースURLを組み立てる
pub fn default_base_url(region: &str) -> String {
    format!("https://runtime.sagemaker.{}.amazonaws.com", region)
}

#[derive(Debug, Deserialize)]
struct DescribeEndpointResponse {
    #[serde(rename = "EndpointStatus")]
    endpoint_status: String,
}

/// HTTP経由のサービング層クライアント
#[derive(Clone)]
pub struct HttpServingClient {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
    describe_timeout: Duration,
}

impl HttpServingClient {
    /// 新しいクライアントを作成
    ///
    /// 接続プールは呼び出し・状態照会で共有する。
    /// ベースURLはパス区切りを持てる絶対URLでなければならない。
    pub fn new(
        base_url: impl Into<String>,
        api_token: Option<String>,
        describe_timeout: Duration,
    ) -> BenchResult<Self> {
        let base_url = parse_base_url(&base_url.into())?;
        let client = Client::builder()
            .build()
            .map_err(|e| BenchError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_token,
            describe_timeout,
        })
    }

    /// `{base_url}/endpoints/{name}[/{tail}]`（名前はパスセグメントとしてエンコードする）
    fn endpoint_url(&self, endpoint: &EndpointIdentity, tail: Option<&str>) -> BenchResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                CommonError::Config(format!("base URL cannot be a base: {}", self.base_url))
            })?;
            segments.pop_if_empty().push("endpoints").push(&endpoint.name);
            if let Some(tail) = tail {
                segments.push(tail);
            }
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn parse_base_url(raw: &str) -> BenchResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| CommonError::Config(format!("invalid base URL '{}': {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(CommonError::Config(format!("base URL cannot be a base: {}", raw)).into());
    }
    Ok(url)
}

async fn ensure_success(response: Response) -> BenchResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BenchError::UpstreamStatus {
        status: status.as_u16(),
        message: truncate_chars(body.trim(), MAX_ERROR_BODY_CHARS),
    })
}

#[async_trait]
impl InvocationClient for HttpServingClient {
    async fn invoke(
        &self,
        endpoint: &EndpointIdentity,
        body: Vec<u8>,
        timeout: Duration,
    ) -> BenchResult<Vec<u8>> {
        let url = self.endpoint_url(endpoint, Some("invocations"))?;
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, IMAGE_CONTENT_TYPE)
            .body(body)
            .timeout(timeout);

        let response = self.authorize(request).send().await?;
        let response = ensure_success(response).await?;
        let bytes = response.bytes().await?;

        debug!(
            endpoint = %endpoint.name,
            response_bytes = bytes.len(),
            "Invocation response received"
        );
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl StatusClient for HttpServingClient {
    async fn describe(&self, endpoint: &EndpointIdentity) -> BenchResult<EndpointStatus> {
        let request = self
            .client
            .get(self.endpoint_url(endpoint, None)?)
            .timeout(self.describe_timeout);

        let response = self.authorize(request).send().await?;
        let response = ensure_success(response).await?;
        let body: DescribeEndpointResponse = response.json().await?;

        match body.endpoint_status.parse::<EndpointStatus>() {
            Ok(status) => Ok(status),
            Err(never) => match never {},
        }
    }
}
