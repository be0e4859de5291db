use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::{ResError, Result};

pub const DEFAULT_APP_BASE_URL: &str = "https://binaries.eveonline.com";
pub const DEFAULT_RESOURCE_BASE_URL: &str = "https://resources.eveonline.com";

/// 远端的两个独立主机。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// build 清单、app 索引、资源索引
    App,
    /// 按 hash 存放的资源文件
    Resource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoints {
    pub app_base: String,
    pub resource_base: String,
}

impl Default for RemoteEndpoints {
    fn default() -> Self {
        Self {
            app_base: DEFAULT_APP_BASE_URL.to_string(),
            resource_base: DEFAULT_RESOURCE_BASE_URL.to_string(),
        }
    }
}

impl RemoteEndpoints {
    pub fn new(app_base: impl Into<String>, resource_base: impl Into<String>) -> Self {
        Self {
            app_base: app_base.into(),
            resource_base: resource_base.into(),
        }
    }

    pub fn url(&self, endpoint: Endpoint, path: &str) -> String {
        let base = match endpoint {
            Endpoint::App => &self.app_base,
            Endpoint::Resource => &self.resource_base,
        };
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// 对 reqwest 的薄封装：统一拼接 URL，并把传输错误和非 2xx 响应都转成 `RemoteUnavailable`。
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoints: Arc<RemoteEndpoints>,
}

impl HttpTransport {
    pub fn new(endpoints: RemoteEndpoints) -> Result<Self> {
        Self::with_options(endpoints, None, None)
    }

    pub fn with_options(
        endpoints: RemoteEndpoints,
        user_agent: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ResError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self::with_client(client, endpoints))
    }

    pub fn with_client(client: reqwest::Client, endpoints: RemoteEndpoints) -> Self {
        Self {
            client,
            endpoints: Arc::new(endpoints),
        }
    }

    pub fn endpoints(&self) -> &RemoteEndpoints {
        &self.endpoints
    }

    pub fn url(&self, endpoint: Endpoint, path: &str) -> String {
        self.endpoints.url(endpoint, path)
    }

    /// 发起 GET 并确认状态码为 2xx，响应体留给调用方按需读取（文本或流式）。
    pub async fn open(&self, endpoint: Endpoint, path: &str) -> Result<reqwest::Response> {
        let url = self.url(endpoint, path);
        debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ResError::transport(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ResError::RemoteUnavailable {
                url,
                status: Some(status.as_u16()),
                reason: format!("HTTP {status}"),
                body: Some(body),
            });
        }
        Ok(response)
    }

    pub async fn get_text(&self, endpoint: Endpoint, path: &str) -> Result<String> {
        let response = self.open(endpoint, path).await?;
        let url = response.url().to_string();
        response
            .text()
            .await
            .map_err(|e| ResError::transport(&url, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slashes() {
        let endpoints = RemoteEndpoints::new("http://app.test/", "http://res.test");
        assert_eq!(
            endpoints.url(Endpoint::App, "/eveonline_42.txt"),
            "http://app.test/eveonline_42.txt"
        );
        assert_eq!(
            endpoints.url(Endpoint::Resource, "ab/abcd_ef"),
            "http://res.test/ab/abcd_ef"
        );
    }

    #[test]
    fn defaults_point_at_public_hosts() {
        let endpoints = RemoteEndpoints::default();
        assert_eq!(
            endpoints.url(Endpoint::App, "eveclient_TQ.json"),
            "https://binaries.eveonline.com/eveclient_TQ.json"
        );
    }
}
