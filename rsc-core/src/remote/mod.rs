//! 远端 build 清单、索引的拉取与按 build 的缓存，以及按 hash 下载资源。

mod cache;
mod fetcher;
mod http;

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::client::{BuildNumber, ClientInfo, IntoClientId};
use crate::codec::{ResourceIndex, parse_index};
use crate::error::{ResError, Result};

pub use cache::{IndexFetchCache, IndexResult};
pub use fetcher::RemoteHashFetcher;
pub use http::{
    DEFAULT_APP_BASE_URL, DEFAULT_RESOURCE_BASE_URL, Endpoint, HttpTransport, RemoteEndpoints,
};

/// app 索引中指向资源索引文件的条目路径。
pub const RESOURCE_INDEX_PATH: &str = "app:/resfileindex.txt";

#[derive(Debug, Deserialize)]
struct BuildManifest {
    build: ManifestBuild,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ManifestBuild {
    Number(u64),
    Text(String),
}

fn parse_build_manifest(url: &str, body: &str) -> Result<BuildNumber> {
    let invalid = |reason: String| ResError::InvalidManifest {
        url: url.to_string(),
        reason,
    };
    let manifest: BuildManifest = serde_json::from_str(body).map_err(|e| invalid(e.to_string()))?;
    match manifest.build {
        ManifestBuild::Number(build) => Ok(build),
        ManifestBuild::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| invalid(format!("build {text:?} is not an integer"))),
    }
}

/// 远端索引的按 build 缓存。
///
/// 克隆开销很小，所有克隆共享同一份缓存。
#[derive(Clone)]
pub struct RemoteIndexCache {
    transport: HttpTransport,
    app_indices: Arc<IndexFetchCache>,
    resource_indices: Arc<IndexFetchCache>,
}

impl RemoteIndexCache {
    pub fn new(transport: HttpTransport) -> Self {
        Self {
            transport,
            app_indices: Arc::new(IndexFetchCache::new("app")),
            resource_indices: Arc::new(IndexFetchCache::new("resource")),
        }
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    pub fn app_indices(&self) -> &IndexFetchCache {
        &self.app_indices
    }

    pub fn resource_indices(&self) -> &IndexFetchCache {
        &self.resource_indices
    }

    /// 从 `eveclient_{CLIENT}.json` 读取客户端当前的 build。
    pub async fn get_current_build(&self, client: impl IntoClientId) -> Result<BuildNumber> {
        let client = client.into_client_id()?;
        let path = client.manifest_file_name();
        info!(%client, %path, "get remote build");
        let body = self.transport.get_text(Endpoint::App, &path).await?;
        parse_build_manifest(&self.transport.url(Endpoint::App, &path), &body)
    }

    pub async fn get_app_index(&self, build: BuildNumber) -> Result<Arc<ResourceIndex>> {
        let this = self.clone();
        self.app_indices
            .get_or_fetch(build, move || async move { this.fetch_app_index(build).await })
            .await
    }

    pub async fn get_resource_index(&self, build: BuildNumber) -> Result<Arc<ResourceIndex>> {
        let this = self.clone();
        self.resource_indices
            .get_or_fetch(build, move || async move {
                this.fetch_resource_index(build).await
            })
            .await
    }

    pub async fn get_current_client_info(&self, client: impl IntoClientId) -> Result<ClientInfo> {
        let client = client.into_client_id()?;
        let build = self.get_current_build(client).await?;
        let index = self.get_resource_index(build).await?;
        Ok(ClientInfo {
            build,
            client,
            index,
        })
    }

    /// 清空两类索引缓存。库内部从不调用，留给上层应用决定何时使用。
    pub fn reset(&self) {
        self.app_indices.clear();
        self.resource_indices.clear();
    }

    async fn fetch_app_index(&self, build: BuildNumber) -> IndexResult {
        let path = format!("eveonline_{build}.txt");
        let text = self.transport.get_text(Endpoint::App, &path).await?;
        let index = parse_index(&text)?;
        info!(build, entries = index.len(), "fetched app index");
        Ok(Arc::new(index))
    }

    async fn fetch_resource_index(&self, build: BuildNumber) -> IndexResult {
        let app_index = self.get_app_index(build).await?;
        let entry =
            app_index
                .find(RESOURCE_INDEX_PATH)
                .ok_or_else(|| ResError::IndexEntryNotFound {
                    build,
                    path: RESOURCE_INDEX_PATH.to_string(),
                })?;
        let text = self
            .transport
            .get_text(Endpoint::App, &entry.hash_token)
            .await?;
        let index = parse_index(&text)?;
        info!(build, entries = index.len(), "fetched resource index");
        Ok(Arc::new(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_build_accepts_number_or_numeric_text() {
        assert_eq!(parse_build_manifest("u", r#"{"build": 2548491}"#).unwrap(), 2548491);
        assert_eq!(
            parse_build_manifest("u", r#"{"build": "2548491", "protected": true}"#).unwrap(),
            2548491
        );
    }

    #[test]
    fn manifest_without_integer_build_is_invalid() {
        for body in [r#"{"version": 1}"#, r#"{"build": "abc"}"#, r#"{"build": -4}"#, "<html>"] {
            assert!(
                matches!(
                    parse_build_manifest("http://app.test/eveclient_TQ.json", body),
                    Err(ResError::InvalidManifest { .. })
                ),
                "{body} should be rejected"
            );
        }
    }
}
