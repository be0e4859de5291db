use std::path::{Path, PathBuf};

use tracing::info;

use crate::client::BuildNumber;
use crate::config::ResolverConfig;
use crate::error::{ResError, Result};
use crate::local::LocalResolver;
use crate::remote::{HttpTransport, RemoteHashFetcher, RemoteIndexCache};
use crate::store::{HashStore, StoreSource};

/// 由配置组装出的完整解析器：远端索引缓存 + 先本地后远端的资源存储。
#[derive(Clone)]
pub struct Resolver {
    indices: RemoteIndexCache,
    store: HashStore,
    shared_cache: Option<PathBuf>,
}

impl Resolver {
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let transport = HttpTransport::with_options(
            config.endpoints(),
            config.user_agent.as_deref(),
            config.request_timeout(),
        )?;
        Ok(Self::new(transport, config.shared_cache_path()))
    }

    pub fn new(transport: HttpTransport, shared_cache: Option<PathBuf>) -> Self {
        Self {
            indices: RemoteIndexCache::new(transport.clone()),
            store: HashStore::new(RemoteHashFetcher::new(transport)),
            shared_cache,
        }
    }

    pub fn with_shared_cache(mut self, shared_cache: Option<PathBuf>) -> Self {
        self.shared_cache = shared_cache;
        self
    }

    pub fn indices(&self) -> &RemoteIndexCache {
        &self.indices
    }

    pub fn store(&self) -> &HashStore {
        &self.store
    }

    pub fn shared_cache(&self) -> Option<&Path> {
        self.shared_cache.as_deref()
    }

    pub fn local(&self) -> Option<LocalResolver> {
        self.shared_cache.clone().map(LocalResolver::new)
    }

    pub async fn store_hash(&self, target: &Path, hash: &str) -> Result<StoreSource> {
        self.store
            .store_hash(target, hash, self.shared_cache())
            .await
    }

    /// 在 build 的资源索引里查找 `res_path`，再按其 hash 存到 `target`。
    pub async fn store_resource(
        &self,
        build: BuildNumber,
        res_path: &str,
        target: &Path,
    ) -> Result<StoreSource> {
        let index = self.indices.get_resource_index(build).await?;
        let entry = index
            .find(res_path)
            .ok_or_else(|| ResError::IndexEntryNotFound {
                build,
                path: res_path.to_lowercase(),
            })?;
        info!(build, res_path = %entry.resource_path, hash = %entry.hash_token, "storing resource");
        self.store_hash(target, &entry.hash_token).await
    }
}
