use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::local::LocalResolver;
use crate::remote::RemoteHashFetcher;

/// 资源最终来自哪里。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSource {
    SharedCache,
    Remote,
}

/// 先本地后远端的存储策略。
#[derive(Debug, Clone)]
pub struct HashStore {
    fetcher: RemoteHashFetcher,
}

impl HashStore {
    pub fn new(fetcher: RemoteHashFetcher) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &RemoteHashFetcher {
        &self.fetcher
    }

    /// 把 `hash` 对应的资源写到 `target`。
    ///
    /// 1. 提供了 `shared_cache` 且目录有效时，尝试从 `ResFiles` 复制；
    /// 2. 没有提供、目录无效、或本地没有该 hash 时，一律改为远端下载；
    /// 3. 本地复制成功则不访问网络。
    pub async fn store_hash(
        &self,
        target: &Path,
        hash: &str,
        shared_cache: Option<&Path>,
    ) -> Result<StoreSource> {
        if let Some(root) = shared_cache {
            if LocalResolver::is_valid_root(root).await {
                if LocalResolver::new(root).copy_if_present(target, hash).await? {
                    info!(hash, target = %target.display(), "stored from shared cache");
                    return Ok(StoreSource::SharedCache);
                }
            } else {
                debug!(root = %root.display(), "shared cache root is not valid, skipping");
            }
        }

        self.fetcher.fetch(target, hash).await?;
        Ok(StoreSource::Remote)
    }
}
