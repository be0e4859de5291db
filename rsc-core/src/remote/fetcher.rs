use std::path::Path;

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::http::{Endpoint, HttpTransport};
use crate::error::{ResError, Result};
use crate::io_utils;

/// 从资源 CDN 按 hash 下载单个文件。
#[derive(Debug, Clone)]
pub struct RemoteHashFetcher {
    transport: HttpTransport,
}

impl RemoteHashFetcher {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// 把 `GET /{hash}` 的响应体流式写入 `target`。
    ///
    /// 先写同目录下的临时文件，flush + fsync 后再 rename，失败时临时文件会被删除，
    /// 因此 `target` 不会出现写了一半的内容。
    pub async fn fetch(&self, target: &Path, hash: &str) -> Result<u64> {
        io_utils::hash_relative_path(hash)?;
        let mut response = self.transport.open(Endpoint::Resource, hash).await?;
        let url = response.url().to_string();

        let partial = io_utils::partial_path(target);
        let mut file = File::create(&partial)
            .await
            .map_err(|e| ResError::write_failed(target, e))?;

        let mut written = 0u64;
        let streamed = async {
            while let Some(chunk) = response
                .chunk()
                .await
                .map_err(|e| ResError::transport(&url, e))?
            {
                file.write_all(&chunk)
                    .await
                    .map_err(|e| ResError::write_failed(target, e))?;
                written += chunk.len() as u64;
            }
            file.flush()
                .await
                .map_err(|e| ResError::write_failed(target, e))?;
            file.sync_all()
                .await
                .map_err(|e| ResError::write_failed(target, e))
        }
        .await;
        drop(file);

        if let Err(err) = streamed {
            io_utils::discard_partial(&partial).await;
            return Err(err);
        }
        io_utils::commit_partial(&partial, target).await?;

        info!(hash, bytes = written, target = %target.display(), "stored remote resource");
        Ok(written)
    }
}
