//! 已安装客户端的本地 SharedCache 读取。

mod layout;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::{BuildNumber, ClientInfo, IntoClientId};
use crate::codec::{ResourceIndex, parse_index, parse_key_value_text};
use crate::error::Result;
use crate::io_utils;

pub use layout::{RES_FILE_INDEX, RES_FILES_DIR, START_INI, SharedCacheLayout};

const BUILD_KEY: &str = "build";

#[derive(Debug, Clone)]
pub struct LocalResolver {
    layout: SharedCacheLayout,
}

impl LocalResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: SharedCacheLayout::new(root),
        }
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn layout(&self) -> &SharedCacheLayout {
        &self.layout
    }

    /// 根目录非空且其下存在 `ResFiles` 目录。
    pub async fn is_valid_root(root: &Path) -> bool {
        if root.as_os_str().is_empty() {
            return false;
        }
        io_utils::is_dir(&root.join(RES_FILES_DIR)).await
    }

    pub async fn is_valid(&self) -> bool {
        Self::is_valid_root(self.root()).await
    }

    /// 读取 `{client}/start.ini` 中的 build；文件或字段缺失时返回 `None`。
    pub async fn get_build(&self, client: impl IntoClientId) -> Result<Option<BuildNumber>> {
        let client = client.into_client_id()?;
        let path = self.layout.start_ini(client);
        let Some(text) = io_utils::read_optional_text(&path).await? else {
            debug!(%client, path = %path.display(), "no local start.ini");
            return Ok(None);
        };

        let values = parse_key_value_text(&text);
        let build = match values.get(BUILD_KEY) {
            Some(value) => {
                let build = value.as_u64();
                if build.is_none() {
                    warn!(%client, value = ?value, "ignoring non-integer build in start.ini");
                }
                build
            }
            None => None,
        };
        Ok(build)
    }

    pub async fn get_resource_index(
        &self,
        client: impl IntoClientId,
    ) -> Result<Option<ResourceIndex>> {
        let client = client.into_client_id()?;
        read_index(&self.layout.res_file_index(client)).await
    }

    pub async fn get_app_index(&self, client: impl IntoClientId) -> Result<Option<ResourceIndex>> {
        let client = client.into_client_id()?;
        read_index(&self.layout.app_index(client)).await
    }

    /// build 和资源索引都存在时才返回 `Some`。
    pub async fn get_client_info(&self, client: impl IntoClientId) -> Result<Option<ClientInfo>> {
        let client = client.into_client_id()?;
        let Some(build) = self.get_build(client).await? else {
            return Ok(None);
        };
        let Some(index) = self.get_resource_index(client).await? else {
            debug!(%client, build, "local build has no resource index");
            return Ok(None);
        };
        Ok(Some(ClientInfo {
            build,
            client,
            index: Arc::new(index),
        }))
    }

    /// `ResFiles/{hash}` 存在时完整复制到 `target` 并返回 true；不存在时返回 false 且不产生任何副作用。
    pub async fn copy_if_present(&self, target: &Path, hash: &str) -> Result<bool> {
        let src = self.layout.res_file(io_utils::hash_relative_path(hash)?);
        if !io_utils::exists(&src).await {
            debug!(hash, root = %self.root().display(), "local miss");
            return Ok(false);
        }
        let bytes = io_utils::copy_atomic(&src, target).await?;
        debug!(hash, bytes, target = %target.display(), "local hit");
        Ok(true)
    }
}

async fn read_index(path: &Path) -> Result<Option<ResourceIndex>> {
    match io_utils::read_optional_text(path).await? {
        Some(text) => parse_index(&text).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientId;
    use crate::error::ResError;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    const RES_INDEX: &str = "res:/ui/a.png,ab/ab01_aa,,10\nres:/ui/B.png,ab/ab02_bb,,20\n";
    const APP_INDEX: &str = "app:/resfileindex.txt,a9/a9ff_cc,,30\napp:/bin/exefile.exe,ee/ee00_dd,,40\n";

    fn shared_cache() -> TempDir {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("ResFiles/ab")).unwrap();
        fs::create_dir_all(root.join("tq")).unwrap();
        fs::write(root.join("ResFiles/ab/ab01_aa"), b"png bytes").unwrap();
        fs::write(root.join("tq/start.ini"), "[main]\nbuild=2548491\nserver=tranquility\n").unwrap();
        fs::write(root.join("tq/resfileindex.txt"), RES_INDEX).unwrap();
        fs::write(root.join("index_tq.txt"), APP_INDEX).unwrap();
        tmp
    }

    #[tokio::test]
    async fn valid_root_requires_res_files_dir() {
        let tmp = shared_cache();
        assert!(LocalResolver::is_valid_root(tmp.path()).await);
        assert!(!LocalResolver::is_valid_root(Path::new("")).await);

        let empty = tempdir().unwrap();
        assert!(!LocalResolver::is_valid_root(empty.path()).await);

        fs::write(empty.path().join("ResFiles"), b"not a dir").unwrap();
        assert!(!LocalResolver::is_valid_root(empty.path()).await);
    }

    #[tokio::test]
    async fn reads_build_and_indices() {
        let tmp = shared_cache();
        let local = LocalResolver::new(tmp.path());

        assert_eq!(local.get_build("TQ").await.unwrap(), Some(2548491));

        let res = local.get_resource_index(ClientId::Tranquility).await.unwrap().unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(res.find("res:/ui/b.png").map(|e| e.size), Some(20));

        let app = local.get_app_index("tq").await.unwrap().unwrap();
        assert_eq!(app.entries()[0].resource_path, "app:/bin/exefile.exe");
    }

    #[tokio::test]
    async fn missing_files_are_absent_not_errors() {
        let tmp = shared_cache();
        let local = LocalResolver::new(tmp.path());

        assert_eq!(local.get_build("sisi").await.unwrap(), None);
        assert!(local.get_resource_index("sisi").await.unwrap().is_none());
        assert!(local.get_app_index("duality").await.unwrap().is_none());
        assert!(local.get_client_info("sisi").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn start_ini_without_build_is_absent() {
        let tmp = shared_cache();
        fs::create_dir_all(tmp.path().join("chaos")).unwrap();
        fs::write(tmp.path().join("chaos/start.ini"), "server=chaos\n").unwrap();
        fs::write(tmp.path().join("chaos/resfileindex.txt"), RES_INDEX).unwrap();

        let local = LocalResolver::new(tmp.path());
        assert_eq!(local.get_build("chaos").await.unwrap(), None);
        assert!(local.get_client_info("chaos").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn client_info_requires_index() {
        let tmp = shared_cache();
        fs::remove_file(tmp.path().join("tq/resfileindex.txt")).unwrap();

        let local = LocalResolver::new(tmp.path());
        assert_eq!(local.get_build("tq").await.unwrap(), Some(2548491));
        assert!(local.get_client_info("tq").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn client_info_composes_build_and_index() {
        let tmp = shared_cache();
        let local = LocalResolver::new(tmp.path());

        let info = local.get_client_info("Tq").await.unwrap().unwrap();
        assert_eq!(info.build, 2548491);
        assert_eq!(info.client, ClientId::Tranquility);
        assert_eq!(info.index.len(), 2);
    }

    #[tokio::test]
    async fn invalid_client_fails_before_touching_disk() {
        let local = LocalResolver::new("/definitely/not/here");
        assert!(matches!(
            local.get_build("not-a-real-client").await,
            Err(ResError::InvalidClient(_))
        ));
        assert!(matches!(
            local.get_client_info("moon").await,
            Err(ResError::InvalidClient(_))
        ));
    }

    #[tokio::test]
    async fn copy_if_present_copies_existing_hash() {
        let tmp = shared_cache();
        let out = tempdir().unwrap();
        let target = out.path().join("a.png");
        let local = LocalResolver::new(tmp.path());

        assert!(local.copy_if_present(&target, "ab/ab01_aa").await.unwrap());
        assert_eq!(fs::read(&target).unwrap(), b"png bytes");
    }

    #[tokio::test]
    async fn copy_if_present_leaves_target_untouched_on_miss() {
        let tmp = shared_cache();
        let out = tempdir().unwrap();
        let target = out.path().join("b.png");
        let local = LocalResolver::new(tmp.path());

        assert!(!local.copy_if_present(&target, "ab/ab02_bb").await.unwrap());
        assert!(!target.exists());
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn copy_if_present_rejects_path_escape() {
        let tmp = shared_cache();
        let out = tempdir().unwrap();
        let local = LocalResolver::new(tmp.path());
        let err = local
            .copy_if_present(&out.path().join("x"), "../tq/start.ini")
            .await
            .unwrap_err();
        assert!(matches!(err, ResError::MalformedHashToken(_)));
    }
}
