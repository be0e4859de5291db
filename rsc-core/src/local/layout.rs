use std::path::{Path, PathBuf};

use crate::client::ClientId;

pub const RES_FILES_DIR: &str = "ResFiles";
pub const START_INI: &str = "start.ini";
pub const RES_FILE_INDEX: &str = "resfileindex.txt";

/// 本地 SharedCache 目录结构：
///
/// ```text
/// {root}/ResFiles/{hash}
/// {root}/{client}/start.ini
/// {root}/{client}/resfileindex.txt
/// {root}/index_{client}.txt
/// ```
#[derive(Debug, Clone)]
pub struct SharedCacheLayout {
    root: PathBuf,
}

impl SharedCacheLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn res_files_dir(&self) -> PathBuf {
        self.root.join(RES_FILES_DIR)
    }

    /// `hash` 需要事先校验为普通相对路径。
    pub fn res_file(&self, hash: &Path) -> PathBuf {
        self.res_files_dir().join(hash)
    }

    pub fn client_dir(&self, client: ClientId) -> PathBuf {
        self.root.join(client.code())
    }

    pub fn start_ini(&self, client: ClientId) -> PathBuf {
        self.client_dir(client).join(START_INI)
    }

    pub fn res_file_index(&self, client: ClientId) -> PathBuf {
        self.client_dir(client).join(RES_FILE_INDEX)
    }

    pub fn app_index(&self, client: ClientId) -> PathBuf {
        self.root.join(format!("index_{}.txt", client.code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_shared_cache_layout() {
        let layout = SharedCacheLayout::new("/games/SharedCache");
        assert_eq!(
            layout.res_file(Path::new("ab/abcd_ef")),
            PathBuf::from("/games/SharedCache/ResFiles/ab/abcd_ef")
        );
        assert_eq!(
            layout.start_ini(ClientId::Tranquility),
            PathBuf::from("/games/SharedCache/tq/start.ini")
        );
        assert_eq!(
            layout.res_file_index(ClientId::Singularity),
            PathBuf::from("/games/SharedCache/sisi/resfileindex.txt")
        );
        assert_eq!(
            layout.app_index(ClientId::Chaos),
            PathBuf::from("/games/SharedCache/index_chaos.txt")
        );
    }
}
