use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;

use crate::config::entity::ResolverConfig;

static CONFIG: OnceLock<ResolverConfig> = OnceLock::new();

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("config already initialized")]
    AlreadyInitialized,
}

pub fn default_config_path() -> PathBuf {
    // 优先使用环境变量 RSC_CONFIG_PATH 指定的路径，否则使用工作目录下的 rsc.toml
    if let Ok(p) = env::var("RSC_CONFIG_PATH") {
        return PathBuf::from(p);
    }
    PathBuf::from("rsc.toml")
}

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn get_or_init_config() -> &'static ResolverConfig {
    CONFIG.get_or_init(ResolverConfig::default)
}

/// 在首次初始化前注入配置（例如测试中指向本地 mock 服务）。
pub fn try_set_config(cfg: ResolverConfig) -> Result<(), ConfigError> {
    CONFIG.set(cfg).map_err(|_| ConfigError::AlreadyInitialized)
}

/// 读取配置文件；文件不存在时写出一份默认配置。
pub async fn read_or_create(path: &Path) -> Result<ResolverConfig, ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if path.exists() {
        let content = tokio::fs::read_to_string(path).await.map_err(io_err)?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    } else {
        let cfg = ResolverConfig::default();
        let toml_str = toml::to_string_pretty(&cfg)?;
        ensure_parent_dir(path).map_err(io_err)?;
        tokio::fs::write(path, toml_str).await.map_err(io_err)?;
        Ok(cfg)
    }
}

/// 加载配置到全局。`path` 为空时使用 [`default_config_path`]。
pub async fn load_config(path: Option<&Path>) -> Result<&'static ResolverConfig, ConfigError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    let cfg = read_or_create(&path).await?;
    if CONFIG.set(cfg).is_err() {
        tracing::debug!(path = %path.display(), "config already loaded, keeping the existing one");
    }
    Ok(get_or_init_config())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_file_is_created_with_defaults() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested").join("rsc.toml");

        let cfg = read_or_create(&path).await.expect("create default config");
        assert_eq!(cfg, ResolverConfig::default());
        assert!(path.exists());

        let again = read_or_create(&path).await.expect("read written config");
        assert_eq!(again, cfg);
    }

    #[tokio::test]
    async fn second_load_keeps_first_config() {
        let tmp = tempdir().unwrap();
        let first_path = tmp.path().join("first.toml");
        let second_path = tmp.path().join("second.toml");
        std::fs::write(&second_path, "app_base_url = \"http://second.test\"\n").unwrap();

        let first = load_config(Some(&first_path)).await.expect("load first");
        let second = load_config(Some(&second_path)).await.expect("load second");

        assert!(std::ptr::eq(first, second));
        assert_ne!(second.app_base_url, "http://second.test");
        assert!(matches!(
            try_set_config(ResolverConfig::default()),
            Err(ConfigError::AlreadyInitialized)
        ));
    }

    #[tokio::test]
    async fn invalid_file_reports_parse_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("rsc.toml");
        std::fs::write(&path, "app_base_url = [").unwrap();

        let err = read_or_create(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
