use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::logger::{LogConfig, LogFormat, LogLevel, LogOutput, LogRotation};
use crate::remote::{DEFAULT_APP_BASE_URL, DEFAULT_RESOURCE_BASE_URL, RemoteEndpoints};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub app_base_url: String,
    pub resource_base_url: String,
    /// 已安装客户端的 SharedCache 目录，不配置则总是走远端
    pub shared_cache_dir: Option<String>,
    /// 不配置时使用 HTTP 客户端默认行为（不超时）
    pub request_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub log: LogSection,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            app_base_url: DEFAULT_APP_BASE_URL.to_string(),
            resource_base_url: DEFAULT_RESOURCE_BASE_URL.to_string(),
            shared_cache_dir: default_shared_cache_dir(),
            request_timeout_secs: None,
            user_agent: Some(format!("rsc/{}", env!("CARGO_PKG_VERSION"))),
            log: LogSection::default(),
        }
    }
}

impl ResolverConfig {
    pub fn endpoints(&self) -> RemoteEndpoints {
        RemoteEndpoints::new(&self.app_base_url, &self.resource_base_url)
    }

    pub fn shared_cache_path(&self) -> Option<PathBuf> {
        self.shared_cache_dir
            .as_deref()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
    pub rotation: String,
    /// 配置了 `file` 时是否仍然输出到控制台
    pub console: bool,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            file: None,
            rotation: "daily".to_string(),
            console: true,
        }
    }
}

impl LogSection {
    /// 无法识别的取值回落到默认值。
    pub fn to_log_config(&self) -> LogConfig {
        let rotation = LogRotation::from_str(&self.rotation).unwrap_or(LogRotation::Daily);
        let output = match &self.file {
            Some(file) if !file.trim().is_empty() => {
                let path = PathBuf::from(file);
                if self.console {
                    LogOutput::Both { path, rotation }
                } else {
                    LogOutput::File { path, rotation }
                }
            }
            _ => LogOutput::Console,
        };
        LogConfig {
            level: LogLevel::from_str(&self.level).unwrap_or(LogLevel::Info),
            format: LogFormat::from_str(&self.format).unwrap_or(LogFormat::Compact),
            output,
        }
    }
}

fn default_shared_cache_dir() -> Option<String> {
    if cfg!(target_os = "windows") {
        Some("C:\\EVE\\SharedCache".to_string())
    } else if cfg!(target_os = "macos") {
        let home = std::env::var("HOME").ok()?;
        Some(format!(
            "{home}/Library/Application Support/EVE Online/SharedCache"
        ))
    } else {
        None
    }
}
