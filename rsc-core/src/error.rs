use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::client::BuildNumber;

/// 响应体中出现该标记时视为 CDN 拒绝访问。
const ACCESS_DENIED_MARKER: &str = "AccessDenied";

/// 资源解析流程中的全部错误。
///
/// 错误需要 `Clone`：同一个 build 的索引拉取失败时，所有等待中的调用方都会拿到同一个错误。
#[derive(Debug, Clone, Error)]
pub enum ResError {
    #[error("invalid client: {0}")]
    InvalidClient(String),

    #[error("remote request {url} failed: {reason}")]
    RemoteUnavailable {
        url: String,
        status: Option<u16>,
        reason: String,
        body: Option<String>,
    },

    #[error("invalid build manifest from {url}: {reason}")]
    InvalidManifest { url: String, reason: String },

    #[error("malformed index line {line}: {reason}")]
    MalformedIndexLine { line: usize, reason: String },

    #[error("malformed hash token: {0}")]
    MalformedHashToken(String),

    #[error("index entry {path} not found for build {build}")]
    IndexEntryNotFound { build: BuildNumber, path: String },

    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    #[error("index fetch for build {build} aborted: {reason}")]
    FetchAborted { build: BuildNumber, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ResError>;

impl ResError {
    pub fn write_failed(path: &Path, err: io::Error) -> Self {
        Self::WriteFailed {
            path: path.to_path_buf(),
            source: Arc::new(err),
        }
    }

    pub fn io(path: &Path, err: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source: Arc::new(err),
        }
    }

    pub fn transport(url: &str, err: reqwest::Error) -> Self {
        Self::RemoteUnavailable {
            url: url.to_string(),
            status: err.status().map(|s| s.as_u16()),
            reason: err.to_string(),
            body: None,
        }
    }

    /// 非 2xx 响应且响应体包含 `AccessDenied` 时返回 true。
    ///
    /// 这只是给调用方分支用的判断，不是单独的错误类型。
    pub fn is_access_denied(&self) -> bool {
        match self {
            Self::RemoteUnavailable {
                status: Some(status),
                body: Some(body),
                ..
            } => !(200..300).contains(status) && body.contains(ACCESS_DENIED_MARKER),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_error(status: u16, body: &str) -> ResError {
        ResError::RemoteUnavailable {
            url: "https://resources.example/ab/abcd_ef".into(),
            status: Some(status),
            reason: format!("HTTP {status}"),
            body: Some(body.into()),
        }
    }

    #[test]
    fn access_denied_detected_in_error_body() {
        let body = "<Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>";
        assert!(http_error(403, body).is_access_denied());
    }

    #[test]
    fn other_failures_are_not_access_denied() {
        assert!(!http_error(404, "<Error><Code>NoSuchKey</Code></Error>").is_access_denied());
        assert!(!ResError::InvalidClient("xx".into()).is_access_denied());

        let no_body = ResError::RemoteUnavailable {
            url: "https://resources.example/x".into(),
            status: None,
            reason: "connection refused".into(),
            body: None,
        };
        assert!(!no_body.is_access_denied());
    }

    #[test]
    fn io_errors_are_shared_between_clones() {
        let err = ResError::write_failed(
            Path::new("/tmp/out.bin"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
        assert!(cloned.to_string().contains("/tmp/out.bin"));
    }
}
