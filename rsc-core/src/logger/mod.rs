mod config;

pub use config::{LogConfig, LogFormat, LogLevel, LogOutput, LogRotation};

use std::path::Path;

use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan},
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
};

type Base = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Base> + Send + Sync>;

pub struct Logger {
    config: LogConfig,
}

impl Logger {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }

    /// 安装全局 subscriber。返回的 guard 需要一直持有，否则文件日志可能丢失尾部内容。
    pub fn init(self) -> Result<LoggerGuard, LogError> {
        let filter = self.build_filter();
        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guards = Vec::new();

        match &self.config.output {
            LogOutput::Console => layers.push(self.console_layer()),
            LogOutput::File { path, rotation } => {
                let (writer, guard) = self.file_writer(path, *rotation)?;
                layers.push(self.file_layer(writer));
                guards.push(guard);
            }
            LogOutput::Both { path, rotation } => {
                let (writer, guard) = self.file_writer(path, *rotation)?;
                layers.push(self.console_layer());
                layers.push(self.file_layer(writer));
                guards.push(guard);
            }
        }

        tracing_subscriber::registry()
            .with(filter)
            .with(layers)
            .try_init()
            .map_err(|_| LogError::AlreadyInitialized)?;

        Ok(LoggerGuard { _guards: guards })
    }

    fn build_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.config.level.as_str()))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

    fn console_layer(&self) -> BoxedLayer {
        match self.config.format {
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_target(true)
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_target(true)
                .boxed(),
            LogFormat::Compact => fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(true)
                .boxed(),
        }
    }

    fn file_layer(&self, writer: tracing_appender::non_blocking::NonBlocking) -> BoxedLayer {
        match self.config.format {
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(writer)
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .boxed(),
            LogFormat::Compact => fmt::layer()
                .compact()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .boxed(),
        }
    }

    fn file_writer(
        &self,
        path: &Path,
        rotation: LogRotation,
    ) -> Result<
        (
            tracing_appender::non_blocking::NonBlocking,
            tracing_appender::non_blocking::WorkerGuard,
        ),
        LogError,
    > {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| LogError::InvalidPath(path.display().to_string()))?;

        std::fs::create_dir_all(dir)?;
        let appender = match rotation {
            LogRotation::Hourly => tracing_appender::rolling::hourly(dir, file_name),
            LogRotation::Daily => tracing_appender::rolling::daily(dir, file_name),
            LogRotation::Never => tracing_appender::rolling::never(dir, file_name),
        };
        Ok(tracing_appender::non_blocking(appender))
    }
}

pub struct LoggerGuard {
    _guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
}

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid log path: {0}")]
    InvalidPath(String),

    #[error("Logger already initialized")]
    AlreadyInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_writer_creates_log_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("logs").join("rsc.log");
        let logger = Logger::new(LogConfig {
            output: LogOutput::File {
                path: path.clone(),
                rotation: LogRotation::Never,
            },
            ..LogConfig::default()
        });

        let (_writer, _guard) = logger
            .file_writer(&path, LogRotation::Never)
            .expect("file writer");
        assert!(tmp.path().join("logs").is_dir());
    }

    #[test]
    fn level_and_format_parse_case_insensitively() {
        assert_eq!(LogLevel::from_str("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("verbose"), None);
        assert_eq!(LogFormat::from_str("Json"), Some(LogFormat::Json));
        assert_eq!(LogRotation::from_str("hourly"), Some(LogRotation::Hourly));
    }

    #[test]
    fn file_writer_rejects_path_without_file_name() {
        let logger = Logger::new(LogConfig::default());
        let err = logger.file_writer(Path::new("/"), LogRotation::Never);
        assert!(matches!(err, Err(LogError::InvalidPath(_))));
    }
}
