use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rsc_core::config::load_config;
use rsc_core::logger::Logger;
use rsc_core::Resolver;

mod commands;

#[derive(Parser)]
#[command(name = "rsc")]
#[command(about = "Resolve EVE client builds, indices and resource files", long_about = None)]
struct Cli {
    /// 配置文件路径，默认读取 RSC_CONFIG_PATH 或 ./rsc.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 覆盖配置中的 SharedCache 目录
    #[arg(long, global = true)]
    shared_cache: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = load_config(cli.config.as_deref()).await?;
    let _guard = Logger::new(cfg.log.to_log_config()).init()?;

    let mut resolver = Resolver::from_config(cfg)?;
    if cli.shared_cache.is_some() {
        resolver = resolver.with_shared_cache(cli.shared_cache);
    }

    cli.command.handle(&resolver).await
}
