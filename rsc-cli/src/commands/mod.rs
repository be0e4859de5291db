mod build;
mod fetch;
mod index;
mod info;

use anyhow::{Context, Result};
use clap::Subcommand;
use rsc_core::{LocalResolver, Resolver};

#[derive(Subcommand)]
pub enum Commands {
    /// 查询客户端当前的 build 号
    Build(build::BuildCli),
    /// 查询客户端 build 及资源索引概况
    Info(info::InfoCli),
    /// 列出某个 build 的索引条目
    Index(index::IndexCli),
    /// 按 hash 存储资源文件
    Fetch(fetch::FetchCli),
    /// 按资源路径存储资源文件
    Get(fetch::GetCli),
}

impl Commands {
    pub async fn handle(&self, resolver: &Resolver) -> Result<()> {
        match self {
            Commands::Build(build_cli) => build_cli.handle(resolver).await,
            Commands::Info(info_cli) => info_cli.handle(resolver).await,
            Commands::Index(index_cli) => index_cli.handle(resolver).await,
            Commands::Fetch(fetch_cli) => fetch_cli.handle(resolver).await,
            Commands::Get(get_cli) => get_cli.handle(resolver).await,
        }
    }
}

/// `--local` 相关命令需要一个已配置的 SharedCache。
fn local_resolver(resolver: &Resolver) -> Result<LocalResolver> {
    resolver
        .local()
        .context("no shared cache configured, pass --shared-cache or set shared_cache_dir")
}
