use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;
use rsc_core::{Resolver, StoreSource};

#[derive(Parser)]
pub struct FetchCli {
    /// Hash token, e.g. `ab/abcdef01_5d41402abc4b2a76b9719d911017c592`
    pub hash: String,

    /// Where to write the file
    pub target: PathBuf,
}

impl FetchCli {
    pub async fn handle(&self, resolver: &Resolver) -> Result<()> {
        let source = resolver.store_hash(&self.target, &self.hash).await?;
        report(&self.target, source);
        Ok(())
    }
}

#[derive(Parser)]
pub struct GetCli {
    /// Build number
    pub build: u64,

    /// Resource path, e.g. `res:/ui/texture/icons/1_64_1.png`
    pub res_path: String,

    /// Where to write the file
    pub target: PathBuf,
}

impl GetCli {
    pub async fn handle(&self, resolver: &Resolver) -> Result<()> {
        let source = resolver
            .store_resource(self.build, &self.res_path, &self.target)
            .await?;
        report(&self.target, source);
        Ok(())
    }
}

fn report(target: &std::path::Path, source: StoreSource) {
    let from = match source {
        StoreSource::SharedCache => "shared cache",
        StoreSource::Remote => "remote",
    };
    println!(
        "  {} {} {}",
        style("✓").green(),
        target.display(),
        style(format!("({})", from)).dim()
    );
}
