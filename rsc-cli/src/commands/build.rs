use anyhow::Result;
use clap::Parser;
use console::style;
use rsc_core::Resolver;

use super::local_resolver;

#[derive(Parser)]
pub struct BuildCli {
    /// Client code (tq, sisi, chaos, duality, thunderdome)
    pub client: String,

    /// Read the build installed in the shared cache instead of asking the server
    #[arg(long)]
    pub local: bool,
}

impl BuildCli {
    pub async fn handle(&self, resolver: &Resolver) -> Result<()> {
        if self.local {
            let local = local_resolver(resolver)?;
            match local.get_build(self.client.as_str()).await? {
                Some(build) => println!("{}", build),
                None => println!(
                    "{}",
                    style(format!("No local build for '{}'", self.client)).yellow()
                ),
            }
        } else {
            let build = resolver
                .indices()
                .get_current_build(self.client.as_str())
                .await?;
            println!("{}", build);
        }
        Ok(())
    }
}
