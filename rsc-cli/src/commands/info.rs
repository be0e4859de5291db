use anyhow::Result;
use clap::Parser;
use console::style;
use rsc_core::{ClientInfo, Resolver};

use super::local_resolver;

#[derive(Parser)]
pub struct InfoCli {
    /// Client code (tq, sisi, chaos, duality, thunderdome)
    pub client: String,

    /// Describe the installation in the shared cache instead of the server state
    #[arg(long)]
    pub local: bool,
}

impl InfoCli {
    pub async fn handle(&self, resolver: &Resolver) -> Result<()> {
        let info = if self.local {
            let local = local_resolver(resolver)?;
            match local.get_client_info(self.client.as_str()).await? {
                Some(info) => info,
                None => {
                    println!(
                        "{}",
                        style(format!("'{}' is not installed locally", self.client)).yellow()
                    );
                    return Ok(());
                }
            }
        } else {
            println!("{}", style("Querying server...").cyan());
            resolver
                .indices()
                .get_current_client_info(self.client.as_str())
                .await?
        };

        print_info(&info);
        Ok(())
    }
}

fn print_info(info: &ClientInfo) {
    println!("  {:<10} {}", style("client").bold(), info.client);
    println!("  {:<10} {}", style("build").bold(), info.build);
    println!("  {:<10} {}", style("resources").bold(), info.index.len());
}
