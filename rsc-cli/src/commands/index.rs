use anyhow::Result;
use clap::Parser;
use console::style;
use rsc_core::Resolver;

#[derive(Parser)]
pub struct IndexCli {
    /// Build number
    pub build: u64,

    /// List the application index instead of the resource index
    #[arg(long)]
    pub app: bool,

    /// Only show paths containing this text (case insensitive)
    #[arg(short, long)]
    pub filter: Option<String>,
}

impl IndexCli {
    pub async fn handle(&self, resolver: &Resolver) -> Result<()> {
        let index = if self.app {
            resolver.indices().get_app_index(self.build).await?
        } else {
            resolver.indices().get_resource_index(self.build).await?
        };

        let filter = self.filter.as_deref().map(str::to_lowercase);
        let mut shown = 0usize;
        for entry in index
            .iter()
            .filter(|e| filter.as_deref().is_none_or(|f| e.resource_path.contains(f)))
        {
            println!(
                "{}  {}  {}",
                entry.resource_path,
                style(&entry.hash_token).dim(),
                entry.size
            );
            shown += 1;
        }

        println!(
            "{}",
            style(format!("{} of {} entries", shown, index.len())).green()
        );
        Ok(())
    }
}
