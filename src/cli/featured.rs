use std::path::Path;

use clap::Parser;
use recipes::FeaturedStrategy;
use tracing::instrument;

use super::{open_store, terminal::Colorize};

/// Command arguments for `recipe featured`.
#[derive(Debug, Parser)]
pub struct Featured {
    /// How to pick: most-recent or random (default from config).
    #[arg(long)]
    strategy: Option<FeaturedStrategy>,
}

impl Featured {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let (config, store) = open_store(root)?;
        let strategy = self.strategy.unwrap_or(config.featured);

        match store.featured(strategy) {
            Some(recipe) => {
                println!("{}", recipe.title().heading());
                println!("{}", recipe.id().to_string().dim());
                if !recipe.description().is_empty() {
                    println!("{}", recipe.description());
                }
            }
            None => println!("{}", "No recipes yet".dim()),
        }
        Ok(())
    }
}
