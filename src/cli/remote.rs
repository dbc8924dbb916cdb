use std::path::Path;

use anyhow::Context;
use clap::Parser;
use recipes::{transport::RemoteDiff, FileSlot, RecipeId, RecipeStore};
use tracing::instrument;

use super::{open_store, terminal::Colorize};

/// Command arguments for `recipe remote`.
#[derive(Debug, Parser)]
pub struct Remote {}

impl Remote {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let (config, store) = open_store(root)?;

        let Some(outcome) = store.compare_remote() else {
            anyhow::bail!("No remote configured (set `remote` in config.toml)");
        };
        let remote = config.remote.as_deref().unwrap_or_default();
        let diff = outcome.with_context(|| format!("failed to compare with {remote}"))?;

        if diff.is_in_sync() {
            println!("{}", format!("In sync with {remote}").success());
            return Ok(());
        }

        println!("{}", format!("Out of sync with {remote}").warning());
        print_section("Only local", &diff.only_local, &store);
        print_section("Only remote", &diff.only_remote, &store);
        print_section("Changed", &diff.differing, &store);
        summary(&diff);
        Ok(())
    }
}

fn print_section(label: &str, ids: &[RecipeId], store: &RecipeStore<FileSlot>) {
    if ids.is_empty() {
        return;
    }
    println!("\n{label}:");
    for id in ids {
        match store.get(*id) {
            Some(recipe) => println!("  • {id} {}", recipe.title().dim()),
            None => println!("  • {id}"),
        }
    }
}

fn summary(diff: &RemoteDiff) {
    println!(
        "\n{}",
        format!(
            "{} only local, {} only remote, {} changed",
            diff.only_local.len(),
            diff.only_remote.len(),
            diff.differing.len()
        )
        .dim()
    );
}
