use std::{
    fs,
    path::{Path, PathBuf},
};

mod featured;
mod list;
mod remote;
mod show;
mod terminal;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{ArgAction, ValueEnum};
use featured::Featured;
use list::List;
use recipes::{
    storage::format, Config, Difficulty, FileSlot, HttpTransport, Recipe, RecipeId, RecipeInput,
    RecipeStore, Slot,
};
use remote::Remote;
use serde::Serialize;
use show::Show;
use terminal::Colorize;
use tracing::instrument;

/// Name of the configuration file in the collection root.
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The path to the root of the recipe collection
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::List(List::default()))
            .run(&self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Initialize a new recipe collection
    Init,

    /// Add a recipe
    Add(Add),

    /// Edit an existing recipe
    ///
    /// Fields that are not given keep their current value.
    Edit(Edit),

    /// Delete a recipe
    Delete(Delete),

    /// List recipes (default)
    List(List),

    /// Show a recipe in full
    Show(Show),

    /// List every tag in use
    Tags,

    /// Show the featured recipe
    Featured(Featured),

    /// Compare the collection with the configured remote
    Remote(Remote),
}

impl Command {
    fn run(self, root: &Path) -> anyhow::Result<()> {
        match self {
            Self::Init => init(root)?,
            Self::Add(command) => command.run(root)?,
            Self::Edit(command) => command.run(root)?,
            Self::Delete(command) => command.run(root)?,
            Self::List(command) => command.run(root)?,
            Self::Show(command) => command.run(root)?,
            Self::Tags => tags(root)?,
            Self::Featured(command) => command.run(root)?,
            Self::Remote(command) => command.run(root)?,
        }
        Ok(())
    }
}

fn load_config(root: &Path) -> Config {
    let path = root.join(CONFIG_FILE);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

/// Loads the configuration and the store it points at.
fn open_store(root: &Path) -> anyhow::Result<(Config, RecipeStore<FileSlot>)> {
    let config = load_config(root);
    let slot = FileSlot::new(root.join(config.store_file()));

    let mut store = RecipeStore::new(slot);
    if let Some(transport) =
        HttpTransport::from_config(&config).context("failed to set up remote")?
    {
        store = store.with_transport(transport);
    }
    store.load().context("failed to load recipes")?;

    Ok((config, store))
}

#[instrument]
fn init(root: &Path) -> anyhow::Result<()> {
    let config_path = root.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("Collection already initialized (found existing {CONFIG_FILE})");
    }

    fs::create_dir_all(root)
        .with_context(|| format!("Failed to create {}", root.display()))?;

    let config = Config::default();
    config
        .save(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to create {CONFIG_FILE}: {e}"))?;

    let mut slot = FileSlot::new(root.join(config.store_file()));
    if slot.get()?.is_none() {
        slot.set(&format::encode(&[])?)
            .context("Failed to create recipe store")?;
    }

    println!("Initialized recipe collection in {}", root.display());
    println!("  Created: {CONFIG_FILE}");
    println!("  Created: {}", config.store_file());
    println!();
    println!("Next steps:");
    println!(
        "  recipe add --title \"Pancakes\" --description \"Fluffy\" --ingredients \"flour, milk, \
         eggs\" --steps \"Whisk. Fry.\" --tags breakfast --difficulty easy"
    );

    Ok(())
}

#[instrument]
fn tags(root: &Path) -> anyhow::Result<()> {
    let (_, store) = open_store(root)?;
    for tag in store.tags().iter() {
        println!("{tag}");
    }
    Ok(())
}

#[derive(Debug, clap::Parser)]
pub struct Add {
    /// The recipe title
    #[arg(long, short, default_value = "")]
    title: String,

    /// A short description
    #[arg(long, default_value = "")]
    description: String,

    /// Comma-separated ingredients
    #[arg(long, default_value = "")]
    ingredients: String,

    /// Period-separated method steps
    #[arg(long, default_value = "")]
    steps: String,

    /// Comma-separated tags
    #[arg(long, default_value = "")]
    tags: String,

    /// easy, medium or hard
    #[arg(long)]
    difficulty: Option<Difficulty>,
}

impl Add {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let (_, mut store) = open_store(root)?;

        let input = RecipeInput {
            title: self.title,
            description: self.description,
            ingredients: self.ingredients,
            steps: self.steps,
            tags: self.tags,
            difficulty: self.difficulty,
        };
        let recipe = store.create(&input)?;

        println!("{}", recipe.id());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Edit {
    /// The id of the recipe to edit
    id: RecipeId,

    /// New title
    #[arg(long, short)]
    title: Option<String>,

    /// New description
    #[arg(long)]
    description: Option<String>,

    /// New comma-separated ingredients
    #[arg(long)]
    ingredients: Option<String>,

    /// New period-separated method steps
    #[arg(long)]
    steps: Option<String>,

    /// New comma-separated tags
    #[arg(long)]
    tags: Option<String>,

    /// New difficulty
    #[arg(long)]
    difficulty: Option<Difficulty>,
}

impl Edit {
    /// Overlays the given flags on the form pre-filled from `recipe`.
    fn input_for(self, recipe: &Recipe) -> RecipeInput {
        let current = RecipeInput::from(recipe);
        RecipeInput {
            title: self.title.unwrap_or(current.title),
            description: self.description.unwrap_or(current.description),
            ingredients: self.ingredients.unwrap_or(current.ingredients),
            steps: self.steps.unwrap_or(current.steps),
            tags: self.tags.unwrap_or(current.tags),
            difficulty: self.difficulty.or(current.difficulty),
        }
    }

    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let (_, mut store) = open_store(root)?;
        let id = self.id;

        let Some(recipe) = store.get(id) else {
            anyhow::bail!("Recipe {id} not found");
        };
        let input = self.input_for(recipe);
        let recipe = store.update(id, &input)?;

        println!(
            "{}",
            format!("Updated {} ({})", recipe.title(), recipe.id()).success()
        );
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Delete {
    /// The id of the recipe to delete
    id: RecipeId,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Delete {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let (_, mut store) = open_store(root)?;

        let Some(recipe) = store.get(self.id) else {
            anyhow::bail!("Recipe {} not found", self.id);
        };
        let title = recipe.title().to_string();

        if !self.yes {
            let confirmed = dialoguer::Confirm::new()
                .with_prompt(format!("Delete '{title}'?"))
                .default(false)
                .interact()?;
            if !confirmed {
                println!("Cancelled");
                return Ok(());
            }
        }

        store.delete(self.id)?;

        println!("{}", format!("Deleted {title}").success());
        Ok(())
    }
}

/// Output formats shared by the listing commands.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// The machine-readable shape of a recipe.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecipeJson<'a> {
    id: RecipeId,
    title: &'a str,
    description: &'a str,
    ingredients: &'a [String],
    steps: &'a [String],
    tags: &'a [String],
    difficulty: Difficulty,
    last_updated: DateTime<Utc>,
}

impl<'a> From<&'a Recipe> for RecipeJson<'a> {
    fn from(recipe: &'a Recipe) -> Self {
        Self {
            id: recipe.id(),
            title: recipe.title(),
            description: recipe.description(),
            ingredients: recipe.ingredients(),
            steps: recipe.steps(),
            tags: recipe.tags(),
            difficulty: recipe.difficulty(),
            last_updated: recipe.last_updated(),
        }
    }
}

/// Human-readable timestamp used in listings.
fn display_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}
