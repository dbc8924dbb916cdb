use std::{fmt::Write as _, path::Path};

use anyhow::Context;
use clap::Parser;
use recipes::{Recipe, RecipeId};
use tracing::instrument;

use super::{
    display_time, open_store,
    terminal::Colorize,
    OutputFormat, RecipeJson,
};

/// Command arguments for `recipe show`.
#[derive(Debug, Parser)]
pub struct Show {
    /// The id of the recipe to show
    id: RecipeId,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Show {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let (_, store) = open_store(root)?;

        let Some(recipe) = store.get(self.id) else {
            anyhow::bail!("Recipe {} not found", self.id);
        };

        match self.output {
            OutputFormat::Table => {
                println!("{}", recipe.title().heading());
                print!("{}", details(recipe));
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(std::io::stdout(), &RecipeJson::from(recipe))
                    .context("failed to render json output")?;
                println!();
            }
        }
        Ok(())
    }
}

/// Everything below the title, as printed by `recipe show`.
fn details(recipe: &Recipe) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", format!("id:         {}", recipe.id()).dim());
    let _ = writeln!(out, "difficulty: {}", recipe.difficulty());
    let _ = writeln!(out, "tags:       {}", recipe.tags().join(", "));
    let _ = writeln!(
        out,
        "{}",
        format!("updated:    {}", display_time(recipe.last_updated())).dim()
    );

    if !recipe.description().is_empty() {
        let _ = writeln!(out, "\n{}", recipe.description());
    }

    let _ = writeln!(out, "\nIngredients:");
    for ingredient in recipe.ingredients() {
        let _ = writeln!(out, "  • {ingredient}");
    }

    let _ = writeln!(out, "\nSteps:");
    for (number, step) in recipe.steps().iter().enumerate() {
        let _ = writeln!(out, "  {}. {step}", number + 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use recipes::{Difficulty, MemorySlot, RecipeInput, RecipeStore};

    use super::*;

    #[test]
    fn details_list_ingredients_and_numbered_steps() {
        let mut store = RecipeStore::new(MemorySlot::new());
        let recipe = store
            .create(&RecipeInput {
                title: "Bread".to_string(),
                description: "A simple loaf".to_string(),
                ingredients: "flour, water, yeast".to_string(),
                steps: "Knead. Prove. Bake".to_string(),
                tags: "baking".to_string(),
                difficulty: Some(Difficulty::Hard),
            })
            .unwrap();

        let text = details(&recipe);

        assert!(text.contains("difficulty: Hard"));
        assert!(text.contains("tags:       baking"));
        assert!(text.contains("A simple loaf"));
        assert!(text.contains("  • yeast\n"));
        assert!(text.contains("  1. Knead\n  2. Prove\n  3. Bake\n"));
    }
}
