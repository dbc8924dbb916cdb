use std::{iter, path::Path};

use anyhow::Context;
use clap::Parser;
use recipes::{Config, Difficulty, Query, Recipe, SortKey};
use tracing::instrument;

use super::{
    display_time, open_store,
    terminal::{self, Colorize},
    OutputFormat, RecipeJson,
};

const COLUMNS: usize = 6;
const HEADERS: [&str; COLUMNS] = ["ID", "Title", "Difficulty", "Tags", "Updated", "Description"];
const SEPARATOR: &str = "  ";

/// The description column never shrinks below this, even on narrow terminals.
const MIN_DESCRIPTION_WIDTH: usize = 12;

/// Command arguments for `recipe list`.
#[derive(Debug, Default, Parser)]
pub struct List {
    /// Case-insensitive substring match against title, description and
    /// ingredients.
    #[arg(long)]
    search: Option<String>,

    /// Show only recipes with this tag (case-insensitive).
    #[arg(long)]
    tag: Option<String>,

    /// Show only recipes of this difficulty.
    #[arg(long)]
    difficulty: Option<Difficulty>,

    /// Sort order: last-updated, title or difficulty (default from config).
    #[arg(long)]
    sort: Option<SortKey>,

    /// Skip the first N rows.
    #[arg(long)]
    offset: Option<usize>,

    /// Limit number of rows returned.
    #[arg(long)]
    limit: Option<usize>,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl List {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let (config, store) = open_store(root)?;

        let query = self.query(&config);
        let rows = paginate(store.query(&query), self.offset, self.limit);
        tracing::debug!("Listing {} recipes", rows.len());

        match self.output {
            OutputFormat::Table => {
                render_table(&rows, terminal::width());
                Ok(())
            }
            OutputFormat::Json => render_json(&rows),
        }
    }

    fn query(&self, config: &Config) -> Query {
        let mut query = Query::new().sorted_by(self.sort.unwrap_or(config.sort));
        if let Some(search) = &self.search {
            query = query.with_search(search.as_str());
        }
        if let Some(tag) = &self.tag {
            query = query.with_tag(tag.as_str());
        }
        if let Some(difficulty) = self.difficulty {
            query = query.with_difficulty(difficulty);
        }
        query
    }
}

fn paginate<T>(rows: Vec<T>, offset: Option<usize>, limit: Option<usize>) -> Vec<T> {
    rows.into_iter()
        .skip(offset.unwrap_or(0))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

fn render_table(rows: &[&Recipe], terminal_width: Option<usize>) {
    if rows.is_empty() {
        println!("{}", "No recipes found".dim());
        return;
    }

    let mut lines = table_lines(rows, terminal_width).into_iter();
    if let Some(header) = lines.next() {
        println!("{}", header.heading());
    }
    for line in lines {
        println!("{line}");
    }
}

/// Lays out the table: a header, a rule, then one line per recipe.
///
/// Every column is as wide as its widest cell, except the description, which
/// is cut to whatever the terminal has left.
fn table_lines(rows: &[&Recipe], terminal_width: Option<usize>) -> Vec<String> {
    let cells: Vec<[String; COLUMNS]> = rows.iter().map(|recipe| cells(recipe)).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    if let Some(total) = terminal_width {
        let fixed: usize = widths[..COLUMNS - 1]
            .iter()
            .map(|width| width + SEPARATOR.len())
            .sum();
        let available = total.saturating_sub(fixed).max(MIN_DESCRIPTION_WIDTH);
        widths[COLUMNS - 1] = widths[COLUMNS - 1].min(available);
    }

    let header = format_row(&HEADERS.map(String::from), &widths);
    let rule = format_row(&widths.map(|width| "-".repeat(width)), &widths);

    iter::once(header)
        .chain(iter::once(rule))
        .chain(cells.iter().map(|row| format_row(row, &widths)))
        .collect()
}

fn cells(recipe: &Recipe) -> [String; COLUMNS] {
    [
        recipe.id().to_string(),
        recipe.title().to_string(),
        recipe.difficulty().to_string(),
        recipe.tags().join(", "),
        display_time(recipe.last_updated()),
        recipe.description().replace(['\n', '\r'], " "),
    ]
}

fn format_row(row: &[String; COLUMNS], widths: &[usize; COLUMNS]) -> String {
    row.iter()
        .zip(widths)
        .map(|(cell, &width)| {
            let cell = truncate(cell, width);
            format!("{cell:<width$}")
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR)
        .trim_end()
        .to_string()
}

/// Cuts `text` to at most `width` characters, marking the cut with an ellipsis.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    if width == 0 { kept } else { format!("{kept}…") }
}

fn render_json(rows: &[&Recipe]) -> anyhow::Result<()> {
    let rows_out: Vec<RecipeJson<'_>> = rows.iter().map(|recipe| RecipeJson::from(*recipe)).collect();

    serde_json::to_writer_pretty(std::io::stdout(), &rows_out)
        .context("failed to render json output")?;
    println!();
    Ok(())
}
