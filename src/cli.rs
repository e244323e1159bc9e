use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Match scanned food items against a recipe sheet", long_about = None)]
pub struct Cli {
    /// CSV export of the recipe sheet
    #[arg(short, long)]
    pub recipes: PathBuf,

    /// CSV export of the pantry inventory
    #[arg(short, long)]
    pub pantry: Option<PathBuf>,

    /// A scanned item; repeat for each item
    #[arg(short, long = "item")]
    pub items: Vec<String>,

    /// Maximum number of recipes to return (defaults to PANTRY_MATCH_MAX_RESULTS or 5)
    #[arg(short, long)]
    pub max_results: Option<usize>,

    /// Only use the built-in substitution table
    #[arg(long)]
    pub no_fallback: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
