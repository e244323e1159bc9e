use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pantry_match::api_connection::Provider;
use pantry_match::cli::parse_args;
use pantry_match::config::Settings;
use pantry_match::pantry_cache::PantryCache;
use pantry_match::planner::RecipePlanner;
use pantry_match::sources::{CsvInventory, CsvRecipeCorpus};
use pantry_match::substitution::LlmSubstitutionResolver;

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = parse_args();

    let filter = if cli_args.verbose {
        EnvFilter::new("pantry_match=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pantry_match=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::from_env().context("Invalid configuration")?;
    let max_results = cli_args.max_results.unwrap_or(settings.max_results);

    let inventory = cli_args.pantry.as_ref().map(CsvInventory::new);
    let pantry = PantryCache::with_ttl(inventory, settings.cache_ttl);
    let corpus = CsvRecipeCorpus::new(&cli_args.recipes);
    let fallback = LlmSubstitutionResolver::new(
        Provider::openrouter(&settings.api_key_env_var),
        settings.model.clone(),
    );

    let mut planner = RecipePlanner::new(&pantry, &corpus);
    if !cli_args.no_fallback {
        planner = planner.with_fallback(&fallback);
    }

    info!(
        "Planning recipes for {} scanned item(s) from {:?}",
        cli_args.items.len(),
        cli_args.recipes
    );
    let planned = planner.plan(&cli_args.items, max_results).await;

    let output =
        serde_json::to_string_pretty(&planned).context("Failed to serialize planned recipes")?;
    println!("{}", output);
    Ok(())
}
