use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use crate::availability::{fuzzy_match, AvailableSet};
use crate::ingredient_parser::normalize;
use crate::sources::RecipeRecord;

pub const DEFAULT_MAX_RESULTS: usize = 5;

/// A recipe with its ingredient coverage against the available pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecipe {
    pub recipe: RecipeRecord,
    pub match_count: usize,
    pub total_ingredients: usize,
    /// `match_count / total_ingredients`, rounded to two decimals.
    pub match_pct: f64,
}

/// Two-decimal rounding with ties to even, so 1/8 gives 0.12 and 5/8 gives 0.62.
fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Scores one recipe, or `None` for a malformed row (blank title or no ingredient lines).
///
/// Each ingredient is counted at most once, however many pool entries it matches.
pub fn score_recipe(recipe: &RecipeRecord, pool: &AvailableSet) -> Option<ScoredRecipe> {
    if recipe.title.trim().is_empty() || recipe.ingredient_lines.is_empty() {
        return None;
    }

    let names: Vec<String> = recipe.ingredient_lines.iter().map(|l| normalize(l)).collect();
    let match_count = names
        .iter()
        .filter(|name| !name.is_empty())
        .filter(|name| pool.iter().any(|entry| fuzzy_match(name, entry)))
        .count();
    let total_ingredients = names.len();

    Some(ScoredRecipe {
        recipe: recipe.clone(),
        match_count,
        total_ingredients,
        match_pct: round_2dp(match_count as f64 / total_ingredients as f64),
    })
}

/// Scores the corpus, ranks by coverage and keeps the best `max_results`.
///
/// Ties keep corpus order.
pub fn score_and_rank(
    recipes: &[RecipeRecord],
    pool: &AvailableSet,
    max_results: usize,
) -> Vec<ScoredRecipe> {
    if max_results == 0 {
        return Vec::new();
    }

    let mut scored: Vec<ScoredRecipe> = recipes
        .iter()
        .filter_map(|recipe| {
            let scored = score_recipe(recipe, pool);
            if scored.is_none() {
                debug!("Skipping malformed recipe row {}", recipe.id);
            }
            scored
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.match_pct.partial_cmp(&a.match_pct).unwrap_or(Ordering::Equal));
    scored.truncate(max_results);
    scored
}
