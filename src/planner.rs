use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::availability::AvailableSet;
use crate::pantry_cache::PantryCache;
use crate::recipe_scorer::score_and_rank;
use crate::sources::{FallbackResolver, InventorySource, RecipeCorpusSource};
use crate::substitution::{ResolvedIngredient, SubstitutionResolver};

/// A ranked recipe with every ingredient resolved against the pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRecipe {
    pub id: String,
    pub title: String,
    pub match_pct: f64,
    pub match_count: usize,
    pub total_ingredients: usize,
    pub ingredients: Vec<ResolvedIngredient>,
    pub instructions: Vec<String>,
}

/// Runs the matching pipeline: pantry stock plus scanned items, recipe ranking, then
/// per-ingredient substitution.
pub struct RecipePlanner<'a, I, C> {
    pantry: &'a PantryCache<I>,
    corpus: &'a C,
    resolver: SubstitutionResolver<'a>,
    fallback: Option<&'a dyn FallbackResolver>,
}

impl<'a, I, C> RecipePlanner<'a, I, C>
where
    I: InventorySource,
    C: RecipeCorpusSource,
{
    pub fn new(pantry: &'a PantryCache<I>, corpus: &'a C) -> Self {
        Self {
            pantry,
            corpus,
            resolver: SubstitutionResolver::default(),
            fallback: None,
        }
    }

    pub fn with_resolver(mut self, resolver: SubstitutionResolver<'a>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_fallback(mut self, fallback: &'a dyn FallbackResolver) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Builds the request's pool from in-stock pantry items and the scanned items.
    pub async fn available_pool<S: AsRef<str>>(&self, identified_items: &[S]) -> AvailableSet {
        let stock = self.pantry.get_items().await;
        let mut pool: AvailableSet = stock
            .iter()
            .filter(|item| item.available)
            .map(|item| item.name.as_str())
            .collect();
        pool.extend(identified_items);
        pool
    }

    /// Ranks the corpus for the given scanned items and resolves each winner's ingredients.
    ///
    /// Collaborator failures shrink the result instead of failing it: an unreachable corpus
    /// yields no recipes.
    pub async fn plan<S: AsRef<str>>(
        &self,
        identified_items: &[S],
        max_results: usize,
    ) -> Vec<PlannedRecipe> {
        let pool = self.available_pool(identified_items).await;

        let corpus = match self.corpus.fetch_recipe_corpus().await {
            Ok(corpus) => corpus,
            Err(e) => {
                warn!("Recipe corpus unavailable: {:#}", e);
                return Vec::new();
            }
        };

        let ranked = score_and_rank(&corpus, &pool, max_results);
        info!(
            "Ranked {} of {} recipes against {} available items",
            ranked.len(),
            corpus.len(),
            pool.len()
        );

        let mut planned = Vec::with_capacity(ranked.len());
        for scored in ranked {
            let ingredients = self
                .resolver
                .resolve_with_fallback(&scored.recipe.ingredient_lines, &pool, self.fallback)
                .await;
            planned.push(PlannedRecipe {
                id: scored.recipe.id,
                title: scored.recipe.title,
                match_pct: scored.match_pct,
                match_count: scored.match_count,
                total_ingredients: scored.total_ingredients,
                ingredients,
                instructions: scored.recipe.instructions,
            });
        }
        planned
    }
}
