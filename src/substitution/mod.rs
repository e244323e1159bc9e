pub mod llm_fallback;
pub mod table;

pub use llm_fallback::LlmSubstitutionResolver;
pub use table::{SubstitutionEntry, SubstitutionTable};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::availability::{matches_canonical, AvailableSet};
use crate::ingredient_parser::normalize;
use crate::sources::FallbackResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientStatus {
    Available,
    Missing,
}

/// Outcome for one recipe ingredient line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIngredient {
    pub name: String,
    pub status: IngredientStatus,
    pub substitution: Option<String>,
}

impl ResolvedIngredient {
    fn available(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: IngredientStatus::Available,
            substitution: None,
        }
    }

    fn missing(name: &str, substitution: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            status: IngredientStatus::Missing,
            substitution,
        }
    }

    fn awaiting_fallback(&self) -> bool {
        self.status == IngredientStatus::Missing && self.substitution.is_none()
    }
}

/// Per-line results plus the canonical names the table could not cover.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub ingredients: Vec<ResolvedIngredient>,
    pub pending: Vec<String>,
}

impl Resolution {
    /// Fills still-unset substitutions from a fallback mapping keyed by canonical name.
    ///
    /// Entries that already carry a table substitution, available entries and `None`/blank
    /// fallback values are left untouched. Returns how many entries were filled.
    pub fn apply_fallback(&mut self, mapping: &HashMap<String, Option<String>>) -> usize {
        let mapping: HashMap<String, &str> = mapping
            .iter()
            .filter_map(|(key, value)| {
                let value = value.as_deref()?.trim();
                (!value.is_empty()).then(|| (key.trim().to_lowercase(), value))
            })
            .collect();

        let mut filled = 0;
        for ingredient in self.ingredients.iter_mut().filter(|i| i.awaiting_fallback()) {
            if let Some(substitution) = mapping.get(&normalize(&ingredient.name)) {
                ingredient.substitution = Some((*substitution).to_string());
                filled += 1;
            }
        }
        filled
    }
}

/// Checks recipe lines against the available pool and proposes swaps for what is missing.
#[derive(Debug, Clone, Copy)]
pub struct SubstitutionResolver<'a> {
    table: &'a SubstitutionTable,
}

impl Default for SubstitutionResolver<'static> {
    fn default() -> Self {
        Self::new(SubstitutionTable::builtin())
    }
}

impl<'a> SubstitutionResolver<'a> {
    pub fn new(table: &'a SubstitutionTable) -> Self {
        Self { table }
    }

    /// Table-only lookup for one raw line.
    pub fn resolve(&self, ingredient: &str) -> Option<&'a SubstitutionEntry> {
        self.table.lookup(ingredient)
    }

    /// Resolves each line to available / missing-with-swap / missing-pending.
    ///
    /// Lines that normalize to an empty name are reported missing and never queued.
    pub fn resolve_missing<S: AsRef<str>>(&self, lines: &[S], pool: &AvailableSet) -> Resolution {
        let mut resolution = Resolution::default();
        for line in lines {
            let line = line.as_ref();
            let canonical = normalize(line);
            if canonical.is_empty() {
                debug!("Ingredient line '{}' has no identifiable name", line);
                resolution.ingredients.push(ResolvedIngredient::missing(line, None));
                continue;
            }
            if matches_canonical(&canonical, pool) {
                resolution.ingredients.push(ResolvedIngredient::available(line));
                continue;
            }
            match self.table.lookup_canonical(&canonical) {
                Some(entry) => {
                    resolution
                        .ingredients
                        .push(ResolvedIngredient::missing(line, Some(entry.substitution.clone())));
                }
                None => {
                    resolution.ingredients.push(ResolvedIngredient::missing(line, None));
                    if !resolution.pending.contains(&canonical) {
                        resolution.pending.push(canonical);
                    }
                }
            }
        }
        resolution
    }

    /// Full path: table first, then `fallback` for whatever is left.
    ///
    /// A fallback error is logged and swallowed; the affected lines simply keep no substitution.
    pub async fn resolve_with_fallback<S: AsRef<str>>(
        &self,
        lines: &[S],
        pool: &AvailableSet,
        fallback: Option<&dyn FallbackResolver>,
    ) -> Vec<ResolvedIngredient> {
        let mut resolution = self.resolve_missing(lines, pool);
        let Some(fallback) = fallback else {
            return resolution.ingredients;
        };
        if resolution.pending.is_empty() {
            return resolution.ingredients;
        }

        match fallback.resolve_unknown(&resolution.pending, &pool.to_vec()).await {
            Ok(mapping) => {
                let filled = resolution.apply_fallback(&mapping);
                debug!(
                    "Fallback filled {}/{} pending substitutions",
                    filled,
                    resolution.pending.len()
                );
            }
            Err(e) => {
                warn!(
                    "Substitution fallback failed for {} ingredient(s): {:#}",
                    resolution.pending.len(),
                    e
                );
            }
        }
        resolution.ingredients
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    struct FixedFallback(HashMap<String, Option<String>>);

    #[async_trait]
    impl FallbackResolver for FixedFallback {
        async fn resolve_unknown(
            &self,
            _missing: &[String],
            _pool: &[String],
        ) -> Result<HashMap<String, Option<String>>> {
            Ok(self.0.clone())
        }
    }

    struct FailingFallback;

    #[async_trait]
    impl FallbackResolver for FailingFallback {
        async fn resolve_unknown(
            &self,
            _missing: &[String],
            _pool: &[String],
        ) -> Result<HashMap<String, Option<String>>> {
            Err(anyhow!("model unreachable"))
        }
    }

    fn pool(names: &[&str]) -> AvailableSet {
        names.iter().collect()
    }

    #[test]
    fn test_resolve_missing_statuses() {
        let resolver = SubstitutionResolver::default();
        let lines = ["2 slices bacon, crispy", "1 cup rice", "1 pinch saffron"];
        let resolution = resolver.resolve_missing(&lines, &pool(&["rice"]));

        assert_eq!(resolution.ingredients.len(), 3);
        assert_eq!(resolution.ingredients[0].status, IngredientStatus::Missing);
        assert_eq!(
            resolution.ingredients[0].substitution.as_deref(),
            Some("omit (add Oil for fat + Salt for flavor)")
        );
        assert_eq!(resolution.ingredients[1], ResolvedIngredient::available("1 cup rice"));
        assert_eq!(resolution.ingredients[2].substitution, None);
        assert_eq!(resolution.pending, vec!["saffron".to_string()]);
    }

    #[test]
    fn test_pending_is_deduplicated_and_skips_empty_names() {
        let resolver = SubstitutionResolver::default();
        let lines = ["1 pinch saffron", "saffron, to garnish", "2 cups"];
        let resolution = resolver.resolve_missing(&lines, &AvailableSet::new());
        assert_eq!(resolution.pending, vec!["saffron".to_string()]);
        assert_eq!(resolution.ingredients[2].status, IngredientStatus::Missing);
    }

    #[test]
    fn test_fallback_never_overwrites_table_hits() {
        let resolver = SubstitutionResolver::default();
        let mut resolution =
            resolver.resolve_missing(&["3 eggs", "1 tsp saffron"], &AvailableSet::new());
        let mapping = HashMap::from([
            ("eggs".to_string(), Some("flax seed".to_string())),
            ("Saffron".to_string(), Some("turmeric".to_string())),
        ]);

        assert_eq!(resolution.apply_fallback(&mapping), 1);
        assert_eq!(
            resolution.ingredients[0].substitution.as_deref(),
            Some("1/2 cup Applesauce")
        );
        assert_eq!(resolution.ingredients[1].substitution.as_deref(), Some("turmeric"));
    }

    #[test]
    fn test_fallback_ignores_null_and_blank_values() {
        let resolver = SubstitutionResolver::default();
        let mut resolution =
            resolver.resolve_missing(&["1 tsp saffron", "2 sprigs thyme"], &AvailableSet::new());
        let mapping = HashMap::from([
            ("saffron".to_string(), None),
            ("2 sprigs thyme".to_string(), Some("   ".to_string())),
        ]);
        assert_eq!(resolution.apply_fallback(&mapping), 0);
        assert!(resolution.ingredients.iter().all(|i| i.substitution.is_none()));
    }

    #[tokio::test]
    async fn test_resolve_with_fallback_merges_results() {
        let resolver = SubstitutionResolver::default();
        let fallback = FixedFallback(HashMap::from([(
            "saffron".to_string(),
            Some("pinch of turmeric".to_string()),
        )]));
        let result = resolver
            .resolve_with_fallback(
                &["1 tsp saffron", "rice"],
                &pool(&["rice"]),
                Some(&fallback as &dyn FallbackResolver),
            )
            .await;
        assert_eq!(result[0].substitution.as_deref(), Some("pinch of turmeric"));
        assert_eq!(result[1].status, IngredientStatus::Available);
    }

    #[tokio::test]
    async fn test_resolve_with_failing_fallback_degrades() {
        let resolver = SubstitutionResolver::default();
        let result = resolver
            .resolve_with_fallback(
                &["1 tsp saffron", "1 egg"],
                &AvailableSet::new(),
                Some(&FailingFallback as &dyn FallbackResolver),
            )
            .await;
        assert_eq!(result[0].status, IngredientStatus::Missing);
        assert_eq!(result[0].substitution, None);
        assert_eq!(result[1].substitution.as_deref(), Some("1/4 cup Applesauce"));
    }

    #[test]
    fn test_status_serializes_lowercase() -> Result<()> {
        let json = serde_json::to_string(&IngredientStatus::Available)?;
        assert_eq!(json, "\"available\"");
        Ok(())
    }
}
