pub mod pantry_sheet;
pub mod recipe_sheet;

pub use pantry_sheet::CsvInventory;
pub use recipe_sheet::CsvRecipeCorpus;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A pantry stock line as reported by the inventory source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PantryItemRecord {
    pub name: String,
    pub category: String,
    pub available: bool,
}

/// One row of the recipe corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub id: String,
    pub title: String,
    pub ingredient_lines: Vec<String>,
    pub instructions: Vec<String>,
    /// Subset of the ingredients the pantry stocks, as listed by the sheet.
    #[serde(default)]
    pub pantry_ingredients: Vec<String>,
}

#[async_trait]
pub trait InventorySource: Send + Sync {
    async fn fetch_inventory(&self) -> Result<Vec<PantryItemRecord>>;
}

#[async_trait]
pub trait RecipeCorpusSource: Send + Sync {
    async fn fetch_recipe_corpus(&self) -> Result<Vec<RecipeRecord>>;
}

/// Proposes substitutions for ingredients the static table does not know.
///
/// The mapping is keyed by canonical ingredient name; `None` means no reasonable swap exists.
#[async_trait]
pub trait FallbackResolver: Send + Sync {
    async fn resolve_unknown(
        &self,
        missing: &[String],
        pool: &[String],
    ) -> Result<HashMap<String, Option<String>>>;
}

/// Fixed in-memory inventory, e.g. when no pantry export is configured.
#[derive(Debug, Clone, Default)]
pub struct StaticInventory(pub Vec<PantryItemRecord>);

#[async_trait]
impl InventorySource for StaticInventory {
    async fn fetch_inventory(&self) -> Result<Vec<PantryItemRecord>> {
        Ok(self.0.clone())
    }
}

#[async_trait]
impl<T: InventorySource> InventorySource for Option<T> {
    async fn fetch_inventory(&self) -> Result<Vec<PantryItemRecord>> {
        match self {
            Some(source) => source.fetch_inventory().await,
            None => Ok(Vec::new()),
        }
    }
}
