use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use csv::{ReaderBuilder, StringRecord};
use std::path::{Path, PathBuf};
use tracing::info;

use super::{RecipeCorpusSource, RecipeRecord};
use crate::ingredient_parser::split_lines;

// Column headers of the recipe sheet export. Headers are trimmed before matching.
const TITLE_COL: &str = "Recipe";
const INGREDIENTS_COL: &str = "Ingredients";
const PANTRY_COL: &str = "Ingredient(s) at The Pantry";
const PREPARATION_COL: &str = "Preparation";

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn cell(record: &StringRecord, idx: Option<usize>) -> &str {
    idx.and_then(|i| record.get(i)).unwrap_or_default()
}

/// Parses a recipe sheet export. Every row is returned, including rows with a blank title or
/// no ingredients; ranking is responsible for dropping those.
pub fn parse_recipe_sheet(data: &[u8]) -> Result<Vec<RecipeRecord>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(data);
    let headers = rdr.headers()?.clone();

    let title_idx = column_index(&headers, TITLE_COL)
        .ok_or_else(|| anyhow!("Column '{}' not found", TITLE_COL))?;
    let ingredients_idx = column_index(&headers, INGREDIENTS_COL)
        .ok_or_else(|| anyhow!("Column '{}' not found", INGREDIENTS_COL))?;
    let pantry_idx = column_index(&headers, PANTRY_COL);
    let preparation_idx = column_index(&headers, PREPARATION_COL);

    let mut recipes = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record =
            result.with_context(|| format!("Failed to read recipe at row index {}", row_index))?;
        recipes.push(RecipeRecord {
            id: format!("recipe_{:03}", row_index + 1),
            title: cell(&record, Some(title_idx)).trim().to_string(),
            ingredient_lines: split_lines(cell(&record, Some(ingredients_idx))),
            instructions: split_lines(cell(&record, preparation_idx)),
            pantry_ingredients: split_lines(cell(&record, pantry_idx)),
        });
    }
    Ok(recipes)
}

/// Recipe corpus backed by a CSV export of the recipe spreadsheet.
#[derive(Debug, Clone)]
pub struct CsvRecipeCorpus {
    path: PathBuf,
}

impl CsvRecipeCorpus {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl RecipeCorpusSource for CsvRecipeCorpus {
    async fn fetch_recipe_corpus(&self) -> Result<Vec<RecipeRecord>> {
        let data = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read recipe sheet at {:?}", self.path))?;
        let recipes = parse_recipe_sheet(&data)
            .with_context(|| format!("Failed to parse recipe sheet at {:?}", self.path))?;
        info!("Loaded {} recipe rows from {:?}", recipes.len(), self.path);
        Ok(recipes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SHEET: &str = "Recipe ,Ingredients,Ingredient(s) at The Pantry,Preparation\n\
\"BLT Salad\",\"2 slices bacon, crispy\n1 cup iceberg salad, shredded\n\",\"iceberg salad\",\"Cook bacon.\nToss.\"\n\
,\"1 egg\",,\n\
\"Plain Rice\",,,\"Boil water.\"\n";

    #[test]
    fn test_parse_recipe_sheet_rows() -> Result<()> {
        let recipes = parse_recipe_sheet(SHEET.as_bytes())?;
        assert_eq!(recipes.len(), 3);

        let blt = &recipes[0];
        assert_eq!(blt.id, "recipe_001");
        assert_eq!(blt.title, "BLT Salad");
        assert_eq!(
            blt.ingredient_lines,
            vec!["2 slices bacon, crispy", "1 cup iceberg salad, shredded"]
        );
        assert_eq!(blt.pantry_ingredients, vec!["iceberg salad"]);
        assert_eq!(blt.instructions, vec!["Cook bacon.", "Toss."]);

        // malformed rows are kept for the scorer to drop
        assert_eq!(recipes[1].title, "");
        assert_eq!(recipes[1].id, "recipe_002");
        assert!(recipes[2].ingredient_lines.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_recipe_sheet_missing_column() {
        let result = parse_recipe_sheet(b"Recipe,Preparation\nToast,Toast it\n");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains(&format!("Column '{}' not found", INGREDIENTS_COL)));
    }

    #[tokio::test]
    async fn test_csv_recipe_corpus_reads_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, "{}", SHEET)?;
        file.flush()?;

        let corpus = CsvRecipeCorpus::new(file.path());
        let recipes = corpus.fetch_recipe_corpus().await?;
        assert_eq!(recipes.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_csv_recipe_corpus_missing_file() {
        let corpus = CsvRecipeCorpus::new("this_recipe_sheet_does_not_exist.csv");
        assert!(corpus.fetch_recipe_corpus().await.is_err());
    }
}
