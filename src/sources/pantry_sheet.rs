use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{InventorySource, PantryItemRecord};

const NAME_COL: &str = "Name";
const CATEGORY_COL: &str = "Category";
const AVAILABILITY_COL: &str = "Availability";

const DEFAULT_CATEGORY: &str = "Unknown";
const IN_STOCK: &str = "in stock";

/// Parses a pantry inventory export. Rows with a blank name are skipped; an item is available
/// only when its availability reads "In stock".
pub fn parse_pantry_sheet(data: &[u8]) -> Result<Vec<PantryItemRecord>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(data);
    let headers = rdr.headers()?.clone();

    let name_idx = headers
        .iter()
        .position(|h| h.trim() == NAME_COL)
        .ok_or_else(|| anyhow!("Column '{}' not found", NAME_COL))?;
    let category_idx = headers.iter().position(|h| h.trim() == CATEGORY_COL);
    let availability_idx = headers.iter().position(|h| h.trim() == AVAILABILITY_COL);

    let mut items = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record = result
            .with_context(|| format!("Failed to read pantry item at row index {}", row_index))?;

        let name = record.get(name_idx).unwrap_or_default().trim();
        if name.is_empty() {
            debug!("Skipping pantry row {} with an empty name", row_index + 1);
            continue;
        }
        let category = category_idx
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);
        let available = availability_idx
            .and_then(|i| record.get(i))
            .is_some_and(|a| a.trim().eq_ignore_ascii_case(IN_STOCK));

        items.push(PantryItemRecord {
            name: name.to_string(),
            category: category.to_string(),
            available,
        });
    }
    Ok(items)
}

/// Inventory source backed by a CSV export of the pantry database.
#[derive(Debug, Clone)]
pub struct CsvInventory {
    path: PathBuf,
}

impl CsvInventory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl InventorySource for CsvInventory {
    async fn fetch_inventory(&self) -> Result<Vec<PantryItemRecord>> {
        let data = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read pantry inventory at {:?}", self.path))?;
        let items = parse_pantry_sheet(&data)
            .with_context(|| format!("Failed to parse pantry inventory at {:?}", self.path))?;
        info!("Fetched {} pantry items from {:?}", items.len(), self.path);
        Ok(items)
    }
}
