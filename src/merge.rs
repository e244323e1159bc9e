use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::sources::PantryItemRecord;

/// Deduplicates `primary` followed by `secondary` by key.
///
/// The first record seen for a key claims that key's position in the output. A later record with
/// the same key replaces it only when `prefer(existing, candidate)` returns true.
pub fn merge_by_key<T, K, F, P>(primary: Vec<T>, secondary: Vec<T>, key_fn: F, prefer: P) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
    P: Fn(&T, &T) -> bool,
{
    let mut merged: Vec<T> = Vec::with_capacity(primary.len() + secondary.len());
    let mut positions: HashMap<K, usize> = HashMap::new();

    for record in primary.into_iter().chain(secondary) {
        let key = key_fn(&record);
        match positions.get(&key) {
            Some(&idx) => {
                if prefer(&merged[idx], &record) {
                    merged[idx] = record;
                }
            }
            None => {
                positions.insert(key, merged.len());
                merged.push(record);
            }
        }
    }
    merged
}

/// Collapses pantry records sharing a case-insensitive name, preferring an in-stock duplicate.
pub fn merge_pantry_records(records: Vec<PantryItemRecord>) -> Vec<PantryItemRecord> {
    merge_by_key(
        records,
        Vec::new(),
        |item| item.name.to_lowercase(),
        |existing, candidate| candidate.available && !existing.available,
    )
}

/// An item a detector spotted in a scanned image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedItem {
    pub name: String,
    pub confidence: f32,
}

/// Combines the primary detector's items with the secondary's; the secondary only fills names
/// the primary did not report.
pub fn merge_identified_items(
    primary: Vec<IdentifiedItem>,
    secondary: Vec<IdentifiedItem>,
) -> Vec<IdentifiedItem> {
    merge_by_key(primary, secondary, |item| item.name.to_lowercase(), |_, _| false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemSource {
    Pantry,
    Personal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedItem {
    pub name: String,
    pub confidence: f32,
    pub source: ItemSource,
}

/// Marks each identified item as pantry stock or a personal item.
pub fn tag_sources(items: &[IdentifiedItem], pantry_names: &HashSet<String>) -> Vec<TaggedItem> {
    items
        .iter()
        .map(|item| TaggedItem {
            name: item.name.clone(),
            confidence: item.confidence,
            source: if pantry_names.contains(&item.name.to_lowercase()) {
                ItemSource::Pantry
            } else {
                ItemSource::Personal
            },
        })
        .collect()
}
