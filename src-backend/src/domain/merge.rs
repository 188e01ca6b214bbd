//! Merge Reconciliation (pure part)
//!
//! Turns the current item set and an AI-proposed target set into the minimal
//! add/delete sets. Items are matched by normalized name only; an item present
//! on both sides is never touched, whatever `purchased` value the target echoes.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::item::{normalize_name, ShoppingListItem, NAME_MAX_CHARS};

/// Cap on how many target entries are considered, in response order
pub const DEFAULT_MAX_TARGET_ITEMS: usize = 50;

/// An item proposed by the completion capability; it has no id yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeCandidate {
    pub name: String,
    #[serde(default)]
    pub purchased: bool,
}

impl MergeCandidate {
    pub fn new(name: impl Into<String>, purchased: bool) -> Self {
        Self {
            name: name.into(),
            purchased,
        }
    }
}

/// Target item set after cleanup: trimmed, non-empty, deduplicated, bounded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetList {
    items: Vec<MergeCandidate>,
}

impl TargetList {
    /// Cleans raw candidates:
    /// names are trimmed, empty names dropped and names over the limit cut on a
    /// char boundary; entries whose key was already seen are dropped (first wins);
    /// at most `max_items` entries are kept.
    pub fn from_candidates(candidates: Vec<MergeCandidate>, max_items: usize) -> Self {
        let mut seen = HashSet::new();
        let mut items = Vec::new();

        for candidate in candidates {
            if items.len() == max_items {
                break;
            }
            let name: String = candidate.name.trim().chars().take(NAME_MAX_CHARS).collect();
            let name = name.trim_end().to_string();
            if name.is_empty() {
                continue;
            }
            if !seen.insert(normalize_name(&name)) {
                continue;
            }
            items.push(MergeCandidate {
                name,
                purchased: candidate.purchased,
            });
        }

        Self { items }
    }

    pub fn items(&self) -> &[MergeCandidate] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Store mutations needed to move the current set to the target set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub to_add: Vec<MergeCandidate>,
    pub to_delete: Vec<String>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_delete.is_empty()
    }
}

/// Computes the add/delete sets.
///
/// `to_add` follows target order, `to_delete` follows current order, so the
/// result is a pure function of its inputs.
pub fn compute_diff(current: &[ShoppingListItem], target: &TargetList) -> DiffResult {
    // normalized name -> (id, purchased); the first item wins on duplicate names
    let mut current_by_key: HashMap<String, (&str, bool)> = HashMap::new();
    for item in current {
        current_by_key
            .entry(item.normalized_name())
            .or_insert((item.id.as_str(), item.purchased));
    }

    let target_keys: HashSet<String> = target.items().iter().map(|c| normalize_name(&c.name)).collect();

    let to_add = target
        .items()
        .iter()
        .filter(|c| !current_by_key.contains_key(&normalize_name(&c.name)))
        .cloned()
        .collect();

    let to_delete = current
        .iter()
        .filter(|item| !target_keys.contains(&item.normalized_name()))
        .map(|item| item.id.clone())
        .collect();

    DiffResult { to_add, to_delete }
}
