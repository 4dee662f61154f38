pub mod collate;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use thiserror::Error;

use crate::config::SeedItem;

/// A single shopping list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub text: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Item {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            checked: false,
            category: None,
        }
    }

    /// Case-insensitive identity key
    pub fn key(&self) -> String {
        normalize(&self.text)
    }
}

/// Rejected list operations. The display text is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("You can't add an empty item to the list")]
    EmptyItem,

    #[error("{existing} {} already on the list", verb_for(.requested))]
    DuplicateUnchecked { existing: String, requested: String },

    #[error("{0} is not on the list")]
    NotFound(String),
}

/// Successful result of [`ListModel::add`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(Item),
    /// The item was already on the list and checked; it has been unchecked
    UncheckedInstead(Item),
}

impl AddOutcome {
    pub fn item(&self) -> &Item {
        match self {
            AddOutcome::Added(item) | AddOutcome::UncheckedInstead(item) => item,
        }
    }

    /// Notice the user should see, if any
    pub fn notice(&self) -> Option<String> {
        match self {
            AddOutcome::Added(_) => None,
            AddOutcome::UncheckedInstead(item) => Some(format!("Unchecked {}", item.text)),
        }
    }
}

/// "are" when the text ends in `s`, otherwise "is"
fn verb_for(text: &str) -> &'static str {
    if text.ends_with('s') {
        "are"
    } else {
        "is"
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn clean_category(category: &str) -> Option<String> {
    let category = category.trim();
    if category.is_empty() {
        None
    } else {
        Some(category.to_string())
    }
}

/// Authoritative list state.
///
/// Items live in a map keyed by their lowercased text. Order is kept as two
/// key sequences: unchecked items sorted by [`collate::compare`], then checked
/// items in the order they were checked.
#[derive(Debug, Clone, Default)]
pub struct ListModel {
    items: HashMap<String, Item>,
    unchecked: Vec<String>,
    checked: Vec<String>,
}

impl ListModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from seed entries: everything is added unchecked first,
    /// then the checked seeds are checked in seed order
    pub fn from_seed<'a>(seeds: impl IntoIterator<Item = &'a SeedItem>) -> Self {
        let mut list = Self::new();
        let mut to_check = Vec::new();

        for seed in seeds {
            match list.add(&seed.text, seed.category.as_deref()) {
                Ok(outcome) => {
                    if seed.checked {
                        to_check.push(outcome.item().text.clone());
                    }
                }
                Err(e) => tracing::warn!("Skipping seed item {:?}: {}", seed.text, e),
            }
        }

        for text in to_check {
            if let Err(e) = list.set_checked(&text, true) {
                tracing::warn!("Could not check seed item {:?}: {}", text, e);
            }
        }

        list
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, text: &str) -> Option<&Item> {
        self.items.get(&normalize(text))
    }

    /// Unchecked items in sorted order
    pub fn unchecked(&self) -> impl Iterator<Item = &Item> {
        self.unchecked.iter().filter_map(|key| self.items.get(key))
    }

    /// Checked items in check order
    pub fn checked(&self) -> impl Iterator<Item = &Item> {
        self.checked.iter().filter_map(|key| self.items.get(key))
    }

    /// All items, unchecked first
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.unchecked().chain(self.checked())
    }

    pub fn has_checked_items(&self) -> bool {
        !self.checked.is_empty()
    }

    /// Add an item, or uncheck it if it's already on the list and checked
    pub fn add(&mut self, text: &str, category: Option<&str>) -> Result<AddOutcome, ListError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ListError::EmptyItem);
        }

        let key = normalize(text);
        if let Some(existing) = self.items.get(&key) {
            if !existing.checked {
                return Err(ListError::DuplicateUnchecked {
                    existing: existing.text.clone(),
                    requested: text.to_string(),
                });
            }
            self.set_checked(text, false)?;
            let item = self
                .items
                .get(&key)
                .cloned()
                .ok_or_else(|| ListError::NotFound(text.to_string()))?;
            tracing::debug!("Unchecked {} instead of adding it", item.text);
            return Ok(AddOutcome::UncheckedInstead(item));
        }

        let mut item = Item::new(text);
        item.category = category.and_then(clean_category);

        let idx = self.insert_index(text);
        self.unchecked.insert(idx, key.clone());
        self.items.insert(key, item.clone());
        tracing::debug!("Added {} at position {}", item.text, idx);

        Ok(AddOutcome::Added(item))
    }

    /// Remove an item. Returns the removed item, `None` if it wasn't there.
    pub fn remove(&mut self, text: &str) -> Option<Item> {
        let key = normalize(text);
        let item = self.items.remove(&key)?;
        self.unchecked.retain(|k| *k != key);
        self.checked.retain(|k| *k != key);
        tracing::debug!("Removed {}", item.text);
        Some(item)
    }

    /// Move an item between the unchecked and checked lists.
    /// Returns whether anything changed.
    pub fn set_checked(&mut self, text: &str, checked: bool) -> Result<bool, ListError> {
        let key = normalize(text);
        let item = self
            .items
            .get_mut(&key)
            .ok_or_else(|| ListError::NotFound(text.trim().to_string()))?;

        if item.checked == checked {
            return Ok(false);
        }
        item.checked = checked;
        let item_text = item.text.clone();

        if checked {
            self.unchecked.retain(|k| *k != key);
            self.checked.push(key);
            tracing::debug!("Checked {}", item_text);
        } else {
            self.checked.retain(|k| *k != key);
            let idx = self.insert_index(&item_text);
            self.unchecked.insert(idx, key);
            tracing::debug!("Unchecked {} into position {}", item_text, idx);
        }

        Ok(true)
    }

    /// Flip an item's checked state. Returns the new state.
    pub fn toggle_checked(&mut self, text: &str) -> Result<bool, ListError> {
        let current = self
            .get(text)
            .map(|item| item.checked)
            .ok_or_else(|| ListError::NotFound(text.trim().to_string()))?;
        self.set_checked(text, !current)?;
        Ok(!current)
    }

    /// Set or replace an item's category. A blank category clears it.
    pub fn set_category(&mut self, text: &str, category: &str) -> Result<(), ListError> {
        let item = self
            .items
            .get_mut(&normalize(text))
            .ok_or_else(|| ListError::NotFound(text.trim().to_string()))?;
        item.category = clean_category(category);
        tracing::debug!("Category of {} is now {:?}", item.text, item.category);
        Ok(())
    }

    /// First unchecked position whose text sorts after `text`.
    /// Equal texts keep insertion order.
    fn insert_index(&self, text: &str) -> usize {
        self.unchecked
            .iter()
            .position(|key| {
                self.items
                    .get(key)
                    .map(|item| collate::compare(&item.text, text) == Ordering::Greater)
                    .unwrap_or(false)
            })
            .unwrap_or(self.unchecked.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(items: impl Iterator<Item = &'a Item>) -> Vec<&'a str> {
        items.map(|i| i.text.as_str()).collect()
    }

    fn shopping() -> ListModel {
        let mut list = ListModel::new();
        list.add("apples", None).unwrap();
        list.add("oranges", None).unwrap();
        list.add("bread", None).unwrap();
        list
    }

    #[test]
    fn test_empty_item_rejected() {
        let mut list = ListModel::new();
        assert_eq!(list.add("", None), Err(ListError::EmptyItem));
        assert_eq!(list.add("   ", None), Err(ListError::EmptyItem));
        assert!(list.is_empty());
    }

    #[test]
    fn test_text_is_trimmed() {
        let mut list = ListModel::new();
        let outcome = list.add("  eggs \t", None).unwrap();
        assert_eq!(outcome.item().text, "eggs");
        assert!(list.get("EGGS").is_some());
    }

    #[test]
    fn test_duplicate_unchecked_rejected() {
        let mut list = ListModel::new();
        list.add("Milk", None).unwrap();

        let err = list.add("milk", None).unwrap_err();
        assert_eq!(
            err,
            ListError::DuplicateUnchecked {
                existing: "Milk".to_string(),
                requested: "milk".to_string(),
            }
        );
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("milk").unwrap().text, "Milk");
    }

    #[test]
    fn test_duplicate_warning_pluralization() {
        let mut list = ListModel::new();
        list.add("Milk", None).unwrap();
        list.add("apples", None).unwrap();
        list.add("hummus", None).unwrap();

        let warning = |list: &mut ListModel, text: &str| {
            list.add(text, None).unwrap_err().to_string()
        };

        assert_eq!(warning(&mut list, "milk"), "Milk is already on the list");
        assert_eq!(warning(&mut list, "Apples"), "apples are already on the list");
        // Heuristic only looks at the last letter
        assert_eq!(warning(&mut list, "hummus"), "hummus are already on the list");
        assert_eq!(warning(&mut list, "APPLES"), "apples is already on the list");
    }

    #[test]
    fn test_unchecked_items_are_sorted() {
        let list = shopping();
        assert_eq!(texts(list.unchecked()), vec!["apples", "bread", "oranges"]);
        assert!(!list.has_checked_items());
    }

    #[test]
    fn test_accented_items_sort_by_base_letter() {
        let mut list = ListModel::new();
        for text in ["éclair", "fig", "Äpfel", "bread"] {
            list.add(text, None).unwrap();
        }
        assert_eq!(texts(list.unchecked()), vec!["Äpfel", "bread", "éclair", "fig"]);

        list.set_checked("éclair", true).unwrap();
        list.add("crème fraîche", None).unwrap();
        list.set_checked("éclair", false).unwrap();
        assert_eq!(
            texts(list.unchecked()),
            vec!["Äpfel", "bread", "crème fraîche", "éclair", "fig"]
        );
    }

    #[test]
    fn test_sorting_ignores_case() {
        let mut list = ListModel::new();
        list.add("Milk", None).unwrap();
        list.add("apples", None).unwrap();
        list.add("Zucchini", None).unwrap();
        list.add("bread", None).unwrap();
        assert_eq!(texts(list.unchecked()), vec!["apples", "bread", "Milk", "Zucchini"]);
    }

    #[test]
    fn test_check_moves_to_end_of_checked() {
        let mut list = shopping();
        assert_eq!(list.set_checked("oranges", true), Ok(true));
        assert_eq!(list.set_checked("apples", true), Ok(true));

        assert!(list.has_checked_items());
        assert_eq!(texts(list.unchecked()), vec!["bread"]);
        // Check order, not sorted
        assert_eq!(texts(list.checked()), vec!["oranges", "apples"]);
        assert_eq!(texts(list.items()), vec!["bread", "oranges", "apples"]);
    }

    #[test]
    fn test_add_checked_item_unchecks_it() {
        let mut list = shopping();
        list.set_checked("apples", true).unwrap();

        let outcome = list.add("Apples", None).unwrap();
        assert!(matches!(outcome, AddOutcome::UncheckedInstead(ref item) if item.text == "apples"));
        assert_eq!(outcome.notice().as_deref(), Some("Unchecked apples"));
        assert_eq!(texts(list.unchecked()), vec!["apples", "bread", "oranges"]);
        assert!(!list.has_checked_items());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_category_survives_check_roundtrip() {
        let mut list = shopping();
        list.set_category("bread", "Bakery").unwrap();
        list.set_checked("bread", true).unwrap();
        list.set_checked("bread", false).unwrap();

        let bread = list.get("bread").unwrap();
        assert_eq!(bread.category.as_deref(), Some("Bakery"));
        assert!(!bread.checked);
        assert_eq!(texts(list.unchecked()), vec!["apples", "bread", "oranges"]);
    }

    #[test]
    fn test_set_checked_is_idempotent() {
        let mut list = shopping();
        list.add("milk", None).unwrap();
        list.set_checked("apples", true).unwrap();
        list.set_checked("milk", true).unwrap();

        assert_eq!(list.set_checked("apples", true), Ok(false));
        assert_eq!(texts(list.checked()), vec!["apples", "milk"]);
        assert_eq!(list.set_checked("bread", false), Ok(false));
        assert_eq!(texts(list.unchecked()), vec!["bread", "oranges"]);
    }

    #[test]
    fn test_toggle_checked() {
        let mut list = shopping();
        assert_eq!(list.toggle_checked("BREAD"), Ok(true));
        assert!(list.get("bread").unwrap().checked);
        assert_eq!(list.toggle_checked("bread"), Ok(false));
        assert_eq!(texts(list.unchecked()), vec!["apples", "bread", "oranges"]);
    }

    #[test]
    fn test_missing_items_are_not_found() {
        let mut list = shopping();
        assert_eq!(list.remove("cheese"), None);
        assert_eq!(
            list.set_checked("cheese", true),
            Err(ListError::NotFound("cheese".to_string()))
        );
        assert!(matches!(list.toggle_checked("cheese"), Err(ListError::NotFound(_))));
        assert!(matches!(list.set_category("cheese", "Dairy"), Err(ListError::NotFound(_))));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_remove_from_either_list() {
        let mut list = shopping();
        list.set_checked("bread", true).unwrap();

        assert_eq!(list.remove("Bread").map(|i| i.text), Some("bread".to_string()));
        assert!(!list.has_checked_items());
        assert_eq!(list.remove("apples").map(|i| i.text), Some("apples".to_string()));
        assert_eq!(texts(list.items()), vec!["oranges"]);
    }

    #[test]
    fn test_category_replace_and_clear() {
        let mut list = shopping();
        list.set_category("apples", "  Fruit ").unwrap();
        assert_eq!(list.get("apples").unwrap().category.as_deref(), Some("Fruit"));

        list.set_category("apples", "Produce").unwrap();
        assert_eq!(list.get("apples").unwrap().category.as_deref(), Some("Produce"));

        list.set_category("apples", "   ").unwrap();
        assert_eq!(list.get("apples").unwrap().category, None);
    }

    #[test]
    fn test_add_with_category() {
        let mut list = ListModel::new();
        let outcome = list.add("cheddar", Some("Dairy")).unwrap();
        assert_eq!(outcome.item().category.as_deref(), Some("Dairy"));
        let outcome = list.add("ham", Some(" ")).unwrap();
        assert_eq!(outcome.item().category, None);
    }

    #[test]
    fn test_uncheck_reinserts_in_sorted_position() {
        let mut list = ListModel::new();
        list.add("bread", None).unwrap();
        list.add("Apple pie", None).unwrap();
        list.set_checked("bread", true).unwrap();
        list.add("apple", None).unwrap();
        list.set_checked("bread", false).unwrap();
        assert_eq!(texts(list.unchecked()), vec!["apple", "Apple pie", "bread"]);
    }

    #[test]
    fn test_from_seed() {
        let seeds = vec![
            SeedItem { text: "oranges".into(), checked: true, category: None },
            SeedItem { text: "apples".into(), checked: false, category: Some("Fruit".into()) },
            SeedItem { text: "   ".into(), checked: false, category: None },
            SeedItem { text: "milk".into(), checked: true, category: None },
            SeedItem { text: "Apples".into(), checked: true, category: None },
            SeedItem { text: "bread".into(), checked: false, category: None },
        ];

        let list = ListModel::from_seed(&seeds);
        assert_eq!(texts(list.unchecked()), vec!["apples", "bread"]);
        assert_eq!(texts(list.checked()), vec!["oranges", "milk"]);
        assert_eq!(list.get("apples").unwrap().category.as_deref(), Some("Fruit"));
    }

    #[test]
    fn test_serialize_item() {
        let mut list = ListModel::new();
        list.add("bread", Some("Bakery")).unwrap();
        list.add("milk", None).unwrap();

        let json = serde_json::to_value(list.items().collect::<Vec<_>>()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "text": "bread", "checked": false, "category": "Bakery" },
                { "text": "milk", "checked": false }
            ])
        );
    }
}
