use crate::CategoryId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category selection. Only explicit toggles are stored; a category without an
/// entry counts as selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    entries: BTreeMap<CategoryId, bool>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, id: CategoryId) -> bool {
        self.entries.get(&id).copied().unwrap_or(true)
    }

    pub fn explicit(&self, id: CategoryId) -> Option<bool> {
        self.entries.get(&id).copied()
    }

    pub fn set(&mut self, id: CategoryId, selected: bool) {
        self.entries.insert(id, selected);
    }

    /// Flips the effective selection and returns the new value.
    pub fn toggle(&mut self, id: CategoryId) -> bool {
        let next = !self.is_selected(id);
        self.set(id, next);
        next
    }

    pub fn none_selected(&self) -> bool {
        CategoryId::ALL.into_iter().all(|id| !self.is_selected(id))
    }

    /// Builds a filter set from persisted string keys, skipping categories
    /// this build does not know about.
    pub fn from_raw(raw: &BTreeMap<String, bool>) -> Self {
        let entries = raw
            .iter()
            .filter_map(|(key, selected)| key.parse::<CategoryId>().ok().map(|id| (id, *selected)))
            .collect();
        Self { entries }
    }

    pub fn to_raw(&self) -> BTreeMap<String, bool> {
        self.entries
            .iter()
            .map(|(id, selected)| (id.as_str().to_string(), *selected))
            .collect()
    }
}

impl FromIterator<(CategoryId, bool)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (CategoryId, bool)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_entries_fail_open() {
        let filters = FilterSet::new();
        assert!(CategoryId::ALL.into_iter().all(|id| filters.is_selected(id)));
        assert_eq!(filters.explicit(CategoryId::Dare), None);
    }

    #[test]
    fn toggle_off_then_on_keeps_explicit_entry() {
        let mut filters = FilterSet::new();
        assert!(!filters.toggle(CategoryId::Dare));
        assert!(filters.toggle(CategoryId::Dare));
        assert_eq!(filters.explicit(CategoryId::Dare), Some(true));
        assert_ne!(filters, FilterSet::new());
    }

    #[test]
    fn raw_map_skips_unknown_keys() {
        let mut raw = BTreeMap::new();
        raw.insert("truth".to_string(), false);
        raw.insert("karaoke".to_string(), false);
        let filters = FilterSet::from_raw(&raw);
        assert!(!filters.is_selected(CategoryId::Truth));
        assert_eq!(filters.to_raw().len(), 1);
    }

    #[test]
    fn none_selected_requires_every_category_off() {
        let mut filters: FilterSet = CategoryId::ALL.into_iter().map(|id| (id, false)).collect();
        assert!(filters.none_selected());
        filters.set(CategoryId::Group, true);
        assert!(!filters.none_selected());
    }
}
