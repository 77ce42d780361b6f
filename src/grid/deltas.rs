use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{OperatorCode, SortDirection};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridFilter {
    pub field: String,
    pub operator: OperatorCode,
    pub value: String,
}

impl GridFilter {
    pub fn new(field: &str, operator: OperatorCode, value: &str) -> Self {
        Self { field: field.to_string(), operator, value: value.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSort {
    pub field: String,
    pub direction: SortDirection,
}

impl GridSort {
    pub fn new(field: &str, direction: SortDirection) -> Self {
        Self { field: field.to_string(), direction }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridGroup {
    pub field: String,
}

impl GridGroup {
    pub fn new(field: &str) -> Self {
        Self { field: field.to_string() }
    }
}

/// Live grid edits, at most one per field and kind. Setting a delta for a
/// field that already has one replaces it in place.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDeltas {
    filters: IndexMap<String, GridFilter>,
    sorts: IndexMap<String, GridSort>,
    groups: IndexMap<String, GridGroup>,
}

fn key(field: &str) -> String {
    field.trim().to_lowercase()
}

impl GridDeltas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_filter(&mut self, filter: GridFilter) {
        self.filters.insert(key(&filter.field), filter);
    }

    pub fn remove_filter(&mut self, field: &str) -> Option<GridFilter> {
        self.filters.shift_remove(&key(field))
    }

    pub fn set_sort(&mut self, sort: GridSort) {
        self.sorts.insert(key(&sort.field), sort);
    }

    pub fn remove_sort(&mut self, field: &str) -> Option<GridSort> {
        self.sorts.shift_remove(&key(field))
    }

    pub fn set_group(&mut self, group: GridGroup) {
        self.groups.insert(key(&group.field), group);
    }

    pub fn remove_group(&mut self, field: &str) -> Option<GridGroup> {
        self.groups.shift_remove(&key(field))
    }

    pub fn clear(&mut self) {
        self.filters.clear();
        self.sorts.clear();
        self.groups.clear();
    }

    pub fn filters(&self) -> impl Iterator<Item = &GridFilter> {
        self.filters.values()
    }

    pub fn sorts(&self) -> impl Iterator<Item = &GridSort> {
        self.sorts.values()
    }

    pub fn groups(&self) -> impl Iterator<Item = &GridGroup> {
        self.groups.values()
    }

    pub fn has_sorts(&self) -> bool {
        !self.sorts.is_empty()
    }

    pub fn has_groups(&self) -> bool {
        !self.groups.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.sorts.is_empty() && self.groups.is_empty()
    }
}
