//! Facet selection model and the facet panel's visible options
use crate::query::is_reserved_param;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One selectable value of a facet category, as offered by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOption {
    pub label: String,
    pub value: String,
    pub count: u64,
}

impl FacetOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            count,
        }
    }
}

/// A facet category with its options in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCategory {
    pub name: String,
    pub options: Vec<FacetOption>,
}

/// Per-category set of selected facet values.
///
/// A category whose last value is removed disappears from the map, so two
/// selections with the same chosen values always compare equal. Empty
/// categories, empty values and reserved address parameters (`query`,
/// `page`, `page_size`) are never stored, so every selection survives a
/// trip through the address and never clashes with request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FacetSelections(BTreeMap<String, BTreeSet<String>>);

impl FacetSelections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `category=value` can be selected at all.
    pub fn is_selectable(category: &str, value: &str) -> bool {
        !category.is_empty() && !value.is_empty() && !is_reserved_param(category)
    }

    /// Flip `value` within `category`, returning the updated selections.
    /// Unselectable pairs leave the selections unchanged.
    pub fn toggle(&self, category: &str, value: &str) -> FacetSelections {
        let mut next = self.clone();
        next.toggle_in_place(category, value);
        next
    }

    fn toggle_in_place(&mut self, category: &str, value: &str) {
        if !Self::is_selectable(category, value) {
            return;
        }
        let values = self.0.entry(category.to_string()).or_default();
        if !values.remove(value) {
            values.insert(value.to_string());
        }
        if values.is_empty() {
            self.0.remove(category);
        }
    }

    /// Add a value without toggling; used when parsing addresses and flags.
    pub fn insert(&mut self, category: &str, value: &str) {
        if !Self::is_selectable(category, value) {
            return;
        }
        self.0
            .entry(category.to_string())
            .or_default()
            .insert(value.to_string());
    }

    pub fn is_selected(&self, category: &str, value: &str) -> bool {
        self.0
            .get(category)
            .is_some_and(|values| values.contains(value))
    }

    pub fn values(&self, category: &str) -> impl Iterator<Item = &str> {
        self.0
            .get(category)
            .into_iter()
            .flat_map(|values| values.iter().map(String::as_str))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Every selected `(category, value)` pair in a stable order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().flat_map(|(category, values)| {
            values
                .iter()
                .map(move |value| (category.as_str(), value.as_str()))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }
}

impl<C, V> FromIterator<(C, V)> for FacetSelections
where
    C: AsRef<str>,
    V: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut selections = FacetSelections::new();
        for (category, value) in iter {
            selections.insert(category.as_ref(), value.as_ref());
        }
        selections
    }
}

/// Options to show in the facet panel.
///
/// Starts from what the last response offered and appends any selected value
/// the response no longer mentions (with a zero count) so it can still be
/// deselected. Categories that only exist in the selection are included too.
pub fn visible_facets(
    offered: &BTreeMap<String, Vec<FacetOption>>,
    selections: &FacetSelections,
) -> Vec<FacetCategory> {
    let mut names: BTreeSet<&str> = offered.keys().map(String::as_str).collect();
    names.extend(selections.categories());

    names
        .into_iter()
        .map(|name| {
            let mut options = offered.get(name).cloned().unwrap_or_default();
            for selected in selections.values(name) {
                if !options.iter().any(|opt| opt.value == selected) {
                    options.push(FacetOption::new(selected, selected, 0));
                }
            }
            FacetCategory {
                name: name.to_string(),
                options,
            }
        })
        .collect()
}
