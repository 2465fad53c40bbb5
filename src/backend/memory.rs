//! In-memory catalog backend with facet counting
use super::{ResourceSummary, SearchBackend, SearchRequest, SearchResult};
use crate::error::{CatalogError, SearchError};
use crate::facets::{FacetOption, FacetSelections};
use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

/// Options returned per facet category.
const FACET_LIMIT: usize = 10;

/// A resource as stored in the catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub summary: ResourceSummary,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub facets: BTreeMap<String, Vec<String>>,
}

impl CatalogEntry {
    fn matches_text(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.summary.title.to_lowercase().contains(needle)
            || self.abstract_text.to_lowercase().contains(needle)
    }

    fn has_any(&self, category: &str, wanted: &BTreeSet<&str>) -> bool {
        self.facets
            .get(category)
            .is_some_and(|values| values.iter().any(|v| wanted.contains(v.as_str())))
    }
}

/// Answers searches from a fixed list of entries.
///
/// Values are OR-ed within a category and categories are AND-ed. Each
/// category's counts are taken with every other category's filter applied
/// but not its own, so selecting one value never zeroes its siblings.
pub struct MemoryBackend {
    entries: Vec<CatalogEntry>,
    categories: BTreeSet<String>,
}

impl MemoryBackend {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let categories = entries
            .iter()
            .flat_map(|entry| entry.facets.keys().cloned())
            .collect();
        Self {
            entries,
            categories,
        }
    }

    /// Load a JSON array of catalog entries.
    pub fn from_path(path: &Path) -> crate::error::Result<Self> {
        let wrap = |source: Box<dyn std::error::Error + Send + Sync>| CatalogError::Catalog {
            path: path.to_path_buf(),
            source,
        };
        let content = fs::read_to_string(path).map_err(|e| wrap(Box::new(e)))?;
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(&content).map_err(|e| wrap(Box::new(e)))?;
        info!("Loaded {} catalog entries from {}", entries.len(), path.display());
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Active filters, restricted to categories the catalog knows about.
    fn filters<'a>(&self, selections: &'a FacetSelections) -> Vec<(&'a str, BTreeSet<&'a str>)> {
        selections
            .categories()
            .filter(|category| self.categories.contains(*category))
            .map(|category| (category, selections.values(category).collect()))
            .collect()
    }

    fn facet_counts(
        &self,
        text_matches: &[&CatalogEntry],
        filters: &[(&str, BTreeSet<&str>)],
    ) -> BTreeMap<String, Vec<FacetOption>> {
        let mut facets = BTreeMap::new();
        for category in &self.categories {
            let mut counts: HashMap<&str, u64> = HashMap::new();
            let others: Vec<_> = filters
                .iter()
                .filter(|(name, _)| *name != category.as_str())
                .collect();

            for entry in text_matches
                .iter()
                .filter(|entry| others.iter().all(|(name, wanted)| entry.has_any(name, wanted)))
            {
                for value in entry.facets.get(category).into_iter().flatten() {
                    *counts.entry(value.as_str()).or_insert(0) += 1;
                }
            }

            let mut options: Vec<FacetOption> = counts
                .into_iter()
                .map(|(value, count)| FacetOption::new(value, value, count))
                .collect();
            options.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
            options.truncate(FACET_LIMIT);
            facets.insert(category.clone(), options);
        }
        facets
    }
}

#[async_trait]
impl SearchBackend for MemoryBackend {
    async fn search(&self, request: SearchRequest) -> Result<SearchResult, SearchError> {
        let needle = request.text.to_lowercase();
        let filters = self.filters(&request.facets);

        let text_matches: Vec<&CatalogEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.matches_text(&needle))
            .collect();

        let hits: Vec<&CatalogEntry> = text_matches
            .iter()
            .copied()
            .filter(|entry| filters.iter().all(|(name, wanted)| entry.has_any(name, wanted)))
            .collect();

        let page_size = request.page_size.max(1) as usize;
        let start = (request.page.max(1) as usize - 1).saturating_mul(page_size);
        let items = hits
            .iter()
            .skip(start)
            .take(page_size)
            .map(|entry| entry.summary.clone())
            .collect();

        debug!(
            "memory search '{}' page {}: {} hits",
            request.text,
            request.page,
            hits.len()
        );

        Ok(SearchResult {
            items,
            total: hits.len() as u64,
            page_size: request.page_size.max(1),
            facets: self.facet_counts(&text_matches, &filters),
        })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, title: &str, kind: &str, provider: &str) -> CatalogEntry {
        let mut facets = BTreeMap::new();
        facets.insert("type".to_string(), vec![kind.to_string()]);
        facets.insert("provider".to_string(), vec![provider.to_string()]);
        CatalogEntry {
            summary: ResourceSummary {
                id: id.to_string(),
                title: title.to_string(),
                authors: vec![],
                date: None,
            },
            abstract_text: String::new(),
            facets,
        }
    }

    fn backend() -> MemoryBackend {
        MemoryBackend::new(vec![
            entry("1", "Water quality", "article", "usgs"),
            entry("2", "Water rights", "report", "usgs"),
            entry("3", "Groundwater", "article", "noaa"),
            entry("4", "Wildfire smoke", "dataset", "noaa"),
        ])
    }

    fn request(text: &str, facets: FacetSelections) -> SearchRequest {
        SearchRequest {
            text: text.to_string(),
            page: 1,
            page_size: 10,
            facets,
        }
    }

    fn count(result: &SearchResult, category: &str, value: &str) -> Option<u64> {
        result.facets[category]
            .iter()
            .find(|opt| opt.value == value)
            .map(|opt| opt.count)
    }

    #[tokio::test]
    async fn empty_text_matches_everything() {
        let result = backend().search(request("", FacetSelections::new())).await.unwrap();
        assert_eq!(result.total, 4);
    }

    #[tokio::test]
    async fn text_match_is_case_insensitive() {
        let result = backend().search(request("WATER", FacetSelections::new())).await.unwrap();
        assert_eq!(result.total, 3);
    }

    #[tokio::test]
    async fn own_category_filter_does_not_shrink_sibling_counts() {
        let facets: FacetSelections = [("type", "article")].into_iter().collect();
        let result = backend().search(request("water", facets)).await.unwrap();

        assert_eq!(result.total, 2);
        assert_eq!(count(&result, "type", "article"), Some(2));
        assert_eq!(count(&result, "type", "report"), Some(1));
        // provider counts do reflect the type filter
        assert_eq!(count(&result, "provider", "usgs"), Some(1));
        assert_eq!(count(&result, "provider", "noaa"), Some(1));
    }

    #[tokio::test]
    async fn values_within_a_category_are_alternatives() {
        let facets: FacetSelections =
            [("type", "article"), ("type", "dataset")].into_iter().collect();
        let result = backend().search(request("", facets)).await.unwrap();
        assert_eq!(result.total, 3);
    }

    #[tokio::test]
    async fn unknown_category_is_ignored() {
        let facets: FacetSelections = [("colour", "blue")].into_iter().collect();
        let result = backend().search(request("", facets)).await.unwrap();
        assert_eq!(result.total, 4);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let mut req = request("", FacetSelections::new());
        req.page = 3;
        req.page_size = 2;
        let result = backend().search(req).await.unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total, 4);
    }

    #[tokio::test]
    async fn second_page_skips_first() {
        let mut req = request("", FacetSelections::new());
        req.page = 2;
        req.page_size = 3;
        let result = backend().search(req).await.unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].id, "4");
    }

    #[test]
    fn loads_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(
            &path,
            r#"[{"id":"9","title":"Estuaries","abstract":"tidal mixing","facets":{"type":["article"]}}]"#,
        )
        .unwrap();

        let backend = MemoryBackend::from_path(&path).unwrap();
        assert_eq!(backend.len(), 1);
        assert_eq!(backend.entries[0].abstract_text, "tidal mixing");
    }

    #[test]
    fn bad_catalog_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, "{not json").unwrap();

        let err = MemoryBackend::from_path(&path).err().unwrap();
        assert!(err.to_string().contains("catalog.json"));
    }
}
