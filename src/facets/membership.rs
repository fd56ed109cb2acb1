//! Category membership adapter.
//!
//! Judgment data often lacks an explicit list of which facets a query
//! exercises. A [`CategorySource`] (typically a [`CategoryTable`] loaded from
//! a hand-labelled file) fills in the gaps before facet aggregation.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::config::read_structured;
use crate::error::{ErrorContext, Result};

use super::aggregator::FacetQuery;

/// Canonical facet key for a human label.
///
/// Lowercases and turns every non-alphanumeric character into `_`, so
/// `"Main Dish / Cuisine"` becomes `main_dish___cuisine`.
#[must_use]
pub fn facet_key(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn query_key(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Anything that can say which facets a query belongs to.
pub trait CategorySource {
    /// Facet keys for `query`, or `None` when the source does not know it.
    fn categories_for(&self, query: &str) -> Option<BTreeSet<String>>;
}

/// Query to category labels, matched case- and whitespace-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTable {
    entries: HashMap<String, BTreeSet<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelList {
    Joined(String),
    Many(Vec<String>),
}

impl LabelList {
    fn into_labels(self) -> Vec<String> {
        match self {
            Self::Joined(joined) => joined.split(',').map(str::to_string).collect(),
            Self::Many(labels) => labels,
        }
    }
}

impl CategoryTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(query, labels)` pairs. Repeated queries merge their labels.
    pub fn from_entries<Q, L, S>(entries: impl IntoIterator<Item = (Q, L)>) -> Self
    where
        Q: AsRef<str>,
        L: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for (query, labels) in entries {
            table.insert(query.as_ref(), labels);
        }
        table
    }

    /// Load a YAML or JSON mapping of query to labels.
    ///
    /// Labels may be a list or one comma-separated string.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw: HashMap<String, LabelList> = read_structured(path)
            .with_context(|| format!("loading category table {}", path.display()))?;
        Ok(Self::from_entries(
            raw.into_iter().map(|(query, labels)| (query, labels.into_labels())),
        ))
    }

    pub fn insert<S: AsRef<str>>(&mut self, query: &str, labels: impl IntoIterator<Item = S>) {
        let keys = labels
            .into_iter()
            .map(|l| facet_key(l.as_ref()))
            .filter(|k| !k.is_empty());
        self.entries.entry(query_key(query)).or_default().extend(keys);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CategorySource for CategoryTable {
    fn categories_for(&self, query: &str) -> Option<BTreeSet<String>> {
        self.entries.get(&query_key(query)).cloned()
    }
}

/// Fill in categories for items that have none, from `source`.
///
/// Items that already carry categories are left alone. Returns how many items
/// were filled.
pub fn backfill_membership(queries: &mut [FacetQuery], source: &dyn CategorySource) -> usize {
    let mut filled = 0;
    for query in queries.iter_mut() {
        if query.items.iter().all(|item| !item.categories.is_empty()) {
            continue;
        }
        let Some(categories) = source.categories_for(query.lookup_key()) else {
            debug!(query = query.lookup_key(), "No categories found for query");
            continue;
        };
        for item in query.items.iter_mut().filter(|i| i.categories.is_empty()) {
            item.categories.clone_from(&categories);
            filled += 1;
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::FacetItem;
    use crate::model::Scorecard;
    use std::io::Write;

    fn item(id: &str, categories: &[&str]) -> FacetItem {
        FacetItem {
            item_id: id.to_string(),
            answers: Scorecard::new(),
            categories: categories.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    #[test]
    fn test_facet_key() {
        assert_eq!(facet_key("Main Dish / Cuisine"), "main_dish___cuisine");
        assert_eq!(facet_key(" Price "), "price");
        assert_eq!(facet_key("Quality / Rating"), "quality___rating");
    }

    #[test]
    fn test_lookup_ignores_case_and_spacing() {
        let table =
            CategoryTable::from_entries([("Spicy  Ramen", vec!["Flavor", "Main Dish / Cuisine"])]);
        let cats = table.categories_for("spicy ramen").unwrap();
        assert!(cats.contains("flavor"));
        assert!(cats.contains("main_dish___cuisine"));
        assert!(table.categories_for("pizza").is_none());
    }

    #[test]
    fn test_backfill_only_empty_items() {
        let table = CategoryTable::from_entries([("cheap sushi", ["price"])]);
        let mut queries = vec![
            FacetQuery {
                query_id: "q1".to_string(),
                query: Some("Cheap Sushi".to_string()),
                items: vec![item("a", &[]), item("b", &["flavor"])],
            },
            FacetQuery {
                query_id: "unknown query".to_string(),
                query: None,
                items: vec![item("c", &[])],
            },
        ];
        let filled = backfill_membership(&mut queries, &table);
        assert_eq!(filled, 1);
        assert!(queries[0].items[0].categories.contains("price"));
        assert_eq!(
            queries[0].items[1].categories.iter().collect::<Vec<_>>(),
            vec!["flavor"]
        );
        assert!(queries[1].items[0].categories.is_empty());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "vegan tacos: [Dietary Restrictions, Main Dish / Cuisine]\nfast pho: \"Speed, Price\""
        )
        .unwrap();
        let table = CategoryTable::from_path(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        let cats = table.categories_for("fast pho").unwrap();
        assert!(cats.contains("speed"));
        assert!(cats.contains("price"));
        assert!(table
            .categories_for("vegan tacos")
            .unwrap()
            .contains("dietary_restrictions"));
    }
}
