//! Deterministic category → count tables.
//!
//! Rows are ordered by descending count. Ties keep the order in which each
//! category first appeared in the input, so two runs over the same sequence
//! always produce the same table regardless of hash seeds.

use serde::{ser::SerializeSeq, Serialize, Serializer};
use std::{collections::HashMap, hash::Hash};

/// A table key: either an observed value or the explicit "missing" bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category<V> {
    Value(V),
    Missing,
}

impl<V> Category<V> {
    pub fn as_value(&self) -> Option<&V> {
        match self {
            Category::Value(v) => Some(v),
            Category::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Category::Missing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<V> {
    entries: Vec<(Category<V>, usize)>,
}

impl<V> Default for FrequencyTable<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> FrequencyTable<V> {
    pub fn entries(&self) -> &[(Category<V>, usize)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Category<V>, usize)> {
        self.entries.iter().map(|(c, n)| (c, *n))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of contributing records.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    pub fn missing_count(&self) -> usize {
        self.entries
            .iter()
            .find(|(c, _)| c.is_missing())
            .map_or(0, |(_, n)| *n)
    }

    pub fn into_entries(self) -> Vec<(Category<V>, usize)> {
        self.entries
    }
}

impl<V: PartialEq> FrequencyTable<V> {
    pub fn count_of(&self, category: &Category<V>) -> usize {
        self.entries
            .iter()
            .find(|(c, _)| c == category)
            .map_or(0, |(_, n)| *n)
    }
}

/// Count occurrences of each value.
///
/// With `include_missing`, `None` values are tallied under
/// [`Category::Missing`], which sorts like any other row; otherwise they are
/// dropped and excluded from [`FrequencyTable::total`].
pub fn aggregate<V, I>(values: I, include_missing: bool) -> FrequencyTable<V>
where
    V: Eq + Hash + Clone,
    I: IntoIterator<Item = Option<V>>,
{
    let mut index: HashMap<Category<V>, usize> = HashMap::new();
    let mut entries: Vec<(Category<V>, usize)> = Vec::new();

    for value in values {
        let category = match value {
            Some(v) => Category::Value(v),
            None if include_missing => Category::Missing,
            None => continue,
        };
        match index.get(&category) {
            Some(&slot) => entries[slot].1 += 1,
            None => {
                index.insert(category.clone(), entries.len());
                entries.push((category, 1));
            }
        }
    }

    // stable sort: equal counts stay in first-occurrence order
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    FrequencyTable { entries }
}

#[derive(Serialize)]
struct Row<'a, V> {
    label: Option<&'a V>,
    count: usize,
    missing: bool,
}

impl<V: Serialize> Serialize for FrequencyTable<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for (category, count) in &self.entries {
            seq.serialize_element(&Row {
                label: category.as_value(),
                count: *count,
                missing: category.is_missing(),
            })?;
        }
        seq.end()
    }
}
