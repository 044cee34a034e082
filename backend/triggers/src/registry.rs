/// Alias-aware item registry shared by every trigger that offers named items.
///
/// Items are stored once behind an `Arc`; the name and every alias are keys
/// pointing at the same allocation, so the key count may exceed the item count
/// but never the other way round.
use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;

/// Anything that can be looked up by name or alias.
pub trait RegistryItem {
    fn name(&self) -> &str;

    fn aliases(&self) -> &[String] {
        &[]
    }
}

pub struct TriggerRegistry<T> {
    items: IndexMap<String, Arc<T>>,
}

impl<T: RegistryItem> TriggerRegistry<T> {
    pub fn new() -> Self {
        Self { items: IndexMap::new() }
    }

    /// Register an item under its name and each of its aliases.
    /// Re-using a key replaces the previous mapping in place.
    pub fn register(&mut self, item: T) -> Arc<T> {
        let item = Arc::new(item);
        self.register_shared(item.clone());
        item
    }

    pub fn register_shared(&mut self, item: Arc<T>) {
        self.items.insert(item.name().to_string(), item.clone());
        for alias in item.aliases() {
            self.items.insert(alias.clone(), item.clone());
        }
    }

    /// Look up by name or alias.
    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.items.get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Unique items in first-registration order.
    pub fn all(&self) -> Vec<Arc<T>> {
        unique(self.items.values())
    }

    /// Case-insensitive substring search over names and aliases.
    /// An empty query returns every item.
    pub fn search(&self, query: &str) -> Vec<Arc<T>> {
        self.search_by(query, |_, _| false)
    }

    /// Search with an extra matcher tried after name and aliases. The matcher
    /// receives the lowercased query.
    pub fn search_by<F>(&self, query: &str, extra: F) -> Vec<Arc<T>>
    where
        F: Fn(&T, &str) -> bool,
    {
        if query.is_empty() {
            return self.all();
        }

        let query = query.to_lowercase();
        let matched = self.items.values().filter(|item| {
            item.name().to_lowercase().contains(&query)
                || item.aliases().iter().any(|alias| alias.to_lowercase().contains(&query))
                || extra(item, &query)
        });
        unique(matched)
    }

    /// Number of unique items.
    pub fn count(&self) -> usize {
        self.all().len()
    }

    /// Number of lookup keys (names plus aliases).
    pub fn key_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: RegistryItem> Default for TriggerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn unique<'a, T: 'a>(items: impl Iterator<Item = &'a Arc<T>>) -> Vec<Arc<T>> {
    let mut seen = HashSet::new();
    items
        .filter(|item| seen.insert(Arc::as_ptr(item)))
        .cloned()
        .collect()
}
