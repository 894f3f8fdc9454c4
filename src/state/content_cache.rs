//! Read-through cache of CMS copy

use std::collections::HashMap;

/// Static copy strings displayed around the form
///
/// Filled once from configuration; the engine never reads it.
#[derive(Debug, Clone, Default)]
pub struct ContentCache {
    entries: HashMap<String, String>,
}

impl ContentCache {
    /// Seed the cache from a copy map
    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut cache = Self::default();
        for (key, value) in entries {
            cache.set(key, value);
        }
        cache
    }

    /// Cached value for `key`, or `None`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Cached value for `key`, falling back to `default`
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_is_none() {
        let cache = ContentCache::default();
        assert_eq!(cache.get("startProject.title"), None);
        assert_eq!(cache.get_or("startProject.title", "Start"), "Start");
    }

    #[test]
    fn test_set_then_get() {
        let mut cache = ContentCache::default();
        cache.set("dropLine.intro", "We reply within a day");
        assert_eq!(cache.get("dropLine.intro"), Some("We reply within a day"));
    }

    #[test]
    fn test_from_entries_and_overwrite() {
        let mut cache =
            ContentCache::from_entries([("selector.title".to_string(), "Hi".to_string())]);
        assert_eq!(cache.get_or("selector.title", "x"), "Hi");
        cache.set("selector.title", "Hello");
        assert_eq!(cache.get("selector.title"), Some("Hello"));
    }
}
