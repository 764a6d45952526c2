//! Keep-alive cache of per-route state, keyed by full location path.
//!
//! Returning to a cached route reuses its value instead of rebuilding it.
//! Routes are kept until evicted, cleared or pushed out by the capacity.

use std::collections::HashMap;

pub struct KeepAliveCache<V> {
    entries: HashMap<String, V>,
    /// Paths in first-visit order.
    order: Vec<String>,
    active: Option<String>,
    capacity: Option<usize>,
}

impl<V> KeepAliveCache<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            active: None,
            capacity: None,
        }
    }

    /// Bounded cache; the oldest inactive route is dropped when full.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            ..Self::new()
        }
    }

    /// Makes `path` the active route, building its value on first visit.
    pub fn activate<F>(&mut self, path: &str, build: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        if !self.entries.contains_key(path) {
            self.make_room();
            self.order.push(path.to_string());
            log::debug!("Route '{}' mounted", path);
        }
        self.active = Some(path.to_string());
        self.entries.entry(path.to_string()).or_insert_with(build)
    }

    fn make_room(&mut self) {
        let Some(capacity) = self.capacity else {
            return;
        };
        while self.entries.len() >= capacity {
            let victim = self
                .order
                .iter()
                .find(|p| Some(p.as_str()) != self.active.as_deref())
                .cloned();
            match victim {
                Some(path) => {
                    self.evict(&path);
                }
                None => break,
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&V> {
        self.entries.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut V> {
        self.entries.get_mut(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn active_path(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&V> {
        self.active.as_deref().and_then(|p| self.entries.get(p))
    }

    /// Drops a route; the next visit rebuilds it.
    pub fn evict(&mut self, path: &str) -> Option<V> {
        let value = self.entries.remove(path)?;
        self.order.retain(|p| p != path);
        if self.active.as_deref() == Some(path) {
            self.active = None;
        }
        log::debug!("Route '{}' evicted", path);
        Some(value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.active = None;
    }

    /// Cached paths in first-visit order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for KeepAliveCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revisit_keeps_state() {
        let mut cache: KeepAliveCache<Vec<&str>> = KeepAliveCache::new();
        cache.activate("/data-management", Vec::new).push("scrolled");
        cache.activate("/dashboard?tab=risk", Vec::new);

        let state = cache.activate("/data-management", || vec!["rebuilt"]);
        assert_eq!(state, &vec!["scrolled"]);
        assert_eq!(cache.active_path(), Some("/data-management"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_query_string_is_part_of_key() {
        let mut cache = KeepAliveCache::new();
        cache.activate("/dashboard?tab=risk", || 1);
        cache.activate("/dashboard?tab=trends", || 2);
        assert_eq!(cache.get("/dashboard?tab=risk"), Some(&1));
        assert_eq!(cache.get("/dashboard?tab=trends"), Some(&2));
    }

    #[test]
    fn test_evict_active_route() {
        let mut cache = KeepAliveCache::new();
        cache.activate("/a", || "a");
        assert_eq!(cache.evict("/a"), Some("a"));
        assert!(cache.active().is_none());
        assert!(cache.evict("/a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_spares_active_route() {
        let mut cache = KeepAliveCache::with_capacity(2);
        cache.activate("/a", || 1);
        cache.activate("/b", || 2);
        cache.activate("/a", || 10);
        cache.activate("/c", || 3);

        let paths: Vec<&str> = cache.paths().collect();
        assert_eq!(paths, vec!["/a", "/c"]);
        assert_eq!(cache.get("/a"), Some(&1));
    }

    #[test]
    fn test_clear() {
        let mut cache = KeepAliveCache::new();
        cache.activate("/a", || ());
        cache.clear();
        assert!(cache.active_path().is_none());
        assert_eq!(cache.paths().count(), 0);
    }
}
