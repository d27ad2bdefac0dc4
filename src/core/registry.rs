//! Key-addressed component collections

use super::error::{LoggerError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// A pluggable component addressed by a unique string key
pub trait Keyed {
    fn key(&self) -> &str;
}

/// Components of one kind, looked up by key
pub struct KeyedRegistry<T: ?Sized + Keyed> {
    kind: &'static str,
    items: HashMap<String, Arc<T>>,
}

impl<T: ?Sized + Keyed> KeyedRegistry<T> {
    /// `kind` names the component type in duplicate-key errors
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            items: HashMap::new(),
        }
    }

    pub fn insert(&mut self, item: Arc<T>) -> Result<()> {
        let key = item.key().to_string();
        if self.items.contains_key(&key) {
            return Err(LoggerError::duplicate_key(self.kind, key));
        }
        self.items.insert(key, item);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.items.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Keyed for Named {
        fn key(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_lookup_and_duplicates() {
        let mut registry: KeyedRegistry<dyn Keyed> = KeyedRegistry::new("sink");
        registry.insert(Arc::new(Named("console"))).unwrap();
        registry.insert(Arc::new(Named("file"))).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("file"));
        assert_eq!(registry.get("console").unwrap().key(), "console");
        assert!(registry.get("kafka").is_none());

        let err = registry.insert(Arc::new(Named("file"))).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate sink key [file]");
    }
}
