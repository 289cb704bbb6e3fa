//! Decoded images referenced by name from `background-image: url(name)`.

use std::collections::HashMap;
use std::sync::Arc;

use super::canvas::Canvas;

/// Named, already decoded images. Decoding happens outside the core.
#[derive(Debug, Clone, Default)]
pub struct ImageStore {
    images: HashMap<String, Arc<Canvas>>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image, returning the one it replaces.
    pub fn insert(&mut self, name: impl Into<String>, image: Canvas) -> Option<Arc<Canvas>> {
        self.images.insert(name.into(), Arc::new(image))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Canvas>> {
        self.images.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<Canvas>> {
        self.images.remove(name)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replace_remove() {
        let mut store = ImageStore::new();
        assert!(store.insert("a", Canvas::new(1, 1)).is_none());
        assert!(store.insert("a", Canvas::new(2, 2)).is_some());
        assert_eq!(store.get("a").map(|c| c.width()), Some(2));
        assert_eq!(store.len(), 1);
        assert!(store.remove("a").is_some());
        assert!(store.is_empty());
    }
}
