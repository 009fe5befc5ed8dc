//! Saved reward images.
//!
//! A bounded recency list of image references, newest first, without
//! duplicates. Stored under [`SAVED_IMAGES_KEY`] as one string joined with
//! [`IMAGE_DELIMITER`].

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::storage::{PersistentStore, SAVED_IMAGES_KEY};

pub const MAX_SAVED_IMAGES: usize = 20;
pub const IMAGE_DELIMITER: &str = "|||";

const EVENT_CHANNEL_CAPACITY: usize = 64;

pub struct SavedImageRegistry {
    store: Arc<dyn PersistentStore>,
    capacity: usize,
    writer: Mutex<()>,
    images: watch::Sender<Vec<String>>,
    events: broadcast::Sender<Event>,
}

impl SavedImageRegistry {
    /// Load with the default cap of [`MAX_SAVED_IMAGES`].
    pub fn load(store: Arc<dyn PersistentStore>) -> Self {
        Self::with_capacity(store, MAX_SAVED_IMAGES)
    }

    /// Load with an explicit cap. Stored data is deduplicated (first
    /// occurrence wins) and truncated to the cap; the store is rewritten on
    /// the next change.
    pub fn with_capacity(store: Arc<dyn PersistentStore>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut images = load_images(store.as_ref());
        let loaded = images.len();
        let mut seen = HashSet::new();
        images.retain(|image| seen.insert(image.clone()));
        images.truncate(capacity);
        if images.len() != loaded {
            debug!(loaded, kept = images.len(), capacity, "normalized saved images");
        }
        let (images, _) = watch::channel(images);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            capacity,
            writer: Mutex::new(()),
            images,
            events,
        }
    }

    /// Most recent first.
    pub fn list(&self) -> Vec<String> {
        self.images.borrow().clone()
    }

    pub fn contains(&self, image_ref: &str) -> bool {
        self.images.borrow().iter().any(|i| i == image_ref)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<String>> {
        self.images.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Save `image_ref` at the front. Already-saved references are left where
    /// they are and `Ok(false)` is returned.
    ///
    /// # Errors
    /// Rejects empty references and references containing the delimiter, and
    /// returns store errors from the write.
    pub fn add(&self, image_ref: &str) -> Result<bool> {
        if image_ref.is_empty() {
            return Err(ValidationError::EmptyImageRef.into());
        }
        if image_ref.contains(IMAGE_DELIMITER) {
            return Err(ValidationError::ImageRefContainsDelimiter {
                delimiter: IMAGE_DELIMITER,
            }
            .into());
        }

        let _writer = self.lock_writer();
        if self.contains(image_ref) {
            debug!(image_ref, "image already saved");
            return Ok(false);
        }

        let mut images = self.list();
        images.insert(0, image_ref.to_string());
        let evicted = if images.len() > self.capacity {
            images.split_off(self.capacity)
        } else {
            Vec::new()
        };

        self.persist(&images)?;
        self.images.send_replace(images);

        info!(image_ref, evicted = evicted.len(), "image saved");
        let _ = self.events.send(Event::ImageSaved {
            image_ref: image_ref.to_string(),
            evicted,
            at: Utc::now(),
        });
        Ok(true)
    }

    /// Remove every entry equal to `image_ref`. Returns `false` if none matched.
    pub fn remove(&self, image_ref: &str) -> Result<bool> {
        let _writer = self.lock_writer();
        let mut images = self.list();
        let before = images.len();
        images.retain(|i| i != image_ref);
        if images.len() == before {
            return Ok(false);
        }

        self.persist(&images)?;
        self.images.send_replace(images);

        info!(image_ref, "image removed");
        let _ = self.events.send(Event::ImageRemoved {
            image_ref: image_ref.to_string(),
            at: Utc::now(),
        });
        Ok(true)
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, images: &[String]) -> Result<()> {
        self.store
            .put_atomic(SAVED_IMAGES_KEY, &images.join(IMAGE_DELIMITER))?;
        Ok(())
    }
}

fn load_images(store: &dyn PersistentStore) -> Vec<String> {
    match store.get(SAVED_IMAGES_KEY) {
        Ok(Some(raw)) => raw
            .split(IMAGE_DELIMITER)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect(),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "failed to read saved images; starting empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::storage::MemoryStore;

    fn registry() -> (Arc<MemoryStore>, SavedImageRegistry) {
        let store = Arc::new(MemoryStore::new());
        let registry = SavedImageRegistry::load(store.clone());
        (store, registry)
    }

    #[test]
    fn load_deduplicates_and_caps_stored_list() {
        let mut refs: Vec<String> = (0..25).map(|i| format!("https://img/{i}")).collect();
        refs.insert(1, "https://img/0".into());
        let store = Arc::new(MemoryStore::new());
        store.put_atomic(SAVED_IMAGES_KEY, &refs.join(IMAGE_DELIMITER)).unwrap();

        let registry = SavedImageRegistry::load(store);
        let list = registry.list();
        assert_eq!(list.len(), registry.capacity());
        assert_eq!(list[0], "https://img/0");
        assert_eq!(list[1], "https://img/1");
        let unique: HashSet<_> = list.iter().collect();
        assert_eq!(unique.len(), list.len());
    }

    #[test]
    fn load_keeps_first_of_repeated_refs() {
        let store = Arc::new(MemoryStore::new());
        store.put_atomic(SAVED_IMAGES_KEY, "a|||a|||b").unwrap();
        let registry = SavedImageRegistry::load(store);
        assert_eq!(registry.list(), ["a", "b"]);
    }

    #[test]
    fn lowered_cap_truncates_on_load() {
        let store = Arc::new(MemoryStore::new());
        let refs: Vec<String> = (0..20).map(|i| format!("{i}.png")).collect();
        store.put_atomic(SAVED_IMAGES_KEY, &refs.join(IMAGE_DELIMITER)).unwrap();
        let registry = SavedImageRegistry::with_capacity(store, 5);
        assert_eq!(registry.list(), ["0.png", "1.png", "2.png", "3.png", "4.png"]);
    }

    #[test]
    fn newest_first() {
        let (_store, registry) = registry();
        registry.add("a.png").unwrap();
        registry.add("b.png").unwrap();
        assert_eq!(registry.list(), ["b.png", "a.png"]);
    }

    #[test]
    fn duplicate_add_is_noop_without_reordering() {
        let (_store, registry) = registry();
        registry.add("a.png").unwrap();
        registry.add("b.png").unwrap();
        assert!(!registry.add("a.png").unwrap());
        assert_eq!(registry.list(), ["b.png", "a.png"]);
    }

    #[test]
    fn twenty_first_add_evicts_oldest() {
        let (_store, registry) = registry();
        let mut events = registry.events();
        for i in 0..21 {
            registry.add(&format!("https://img/{i}")).unwrap();
        }
        let list = registry.list();
        assert_eq!(list.len(), 20);
        assert_eq!(list[0], "https://img/20");
        assert!(!list.contains(&"https://img/0".to_string()));

        let last = std::iter::from_fn(|| events.try_recv().ok()).last().unwrap();
        match last {
            Event::ImageSaved { evicted, .. } => assert_eq!(evicted, ["https://img/0"]),
            other => panic!("Expected ImageSaved, got {other:?}"),
        }
    }

    #[test]
    fn remove_filters_and_persists() {
        let (store, registry) = registry();
        registry.add("a.png").unwrap();
        registry.add("b.png").unwrap();
        assert!(registry.remove("a.png").unwrap());
        assert_eq!(registry.list(), ["b.png"]);
        assert_eq!(store.get(SAVED_IMAGES_KEY).unwrap().as_deref(), Some("b.png"));
        assert!(!registry.remove("a.png").unwrap());
    }

    #[test]
    fn persists_joined_with_delimiter() {
        let (store, registry) = registry();
        registry.add("a.png").unwrap();
        registry.add("b.png").unwrap();
        assert_eq!(
            store.get(SAVED_IMAGES_KEY).unwrap().as_deref(),
            Some("b.png|||a.png")
        );
    }

    #[test]
    fn load_drops_empty_segments() {
        let store = Arc::new(MemoryStore::with_values([(SAVED_IMAGES_KEY, "x.png||||||y.png|||")]));
        let registry = SavedImageRegistry::load(store);
        assert_eq!(registry.list(), ["x.png", "y.png"]);
    }

    #[test]
    fn rejects_empty_and_delimited_refs() {
        let (_store, registry) = registry();
        assert!(matches!(
            registry.add(""),
            Err(CoreError::Validation(ValidationError::EmptyImageRef))
        ));
        assert!(matches!(
            registry.add("a|||b"),
            Err(CoreError::Validation(ValidationError::ImageRefContainsDelimiter { .. }))
        ));
        assert!(registry.list().is_empty());
    }

    #[test]
    fn custom_capacity() {
        let store = Arc::new(MemoryStore::new());
        let registry = SavedImageRegistry::with_capacity(store, 2);
        for name in ["1", "2", "3"] {
            registry.add(name).unwrap();
        }
        assert_eq!(registry.list(), ["3", "2"]);
    }
}
