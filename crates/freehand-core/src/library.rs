//! Reusable element library.
//!
//! The library lives outside undo history. It is persisted as a JSON array of
//! items through a [`Storage`] backend.

use crate::element::{Element, ElementId, new_element_id};
use crate::storage::{Storage, StorageError};
use crate::store::Store;
use kurbo::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Storage key of the persisted library.
pub const LIBRARY_STORAGE_KEY: &str = "freehand-library";
/// Smallest offset applied to inserted items, in world units.
pub const INSERT_OFFSET_MIN: f64 = 20.0;
/// Range of the random part of the insert offset.
pub const INSERT_OFFSET_SPAN: f64 = 40.0;

/// Library errors.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Invalid library JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Library file must contain an array of items")]
    NotAnArray,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for library operations.
pub type LibraryResult<T> = Result<T, LibraryError>;

/// A named group of elements saved for reuse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryItem {
    pub id: String,
    pub name: String,
    pub elements: Vec<Element>,
    /// Creation time in milliseconds since the Unix epoch.
    pub created: u64,
}

impl LibraryItem {
    pub fn new(name: impl Into<String>, elements: Vec<Element>) -> Self {
        Self {
            id: new_element_id(),
            name: name.into(),
            elements,
            created: now_millis(),
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Ordered list of library items, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Library {
    items: Vec<LibraryItem>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<LibraryItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[LibraryItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&LibraryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Prepend an item.
    pub fn add(&mut self, item: LibraryItem) {
        self.items.insert(0, item);
    }

    /// Save the current selection as a new item. No-op when nothing is selected.
    pub fn save_selection(&mut self, store: &Store, name: &str) -> Option<&LibraryItem> {
        let elements: Vec<Element> = store.selected_elements().into_iter().cloned().collect();
        if elements.is_empty() {
            return None;
        }
        log::info!("Saving {} elements to library as {:?}", elements.len(), name);
        self.add(LibraryItem::new(name, elements));
        self.items.first()
    }

    /// Remove item `id`.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Insert item `id` into the scene at a random offset.
    pub fn insert(&self, id: &str, store: &mut Store) -> Vec<ElementId> {
        let mut rng = rand::rng();
        let offset = Vec2::new(
            INSERT_OFFSET_MIN + rng.random_range(0.0..INSERT_OFFSET_SPAN),
            INSERT_OFFSET_MIN + rng.random_range(0.0..INSERT_OFFSET_SPAN),
        );
        self.insert_at_offset(id, store, offset)
    }

    /// Insert item `id` into the scene, shifted by `offset`.
    ///
    /// Elements get fresh ids, land on top as one history entry and become
    /// the selection. Returns the new ids.
    pub fn insert_at_offset(&self, id: &str, store: &mut Store, offset: Vec2) -> Vec<ElementId> {
        let Some(item) = self.get(id) else {
            return Vec::new();
        };
        let copies: Vec<Element> = item
            .elements
            .iter()
            .map(|element| element.duplicate(new_element_id(), offset))
            .collect();
        let ids: Vec<ElementId> = copies.iter().map(|e| e.id.clone()).collect();
        store.add_many(copies);
        store.select_many(&ids);
        ids
    }

    /// Pretty-printed JSON array of all items.
    pub fn export_json(&self) -> LibraryResult<String> {
        Ok(serde_json::to_string_pretty(&self.items)?)
    }

    /// Prepend the items of a library file. Returns how many were imported.
    ///
    /// On failure the library is left untouched.
    pub fn import_json(&mut self, json: &str) -> LibraryResult<usize> {
        let mut items = parse_items(json)?;
        let count = items.len();
        items.append(&mut self.items);
        self.items = items;
        Ok(count)
    }

    /// Load the persisted library; a missing document yields an empty library.
    pub fn load(storage: &dyn Storage) -> LibraryResult<Self> {
        match storage.load(LIBRARY_STORAGE_KEY) {
            Ok(json) => Ok(Self::from_items(parse_items(&json)?)),
            Err(StorageError::NotFound(_)) => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the library.
    pub fn persist(&self, storage: &dyn Storage) -> LibraryResult<()> {
        storage.save(LIBRARY_STORAGE_KEY, &serde_json::to_string(&self.items)?)?;
        Ok(())
    }
}

fn parse_items(json: &str) -> LibraryResult<Vec<LibraryItem>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.is_array() {
        return Err(LibraryError::NotAnArray);
    }
    Ok(serde_json::from_value(value)?)
}
