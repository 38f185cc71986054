//! The history store: authoritative element collection, undo log and selection.

use crate::element::{self, Element, ElementId, ElementPatch, new_element_id};
use crate::history::History;
use kurbo::Vec2;

/// Offset applied to duplicated elements, in world units.
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(10.0, 10.0);

/// Owns the element collection, its snapshot history and the selection.
///
/// Every undoable change funnels through [`Store::commit`]. Gestures write to
/// the live collection with the `*_live` methods and call
/// [`Store::commit_live`] once when the gesture ends, so a whole drag is a
/// single history entry.
#[derive(Debug, Clone)]
pub struct Store {
    history: History<Vec<Element>>,
    elements: Vec<Element>,
    selection: Vec<ElementId>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_elements(Vec::new())
    }

    /// Create a store whose initial snapshot is `elements`.
    pub fn with_elements(elements: Vec<Element>) -> Self {
        Self {
            history: History::new(elements.clone()),
            elements,
            selection: Vec::new(),
        }
    }

    /// The live element collection, in paint order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.element(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    // --- History ---

    /// Record `collection` as a new snapshot and make it current.
    pub fn commit(&mut self, collection: Vec<Element>) {
        self.history.commit(collection.clone());
        self.elements = collection;
        self.prune_selection();
    }

    /// Restore the previous snapshot and clear the selection.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.elements = snapshot.clone();
                self.selection.clear();
                true
            }
            None => false,
        }
    }

    /// Restore the next snapshot and clear the selection.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.elements = snapshot.clone();
                self.selection.clear();
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_index(&self) -> usize {
        self.history.index()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Replace the whole collection as one history entry.
    pub fn replace_all(&mut self, collection: Vec<Element>) {
        log::info!("Replacing collection with {} elements", collection.len());
        self.commit(collection);
    }

    // --- Committed mutations ---

    /// Append `element` on top. An id already in the collection is ignored.
    pub fn add(&mut self, element: Element) -> bool {
        if self.contains(&element.id) {
            log::warn!("Ignoring element with duplicate id {}", element.id);
            return false;
        }
        let mut next = self.elements.clone();
        next.push(element);
        self.commit(next);
        true
    }

    /// Append several elements on top as one history entry.
    ///
    /// Elements whose id is already taken are skipped. Returns how many were added.
    pub fn add_many(&mut self, elements: Vec<Element>) -> usize {
        let mut next = self.elements.clone();
        let mut added = 0;
        for element in elements {
            if next.iter().any(|e| e.id == element.id) {
                log::warn!("Ignoring element with duplicate id {}", element.id);
                continue;
            }
            next.push(element);
            added += 1;
        }
        if added > 0 {
            self.commit(next);
        }
        added
    }

    /// Merge `patch` into element `id`. Unknown ids are ignored.
    pub fn update_one(&mut self, id: &str, patch: &ElementPatch) -> bool {
        if !self.contains(id) {
            return false;
        }
        let next = element::patch(&self.elements, id, patch);
        self.commit(next);
        true
    }

    /// Merge `patch` into every listed element as one history entry.
    pub fn update_many(&mut self, ids: &[ElementId], patch: &ElementPatch) -> bool {
        if !self.any_present(ids) {
            return false;
        }
        let next = self
            .elements
            .iter()
            .map(|e| {
                let mut updated = e.clone();
                if ids.contains(&e.id) {
                    updated.apply(patch);
                }
                updated
            })
            .collect();
        self.commit(next);
        true
    }

    /// Remove every element whose id is in `ids`.
    pub fn delete(&mut self, ids: &[ElementId]) -> bool {
        if !self.any_present(ids) {
            return false;
        }
        let next = self
            .elements
            .iter()
            .filter(|e| !ids.contains(&e.id))
            .cloned()
            .collect();
        self.commit(next);
        true
    }

    /// Clone the listed elements with fresh ids at [`DUPLICATE_OFFSET`].
    ///
    /// Copies are appended on top in collection order and become the
    /// selection. Returns the new ids.
    pub fn duplicate(&mut self, ids: &[ElementId]) -> Vec<ElementId> {
        let copies: Vec<Element> = self
            .elements
            .iter()
            .filter(|e| ids.contains(&e.id))
            .map(|e| e.duplicate(new_element_id(), DUPLICATE_OFFSET))
            .collect();
        if copies.is_empty() {
            return Vec::new();
        }

        let new_ids: Vec<ElementId> = copies.iter().map(|e| e.id.clone()).collect();
        let mut next = self.elements.clone();
        next.extend(copies);
        self.commit(next);
        self.selection = new_ids.clone();
        new_ids
    }

    /// Move the listed elements to the top, keeping relative order.
    pub fn reorder_to_front(&mut self, ids: &[ElementId]) -> bool {
        self.reorder(ids, true)
    }

    /// Move the listed elements to the bottom, keeping relative order.
    pub fn reorder_to_back(&mut self, ids: &[ElementId]) -> bool {
        self.reorder(ids, false)
    }

    fn reorder(&mut self, ids: &[ElementId], to_front: bool) -> bool {
        if !self.any_present(ids) {
            return false;
        }
        let (moved, rest): (Vec<Element>, Vec<Element>) = self
            .elements
            .iter()
            .cloned()
            .partition(|e| ids.contains(&e.id));
        let next = if to_front {
            rest.into_iter().chain(moved).collect()
        } else {
            moved.into_iter().chain(rest).collect()
        };
        self.commit(next);
        true
    }

    fn any_present(&self, ids: &[ElementId]) -> bool {
        self.elements.iter().any(|e| ids.contains(&e.id))
    }

    // --- Live writes (uncommitted) ---

    /// Append without recording a snapshot.
    pub fn push_live(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Mutate element `id` in place without recording a snapshot.
    pub fn update_live(&mut self, id: &str, update: impl FnOnce(&mut Element)) -> bool {
        match self.elements.iter_mut().find(|e| e.id == id) {
            Some(element) => {
                update(element);
                true
            }
            None => false,
        }
    }

    /// Replace the element with the same id without recording a snapshot.
    pub fn replace_live(&mut self, element: Element) -> bool {
        let id = element.id.clone();
        self.update_live(&id, |existing| *existing = element)
    }

    /// Whether the live collection differs from the current snapshot.
    pub fn is_dirty(&self) -> bool {
        self.elements != *self.history.current()
    }

    /// Record the live collection as one snapshot if it changed.
    pub fn commit_live(&mut self) -> bool {
        if !self.is_dirty() {
            return false;
        }
        self.history.commit(self.elements.clone());
        self.prune_selection();
        true
    }

    /// Drop uncommitted live changes.
    pub fn discard_live(&mut self) {
        self.elements = self.history.current().clone();
        self.prune_selection();
    }

    // --- Selection ---

    /// Selected ids in selection order.
    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.iter().any(|s| s == id)
    }

    /// Selected elements in paint order.
    pub fn selected_elements(&self) -> Vec<&Element> {
        self.elements
            .iter()
            .filter(|e| self.is_selected(&e.id))
            .collect()
    }

    /// Select exactly `id`. Unknown ids leave the selection untouched.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.selection = vec![id.to_string()];
        true
    }

    /// Select exactly the listed ids that exist.
    pub fn select_many(&mut self, ids: &[ElementId]) {
        self.selection = ids
            .iter()
            .filter(|id| self.contains(id))
            .cloned()
            .collect();
    }

    pub fn deselect_all(&mut self) {
        self.selection.clear();
    }

    fn prune_selection(&mut self) {
        let elements = &self.elements;
        self.selection
            .retain(|id| elements.iter().any(|e| &e.id == id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, ElementPatch};
    use kurbo::Point;

    fn rect(id: &str, x: f64, y: f64) -> Element {
        Element::create(
            id,
            ElementKind::Rectangle,
            &ElementPatch::new().with_position(Point::new(x, y)).with_size(10.0, 10.0),
        )
    }

    fn ids(store: &Store) -> Vec<&str> {
        store.elements().iter().map(|e| e.id.as_str()).collect()
    }

    fn owned(ids: &[&str]) -> Vec<ElementId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_undo_redo_inverse_law() {
        let mut store = Store::new();
        for n in 0..4 {
            store.add(rect(&format!("e{n}"), n as f64, 0.0));
        }
        let final_state = store.elements().to_vec();

        for _ in 0..4 {
            assert!(store.undo());
        }
        assert!(store.elements().is_empty());
        assert!(!store.undo());

        for _ in 0..4 {
            assert!(store.redo());
        }
        assert_eq!(store.elements(), final_state.as_slice());
        assert!(!store.redo());
    }

    #[test]
    fn test_commit_after_undo_invalidates_redo() {
        let mut store = Store::new();
        store.add(rect("a", 0.0, 0.0));
        store.add(rect("b", 0.0, 0.0));
        store.undo();
        assert!(store.can_redo());

        store.add(rect("c", 0.0, 0.0));
        assert!(!store.can_redo());
        assert!(!store.redo());
        assert_eq!(ids(&store), vec!["a", "c"]);
        assert_eq!(store.history_index(), 2);
        assert_eq!(store.history_len(), 3);
    }

    #[test]
    fn test_undo_clears_selection() {
        let mut store = Store::new();
        store.add(rect("a", 0.0, 0.0));
        store.add(rect("b", 0.0, 0.0));
        store.select("a");
        store.undo();
        assert!(store.selection().is_empty());
    }

    #[test]
    fn test_update_one() {
        let mut store = Store::new();
        store.add(rect("a", 0.0, 0.0));
        assert!(store.update_one("a", &ElementPatch::new().with_angle(0.5)));
        assert!((store.elements()[0].angle - 0.5).abs() < f64::EPSILON);
        assert_eq!(store.history_len(), 3);
    }

    #[test]
    fn test_missing_ids_are_noops() {
        let mut store = Store::new();
        store.add(rect("a", 0.0, 0.0));
        let len = store.history_len();

        assert!(!store.update_one("zzz", &ElementPatch::new().with_angle(1.0)));
        assert!(!store.delete(&owned(&["zzz"])));
        assert!(store.duplicate(&owned(&["zzz"])).is_empty());
        assert!(!store.reorder_to_front(&owned(&["zzz"])));
        assert!(!store.reorder_to_back(&[]));
        assert!(!store.select("zzz"));

        assert_eq!(store.history_len(), len);
        assert_eq!(ids(&store), vec!["a"]);
    }

    #[test]
    fn test_add_rejects_duplicate_ids() {
        let mut store = Store::new();
        assert!(store.add(rect("a", 0.0, 0.0)));
        let len = store.history_len();

        assert!(!store.add(rect("a", 50.0, 50.0)));
        assert_eq!(store.history_len(), len);
        assert!((store.element("a").unwrap().x - 0.0).abs() < f64::EPSILON);

        let added = store.add_many(vec![
            rect("a", 1.0, 1.0),
            rect("b", 2.0, 2.0),
            rect("b", 3.0, 3.0),
        ]);
        assert_eq!(added, 1);
        assert_eq!(ids(&store), vec!["a", "b"]);
        assert!((store.element("b").unwrap().x - 2.0).abs() < f64::EPSILON);
        assert_eq!(store.history_len(), len + 1);

        assert_eq!(store.add_many(vec![rect("a", 0.0, 0.0)]), 0);
        assert_eq!(store.history_len(), len + 1);
    }

    #[test]
    fn test_update_many_is_one_entry() {
        let mut store = Store::new();
        store.add_many(vec![rect("a", 0.0, 0.0), rect("b", 0.0, 0.0), rect("c", 0.0, 0.0)]);
        let len = store.history_len();

        let patch = ElementPatch::new().with_angle(0.5);
        assert!(store.update_many(&owned(&["a", "c", "zzz"]), &patch));
        assert_eq!(store.history_len(), len + 1);
        assert!((store.element("a").unwrap().angle - 0.5).abs() < f64::EPSILON);
        assert!(store.element("b").unwrap().angle.abs() < f64::EPSILON);
        assert!((store.element("c").unwrap().angle - 0.5).abs() < f64::EPSILON);

        assert!(!store.update_many(&owned(&["zzz"]), &patch));
        assert_eq!(store.history_len(), len + 1);

        store.undo();
        assert!(store.element("a").unwrap().angle.abs() < f64::EPSILON);
    }

    #[test]
    fn test_delete_removes_from_selection() {
        let mut store = Store::new();
        store.add(rect("a", 0.0, 0.0));
        store.add(rect("b", 0.0, 0.0));
        store.select_many(&owned(&["a", "b"]));
        assert!(store.delete(&owned(&["a"])));
        assert_eq!(ids(&store), vec!["b"]);
        assert_eq!(store.selection(), &owned(&["b"])[..]);
    }

    #[test]
    fn test_duplicate_offsets_and_selects() {
        let mut store = Store::new();
        store.add(rect("a", 5.0, 7.0));
        store.add(rect("b", 20.0, 30.0));

        let new_ids = store.duplicate(&owned(&["a", "b"]));
        assert_eq!(new_ids.len(), 2);
        assert_ne!(new_ids[0], new_ids[1]);
        assert!(!new_ids.contains(&"a".to_string()));
        assert_eq!(store.len(), 4);

        let copy = store.element(&new_ids[0]).unwrap();
        assert!((copy.x - 15.0).abs() < f64::EPSILON);
        assert!((copy.y - 17.0).abs() < f64::EPSILON);
        let original = store.element("a").unwrap();
        assert!((original.x - 5.0).abs() < f64::EPSILON);
        assert_eq!(store.selection(), new_ids.as_slice());
    }

    #[test]
    fn test_reorder_to_front_is_stable() {
        let mut store = Store::new();
        for id in ["a", "b", "c", "d", "e"] {
            store.add(rect(id, 0.0, 0.0));
        }
        assert!(store.reorder_to_front(&owned(&["d", "b"])));
        assert_eq!(ids(&store), vec!["a", "c", "e", "b", "d"]);
    }

    #[test]
    fn test_reorder_to_back_is_stable() {
        let mut store = Store::new();
        for id in ["a", "b", "c", "d", "e"] {
            store.add(rect(id, 0.0, 0.0));
        }
        assert!(store.reorder_to_back(&owned(&["e", "c"])));
        assert_eq!(ids(&store), vec!["c", "e", "a", "b", "d"]);
    }

    #[test]
    fn test_live_writes_commit_once() {
        let mut store = Store::new();
        store.add(rect("a", 0.0, 0.0));
        let len = store.history_len();

        for step in 1..=5 {
            store.update_live("a", |e| e.x = step as f64);
        }
        assert_eq!(store.history_len(), len);
        assert!(store.is_dirty());

        assert!(store.commit_live());
        assert_eq!(store.history_len(), len + 1);
        assert!(!store.commit_live());

        store.undo();
        assert!(store.elements()[0].x.abs() < f64::EPSILON);
    }

    #[test]
    fn test_discard_live() {
        let mut store = Store::new();
        store.add(rect("a", 0.0, 0.0));
        store.push_live(rect("b", 0.0, 0.0));
        store.select("b");
        store.discard_live();
        assert_eq!(ids(&store), vec!["a"]);
        assert!(store.selection().is_empty());
    }

    #[test]
    fn test_select_many_filters_unknown() {
        let mut store = Store::new();
        store.add(rect("a", 0.0, 0.0));
        store.select_many(&owned(&["a", "ghost"]));
        assert_eq!(store.selection(), &owned(&["a"])[..]);
        store.deselect_all();
        assert!(store.selection().is_empty());
    }
}
