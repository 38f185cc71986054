//! Linear undo/redo log of immutable snapshots.

/// Snapshot log with a cursor.
///
/// The log is never empty and `0 <= index < len` always holds. Committing
/// after an undo discards every snapshot past the cursor.
#[derive(Debug, Clone)]
pub struct History<T> {
    snapshots: Vec<T>,
    index: usize,
}

impl<T: Clone> History<T> {
    /// Create a log holding a single initial snapshot.
    pub fn new(initial: T) -> Self {
        Self {
            snapshots: vec![initial],
            index: 0,
        }
    }

    /// Snapshot at the cursor.
    pub fn current(&self) -> &T {
        &self.snapshots[self.index]
    }

    /// Truncate after the cursor, append `snapshot` and advance to it.
    pub fn commit(&mut self, snapshot: T) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(snapshot);
        self.index = self.snapshots.len() - 1;
        log::debug!("History commit: {} of {}", self.index, self.snapshots.len());
    }

    /// Step back one snapshot. Returns the restored snapshot, or `None` at the start.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        log::debug!("Undo to {}", self.index);
        Some(self.current())
    }

    /// Step forward one snapshot. Returns the restored snapshot, or `None` at the end.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        log::debug!("Redo to {}", self.index);
        Some(self.current())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Cursor position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of snapshots, including the initial one.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl<T: Clone + Default> Default for History<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let history: History<Vec<u32>> = History::default();
        assert_eq!(history.index(), 0);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.current().is_empty());
    }

    #[test]
    fn test_undo_redo_inverse() {
        let mut history = History::new(0);
        for n in 1..=5 {
            history.commit(n);
        }
        for _ in 0..5 {
            assert!(history.undo().is_some());
        }
        assert_eq!(*history.current(), 0);
        assert!(history.undo().is_none());

        for _ in 0..5 {
            assert!(history.redo().is_some());
        }
        assert_eq!(*history.current(), 5);
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_commit_discards_redo() {
        let mut history = History::new(0);
        history.commit(1);
        history.commit(2);
        history.commit(3);
        history.undo();
        history.undo();
        assert!(history.can_redo());

        history.commit(10);
        assert!(!history.can_redo());
        assert_eq!(history.len(), 3);
        assert_eq!(*history.current(), 10);
        history.undo();
        assert_eq!(*history.current(), 1);
    }

    #[test]
    fn test_can_undo_after_first_commit() {
        let mut history = History::new("a");
        history.commit("b");
        assert!(history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.index(), 1);
    }
}
