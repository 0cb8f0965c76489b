// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Row, RowKey};

/// Ordered, typed row records for one agenda table. Table order is the vector
/// order; `sequence` is renumbered from it whenever rows move.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowStore {
    rows: Vec<Row>,
    next_new_slot: u32,
}

impl RowStore {
    pub fn from_snapshots(rows: Vec<Row>) -> Self {
        let mut store = Self::default();
        for mut row in rows {
            if row.key.is_new() {
                row.key = store.allocate_new_key();
            }
            store.rows.push(row);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    pub fn keys(&self) -> Vec<RowKey> {
        self.rows.iter().map(|row| row.key).collect()
    }

    pub fn get(&self, key: RowKey) -> Option<&Row> {
        self.rows.iter().find(|row| row.key == key)
    }

    pub fn get_mut(&mut self, key: RowKey) -> Option<&mut Row> {
        self.rows.iter_mut().find(|row| row.key == key)
    }

    pub fn position(&self, key: RowKey) -> Option<usize> {
        self.rows.iter().position(|row| row.key == key)
    }

    pub fn allocate_new_key(&mut self) -> RowKey {
        self.next_new_slot += 1;
        RowKey::New(self.next_new_slot)
    }

    /// Inserts below `after`, or at the top when `after` is `None` or unknown.
    pub fn insert_after(&mut self, after: Option<RowKey>, row: Row) -> RowKey {
        let key = row.key;
        let index = after
            .and_then(|after| self.position(after))
            .map_or(0, |index| index + 1);
        self.rows.insert(index, row);
        self.renumber();
        key
    }

    pub fn remove(&mut self, key: RowKey) -> Option<Row> {
        let index = self.position(key)?;
        let removed = self.rows.remove(index);
        self.renumber();
        Some(removed)
    }

    /// Moves a row by `delta` positions, clamped to the table bounds. Returns
    /// whether the order changed.
    pub fn move_row(&mut self, key: RowKey, delta: isize) -> bool {
        let Some(from) = self.position(key) else {
            return false;
        };
        let last = self.rows.len().saturating_sub(1) as isize;
        let to = (from as isize + delta).clamp(0, last) as usize;
        if to == from {
            return false;
        }
        let row = self.rows.remove(from);
        self.rows.insert(to, row);
        self.renumber();
        true
    }

    fn renumber(&mut self) {
        for (index, row) in self.rows.iter_mut().enumerate() {
            row.sequence = index as u32 + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RowStore;
    use crate::test_support::{key, row};
    use crate::{Row, RowKey};

    fn store() -> RowStore {
        RowStore::from_snapshots(vec![
            row(1, 10, "Timer Introduction", &[1]),
            row(2, 20, "Prepared Speech", &[2]),
            row(3, 11, "Timer Report", &[1]),
        ])
    }

    #[test]
    fn new_snapshot_rows_get_distinct_local_keys() {
        let store = RowStore::from_snapshots(vec![
            Row::new(RowKey::New(0), 1),
            Row::new(RowKey::New(0), 2),
        ]);
        assert_eq!(store.keys(), vec![RowKey::New(1), RowKey::New(2)]);
    }

    #[test]
    fn move_row_reorders_and_renumbers() {
        let mut store = store();
        assert!(store.move_row(key(3), -2));
        assert_eq!(store.keys(), vec![key(3), key(1), key(2)]);
        let sequences: Vec<u32> = store.iter().map(|row| row.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
    }

    #[test]
    fn move_row_clamps_at_edges() {
        let mut store = store();
        assert!(!store.move_row(key(1), -1));
        assert!(store.move_row(key(1), 10));
        assert_eq!(store.keys(), vec![key(2), key(3), key(1)]);
    }

    #[test]
    fn insert_after_places_row_below_anchor() {
        let mut store = store();
        let new_key = store.allocate_new_key();
        store.insert_after(Some(key(1)), Row::new(new_key, 0));
        assert_eq!(store.keys(), vec![key(1), new_key, key(2), key(3)]);
        assert_eq!(store.get(new_key).map(|row| row.sequence), Some(2));

        let top = store.allocate_new_key();
        store.insert_after(None, Row::section(top, 0, "Opening"));
        assert_eq!(store.keys()[0], top);
    }

    #[test]
    fn remove_drops_row_and_renumbers() {
        let mut store = store();
        assert!(store.remove(key(1)).is_some());
        assert!(store.remove(key(1)).is_none());
        assert_eq!(store.get(key(3)).map(|row| row.sequence), Some(2));
    }
}
