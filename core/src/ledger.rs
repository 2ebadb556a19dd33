//! # Screen Ledger
//!
//! The ordered record of screens a flow has rendered. New screens are appended
//! after the active position; anything past that position (the "redo" history
//! left behind by `back`) is discarded first.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SCREEN_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-wide unique, monotonically increasing screen id.
pub fn next_screen_id() -> u64 {
    NEXT_SCREEN_ID.fetch_add(1, Ordering::Relaxed)
}

/// One rendered instantiation of a stack item.
///
/// `I` is the stack item type, `V` the opaque view produced by its render function.
#[derive(Debug)]
pub struct Screen<I, V> {
    pub id: u64,
    pub item: Arc<I>,
    /// Position of `item` in the flow's stack list.
    pub stack_index: usize,
    /// Last render output, `None` while outside the render distance.
    pub result: Option<V>,
    pub busy: bool,
}

impl<I, V> Screen<I, V> {
    pub fn new(item: Arc<I>, stack_index: usize) -> Self {
        Self {
            id: next_screen_id(),
            item,
            stack_index,
            result: None,
            busy: false,
        }
    }

    pub fn busy(mut self) -> Self {
        self.busy = true;
        self
    }
}

impl<I, V: Clone> Clone for Screen<I, V> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            item: self.item.clone(),
            stack_index: self.stack_index,
            result: self.result.clone(),
            busy: self.busy,
        }
    }
}

#[derive(Debug)]
pub struct ScreenLedger<I, V> {
    screens: Vec<Screen<I, V>>,
}

impl<I, V> Default for ScreenLedger<I, V> {
    fn default() -> Self {
        Self {
            screens: Vec::new(),
        }
    }
}

impl<I, V> ScreenLedger<I, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `screen` right after position `after`, discarding everything beyond it.
    ///
    /// `after = None` means "before the first entry" and clears the ledger.
    /// Returns the index of the new entry.
    pub fn append(&mut self, after: Option<usize>, screen: Screen<I, V>) -> usize {
        let keep = after.map_or(0, |i| i + 1);
        self.screens.truncate(keep);
        self.screens.push(screen);
        self.screens.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Screen<I, V>> {
        self.screens.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Screen<I, V>> {
        self.screens.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    pub fn truncate(&mut self, len: usize) {
        self.screens.truncate(len);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Screen<I, V>> {
        self.screens.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Screen<I, V>> {
        self.screens.iter_mut()
    }

    pub fn as_slice(&self) -> &[Screen<I, V>] {
        &self.screens
    }

    /// Drop the oldest entries once the ledger outgrows `max_screens`.
    ///
    /// Removes `ceil(len * drop_ratio)` entries from the head, never reaching
    /// `active`. Returns how many entries were dropped; the caller shifts its
    /// cursor by that amount.
    pub fn prune(&mut self, max_screens: usize, drop_ratio: f64, active: usize) -> usize {
        let len = self.screens.len();
        if len <= max_screens {
            return 0;
        }
        let wanted = (len as f64 * drop_ratio).ceil() as usize;
        let dropped = wanted.max(1).min(active);
        self.screens.drain(..dropped);
        dropped
    }
}

impl<'a, I, V> IntoIterator for &'a ScreenLedger<I, V> {
    type Item = &'a Screen<I, V>;
    type IntoIter = std::slice::Iter<'a, Screen<I, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.screens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_of(n: usize) -> ScreenLedger<&'static str, u32> {
        let item = Arc::new("item");
        let mut ledger = ScreenLedger::new();
        let mut at = None;
        for i in 0..n {
            at = Some(ledger.append(at, Screen::new(item.clone(), i)));
        }
        ledger
    }

    #[test]
    fn test_ids_increase() {
        let ledger = ledger_of(3);
        let ids: Vec<u64> = ledger.iter().map(|s| s.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_append_truncates_redo_history() {
        let mut ledger = ledger_of(4);
        let idx = ledger.append(Some(1), Screen::new(Arc::new("other"), 9));

        assert_eq!(idx, 2);
        assert_eq!(ledger.len(), 3);
        assert_eq!(*ledger.get(2).unwrap().item, "other");
        assert!(ledger.get(3).is_none());
    }

    #[test]
    fn test_append_before_head_clears() {
        let mut ledger = ledger_of(2);
        assert_eq!(ledger.append(None, Screen::new(Arc::new("x"), 0)), 0);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_prune_drops_oldest() {
        let mut ledger = ledger_of(11);
        let last_id = ledger.get(10).unwrap().id;

        let dropped = ledger.prune(10, 0.3, 10);

        assert_eq!(dropped, 4);
        assert_eq!(ledger.len(), 7);
        assert_eq!(ledger.get(6).unwrap().id, last_id);
    }

    #[test]
    fn test_prune_keeps_active_screen() {
        let mut ledger = ledger_of(6);
        let active_id = ledger.get(1).unwrap().id;

        let dropped = ledger.prune(3, 0.9, 1);

        assert_eq!(dropped, 1);
        assert_eq!(ledger.get(0).unwrap().id, active_id);
    }

    #[test]
    fn test_prune_within_bound_is_noop() {
        let mut ledger = ledger_of(3);
        assert_eq!(ledger.prune(3, 0.5, 2), 0);
        assert_eq!(ledger.len(), 3);
    }
}
