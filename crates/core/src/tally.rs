//! Insertion-ordered keyed accumulator.

use std::collections::HashMap;

/// Accumulates values per string key, remembering first-seen key order.
///
/// Rankings built from a tally are sorted with a stable sort, so ties keep
/// the order in which their keys first appeared.
pub(crate) struct Tally<V> {
    index: HashMap<String, usize>,
    entries: Vec<(String, V)>,
}

impl<V> Tally<V> {
    pub(crate) fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Value for `key`, created with `init` the first time the key is seen.
    #[allow(clippy::indexing_slicing)] // idx always comes from a push into `entries`
    pub(crate) fn entry_with(&mut self, key: &str, init: impl FnOnce() -> V) -> &mut V {
        let idx = if let Some(&idx) = self.index.get(key) {
            idx
        } else {
            self.entries.push((key.to_owned(), init()));
            let idx = self.entries.len() - 1;
            self.index.insert(key.to_owned(), idx);
            idx
        };
        &mut self.entries[idx].1
    }

    pub(crate) fn into_entries(self) -> Vec<(String, V)> {
        self.entries
    }
}

impl<V: Default> Tally<V> {
    pub(crate) fn entry(&mut self, key: &str) -> &mut V {
        self.entry_with(key, V::default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_seen_order() {
        let mut tally: Tally<u64> = Tally::new();
        *tally.entry("b") += 1;
        *tally.entry("a") += 2;
        *tally.entry("b") += 3;

        let entries = tally.into_entries();
        assert_eq!(entries, vec![("b".to_string(), 4), ("a".to_string(), 2)]);
    }
}
