use rand::Rng;
use serde::{Deserialize, Serialize};

/// Anything that carries a selection weight.
pub trait Weight {
    fn weight(&self) -> u32;
}

/// Immutable list of weighted entries with a cached total.
///
/// Selection draws uniformly in `[0, total_weight)` and walks the cumulative
/// weights; the first entry whose running total exceeds the draw wins. The
/// outcome depends only on the RNG stream, so seeded generators reproduce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "Vec<T>",
    into = "Vec<T>",
    bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de> + Weight")
)]
pub struct WeightedList<T: Clone> {
    entries: Vec<T>,
    total_weight: u32,
}

impl<T: Clone> WeightedList<T> {
    /// Empty list. `const` so it can back a shared static.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
            total_weight: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn total_weight(&self) -> u32 {
        self.total_weight
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }
}

impl<T: Weight + Clone> WeightedList<T> {
    #[must_use]
    pub fn new(entries: Vec<T>) -> Self {
        let total_weight = entries
            .iter()
            .fold(0u32, |acc, e| acc.saturating_add(e.weight()));
        Self {
            entries,
            total_weight,
        }
    }

    /// Picks one entry, or `None` when the list carries no weight.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> Option<&T> {
        if self.total_weight == 0 {
            return None;
        }
        let draw = rng.gen_range(0..self.total_weight);
        let mut cumulative = 0u32;
        for entry in &self.entries {
            cumulative = cumulative.saturating_add(entry.weight());
            if cumulative > draw {
                return Some(entry);
            }
        }
        None
    }
}

impl<T: Weight + Clone + PartialEq> WeightedList<T> {
    #[must_use]
    pub fn contains(&self, entry: &T) -> bool {
        self.entries.iter().any(|e| e == entry)
    }
}

impl<T: Weight + Clone> From<Vec<T>> for WeightedList<T> {
    fn from(entries: Vec<T>) -> Self {
        Self::new(entries)
    }
}

impl<T: Clone> From<WeightedList<T>> for Vec<T> {
    fn from(list: WeightedList<T>) -> Self {
        list.entries
    }
}

impl<T: Clone> Default for WeightedList<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, T: Clone> IntoIterator for &'a WeightedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry(&'static str, u32);

    impl Weight for Entry {
        fn weight(&self) -> u32 {
            self.1
        }
    }

    #[test]
    fn test_empty_list_picks_nothing() {
        let list: WeightedList<Entry> = WeightedList::empty();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(list.pick(&mut rng).is_none());
    }

    #[test]
    fn test_zero_weight_entries_never_win() {
        let list = WeightedList::new(vec![Entry("a", 0), Entry("b", 5), Entry("c", 0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1000 {
            assert_eq!(list.pick(&mut rng).map(|e| e.0), Some("b"));
        }
    }

    #[test]
    fn test_all_zero_weights_picks_nothing() {
        let list = WeightedList::new(vec![Entry("a", 0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(list.pick(&mut rng).is_none());
        assert!(!list.is_empty());
    }

    #[test]
    fn test_total_and_contains() {
        let list = WeightedList::new(vec![Entry("a", 2), Entry("b", 3)]);
        assert_eq!(list.total_weight(), 5);
        assert!(list.contains(&Entry("b", 3)));
        assert!(!list.contains(&Entry("b", 4)));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let list = WeightedList::new(vec![Entry("a", 1), Entry("b", 1), Entry("c", 1)]);
        let mut r1 = ChaCha8Rng::seed_from_u64(42);
        let mut r2 = ChaCha8Rng::seed_from_u64(42);
        let s1: Vec<_> = (0..50).map(|_| list.pick(&mut r1).map(|e| e.0)).collect();
        let s2: Vec<_> = (0..50).map(|_| list.pick(&mut r2).map(|e| e.0)).collect();
        assert_eq!(s1, s2);
    }
}
