//! Bit set of variables.
//!
//! Used for the to-patch set (basic variables that may violate their bounds)
//! and for the set of variables already selected during one feasibility check.
//! Both need O(1) insert/remove, cheap "smallest member" for Bland's rule, and
//! selection of the k-th member for random selection.

use crate::types::Var;

/// A set of [`Var`]s backed by a vector of u64 words.
///
/// Grows automatically when inserting beyond the current capacity.
#[derive(Debug, Clone, Default)]
pub struct VarSet {
    words: Vec<u64>,
    /// Number of members (cached for O(1) len()).
    count: usize,
}

impl VarSet {
    const BITS_PER_WORD: usize = 64;

    /// Creates an empty set with room for `capacity` variables.
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(Self::BITS_PER_WORD)],
            count: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Ensures the set can hold variables below `bound` without reallocating.
    pub fn reserve(&mut self, bound: usize) {
        let needed = bound.div_ceil(Self::BITS_PER_WORD);
        if needed > self.words.len() {
            self.words.resize(needed, 0);
        }
    }

    #[inline]
    fn word_and_bit(var: Var) -> (usize, usize) {
        let index = var.index();
        (index / Self::BITS_PER_WORD, index % Self::BITS_PER_WORD)
    }

    #[inline]
    pub fn contains(&self, var: Var) -> bool {
        let (word, bit) = Self::word_and_bit(var);
        word < self.words.len() && self.words[word] & (1u64 << bit) != 0
    }

    /// Adds `var`. Returns true if it was not a member before.
    pub fn insert(&mut self, var: Var) -> bool {
        let (word, bit) = Self::word_and_bit(var);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let mask = 1u64 << bit;
        let was_clear = self.words[word] & mask == 0;
        if was_clear {
            self.words[word] |= mask;
            self.count += 1;
        }
        was_clear
    }

    /// Removes `var`. Returns true if it was a member.
    pub fn remove(&mut self, var: Var) -> bool {
        let (word, bit) = Self::word_and_bit(var);
        if word >= self.words.len() {
            return false;
        }
        let mask = 1u64 << bit;
        let was_set = self.words[word] & mask != 0;
        if was_set {
            self.words[word] &= !mask;
            self.count -= 1;
        }
        was_set
    }

    /// The member with the smallest index.
    pub fn first(&self) -> Option<Var> {
        self.iter().next()
    }

    /// The `n`-th member in increasing index order.
    pub fn nth(&self, mut n: usize) -> Option<Var> {
        if n >= self.count {
            return None;
        }
        for (i, &word) in self.words.iter().enumerate() {
            let ones = word.count_ones() as usize;
            if n < ones {
                let mut w = word;
                for _ in 0..n {
                    w &= w - 1;
                }
                let bit = w.trailing_zeros() as usize;
                return Some(Var::new((i * Self::BITS_PER_WORD + bit) as u32));
            }
            n -= ones;
        }
        None
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
        self.count = 0;
    }

    /// Iterates over members in increasing index order.
    pub fn iter(&self) -> VarSetIter<'_> {
        VarSetIter {
            set: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }
}

pub struct VarSetIter<'a> {
    set: &'a VarSet,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for VarSetIter<'_> {
    type Item = Var;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1;
                return Some(Var::new((self.word_idx * VarSet::BITS_PER_WORD + bit) as u32));
            }
            self.word_idx += 1;
            if self.word_idx >= self.set.words.len() {
                return None;
            }
            self.current_word = self.set.words[self.word_idx];
        }
    }
}

impl Extend<Var> for VarSet {
    fn extend<I: IntoIterator<Item = Var>>(&mut self, iter: I) {
        for var in iter {
            self.insert(var);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(i: u32) -> Var {
        Var::new(i)
    }

    #[test]
    fn test_empty() {
        let set = VarSet::default();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert!(!set.contains(v(0)));
        assert!(!set.contains(v(100)));
        assert_eq!(set.first(), None);
        assert_eq!(set.nth(0), None);
    }

    #[test]
    fn test_insert_remove() {
        let mut set = VarSet::new(100);
        assert!(set.insert(v(42)));
        assert!(!set.insert(v(42)));
        assert!(set.contains(v(42)));
        assert_eq!(set.len(), 1);
        assert!(set.remove(v(42)));
        assert!(!set.remove(v(42)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_auto_grow() {
        let mut set = VarSet::default();
        set.insert(v(1000));
        assert!(set.contains(v(1000)));
        assert_eq!(set.first(), Some(v(1000)));
    }

    #[test]
    fn test_first_and_nth() {
        let mut set = VarSet::new(10);
        set.extend([v(65), v(5), v(3), v(64), v(10)]);
        assert_eq!(set.first(), Some(v(3)));
        assert_eq!(set.nth(0), Some(v(3)));
        assert_eq!(set.nth(2), Some(v(10)));
        assert_eq!(set.nth(3), Some(v(64)));
        assert_eq!(set.nth(4), Some(v(65)));
        assert_eq!(set.nth(5), None);
        let members: Vec<_> = set.iter().collect();
        assert_eq!(members, vec![v(3), v(5), v(10), v(64), v(65)]);
    }

    #[test]
    fn test_clear() {
        let mut set = VarSet::new(100);
        set.extend([v(1), v(50), v(99)]);
        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(v(50)));
        assert_eq!(set.iter().count(), 0);
    }
}
