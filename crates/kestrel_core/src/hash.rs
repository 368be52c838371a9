//! Hash state for the engine's lookup tables.

use ahash::RandomState;

/// Seeded hasher state used by every hash map and set in the engine.
pub const HASH_RANDOM_STATE: RandomState = RandomState::with_seeds(0, 0, 0, 0);

#[cfg(test)]
mod tests {
    use std::hash::BuildHasher;

    use hashbrown::HashSet;

    use super::*;

    #[test]
    fn hashing_is_deterministic() {
        let first = HASH_RANDOM_STATE.hash_one("cpu");
        let second = RandomState::with_seeds(0, 0, 0, 0).hash_one("cpu");
        assert_eq!(first, second);
    }

    #[test]
    fn seeded_set() {
        let mut set = HashSet::with_hasher(HASH_RANDOM_STATE);
        assert!(set.insert("a"));
        assert!(!set.insert("a"));
        assert_eq!(1, set.len());
    }
}
