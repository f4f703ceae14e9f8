//! Hash collections used by the parser's binding analysis.

use indexmap::IndexMap;
use std::hash::BuildHasherDefault;

pub use rustc_hash::{FxHashMap, FxHashSet, FxHasher};

/// An insertion-ordered map with the Fx hasher. Used where iteration order
/// decides which error is reported first.
pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_map_keeps_insertion_order() {
        let mut map: FxIndexMap<&str, u32> = FxIndexMap::default();
        map.insert("z", 1);
        map.insert("a", 2);
        map.insert("m", 3);
        map.shift_remove("a");
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec!["z", "m"]);
    }
}
