use core::fmt::Debug;

use crate::config::TableConfig;
use crate::error::ConfigError;
use crate::error::InsertionFailed;
use crate::hash_coder::DefaultCoder;
use crate::hash_coder::HashCoder;
use crate::hash_table::HashTable;
use crate::hash_table::Iter;

/// A fixed-capacity map from string keys to values, backed by a hopscotch
/// [`HashTable`].
///
/// Keys are reduced to 64-bit codes by the [`HashCoder`] `C` and only the
/// code is stored. Two keys whose codes collide are the same entry as far as
/// the map is concerned: adding the second replaces the first one's value,
/// and looking up either returns it. Pick a coder with a low collision rate
/// if that matters.
///
/// The map never resizes. [`HashMap::add`] fails with [`InsertionFailed`]
/// once no slot can be found within the hop range of a key's base bucket.
///
/// # Examples
///
/// ```rust
/// use hophash::HashMap;
/// use hophash::hash_coder::Fnv1a;
///
/// let mut map = HashMap::new(Fnv1a, 32, 16);
/// map.add("key1", "value1".to_string()).unwrap();
///
/// assert!(map.contains("key1"));
/// assert_eq!(map.get("key1").map(String::as_str), Some("value1"));
/// assert_eq!(map.get("key2"), None);
/// ```
#[derive(Clone)]
pub struct HashMap<V, C = DefaultCoder> {
    table: HashTable<V>,
    coder: C,
}

impl<V, C> Debug for HashMap<V, C>
where
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (code, v) in self.iter() {
            map.entry(&code, v);
        }
        map.finish()
    }
}

impl<V, C> HashMap<V, C>
where
    C: HashCoder,
{
    /// Creates a map with `2^power` slots, hop range `hop_range` and the
    /// given coder.
    ///
    /// # Panics
    ///
    /// Panics on an invalid configuration, see [`TableConfig::validate`].
    /// [`HashMap::try_new`] reports it as an error instead.
    pub fn new(coder: C, hop_range: usize, power: u32) -> Self {
        Self {
            table: HashTable::new(hop_range, power),
            coder,
        }
    }

    /// Creates a map, validating the configuration first.
    ///
    /// ```rust
    /// use hophash::HashMap;
    /// use hophash::hash_coder::Fnv1a;
    ///
    /// assert!(HashMap::<u8, _>::try_new(Fnv1a, 64, 4).is_err());
    /// assert!(HashMap::<u8, _>::try_new(Fnv1a, 4, 4).is_ok());
    /// ```
    pub fn try_new(coder: C, hop_range: usize, power: u32) -> Result<Self, ConfigError> {
        Self::from_config(coder, TableConfig::new(hop_range, power))
    }

    /// Creates a map from a [`TableConfig`].
    pub fn from_config(coder: C, config: TableConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            table: HashTable::from_config(config)?,
            coder,
        })
    }

    /// Adds `value` under `key`, replacing the value of any entry with the
    /// same hash code.
    ///
    /// # Errors
    ///
    /// Returns [`InsertionFailed`] when the entry cannot be placed within the
    /// hop range of its base bucket. The map is never resized; already stored
    /// entries stay reachable.
    pub fn add(&mut self, key: &str, value: V) -> Result<(), InsertionFailed> {
        self.insert(key, value).map(|_| ())
    }

    /// Like [`HashMap::add`], but returns the value that was replaced.
    ///
    /// ```rust
    /// use hophash::HashMap;
    /// use hophash::hash_coder::Fnv1a;
    ///
    /// let mut map = HashMap::new(Fnv1a, 8, 8);
    /// assert_eq!(map.insert("a", 1), Ok(None));
    /// assert_eq!(map.insert("a", 2), Ok(Some(1)));
    /// ```
    pub fn insert(&mut self, key: &str, value: V) -> Result<Option<V>, InsertionFailed> {
        let code = self.coder.code(key);
        self.table.insert(code, value)
    }

    /// Returns `true` if an entry with the key's hash code is present.
    pub fn contains(&self, key: &str) -> bool {
        self.table.contains(self.coder.code(key))
    }

    /// Returns the value stored under the key's hash code.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.table.find(self.coder.code(key))
    }

    /// Returns a mutable reference to the value stored under the key's hash
    /// code.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let code = self.coder.code(key);
        self.table.find_mut(code)
    }
}

impl<V, C> HashMap<V, C> {
    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the total number of slots, fixed at construction.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the configured hop range.
    pub fn hop_range(&self) -> usize {
        self.table.hop_range()
    }

    /// Returns the coder used to hash keys.
    pub fn coder(&self) -> &C {
        &self.coder
    }

    /// Returns an iterator over `(code, &value)` pairs in slot order.
    ///
    /// Keys are not stored, so entries are identified by hash code.
    pub fn iter(&self) -> Iter<'_, V> {
        self.table.iter()
    }

    /// Returns the underlying code-keyed table.
    pub fn as_table(&self) -> &HashTable<V> {
        &self.table
    }
}

impl<V, C> Default for HashMap<V, C>
where
    C: HashCoder + Default,
{
    /// Creates a map with [`TableConfig::default`] sizing.
    fn default() -> Self {
        let config = TableConfig::default();
        Self::new(C::default(), config.hop_range, config.power)
    }
}

impl<'a, V, C> IntoIterator for &'a HashMap<V, C> {
    type IntoIter = Iter<'a, V>;
    type Item = (u64, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::format;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::hash_coder::BuildHasherCoder;
    use crate::hash_coder::Fnv1a;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    /// Coder that maps each key to a code chosen by the test.
    struct PinnedCoder {
        codes: BTreeMap<String, u64>,
    }

    impl PinnedCoder {
        fn new(codes: &[(&str, u64)]) -> Self {
            Self {
                codes: codes.iter().map(|&(k, c)| (k.to_string(), c)).collect(),
            }
        }
    }

    impl HashCoder for PinnedCoder {
        fn code(&self, key: &str) -> u64 {
            self.codes.get(key).copied().unwrap_or(0)
        }
    }

    fn pinned_map(codes: &[(&str, u64)]) -> HashMap<String, PinnedCoder> {
        HashMap::new(PinnedCoder::new(codes), 4, 4)
    }

    fn add_all<C: HashCoder>(map: &mut HashMap<String, C>, keys: &str) {
        for key in keys.chars() {
            let key = key.to_string();
            map.add(&key, key.clone()).unwrap();
        }
    }

    fn value_at<C>(map: &HashMap<String, C>, index: usize) -> Option<&str> {
        map.table.value_at(index).map(String::as_str)
    }

    #[test]
    fn fit_within_range_same_base() {
        let mut map = pinned_map(&[("a", 1), ("b", 17), ("c", 33), ("d", 49)]);
        add_all(&mut map, "abcd");

        for (index, key) in ["a", "b", "c", "d"].into_iter().enumerate() {
            assert_eq!(value_at(&map, index + 1), Some(key));
        }
    }

    #[test]
    fn fit_within_range_different_base() {
        let mut map = pinned_map(&[("a", 1), ("b", 2), ("c", 18), ("d", 4)]);
        add_all(&mut map, "abcd");

        assert_eq!(value_at(&map, 1), Some("a"));
        assert_eq!(value_at(&map, 2), Some("b"));
        assert_eq!(value_at(&map, 3), Some("c"));
        assert_eq!(value_at(&map, 4), Some("d"));
    }

    #[test]
    fn out_of_range_displaces_once() {
        let mut map = pinned_map(&[("a", 1), ("b", 2), ("c", 18), ("d", 34), ("e", 17)]);
        add_all(&mut map, "abcd");
        assert_eq!(value_at(&map, 5), None);

        map.add("e", "e".to_string()).unwrap();
        assert_eq!(value_at(&map, 2), Some("e"));
        assert_eq!(value_at(&map, 5), Some("b"));
        for key in ["a", "b", "c", "d", "e"] {
            assert_eq!(map.get(key).map(String::as_str), Some(key));
        }
        map.table.assert_neighborhood_invariant();
    }

    #[test]
    fn out_of_range_multiple_iterations() {
        let mut map = pinned_map(&[
            ("a", 1),
            ("b", 2),
            ("c", 18),
            ("d", 3),
            ("e", 19),
            ("f", 4),
            ("g", 6),
            ("h", 22),
            ("i", 8),
            ("j", 20),
        ]);
        add_all(&mut map, "abcdefghi");

        map.add("j", "j".to_string()).unwrap();
        assert_eq!(value_at(&map, 10), Some("i"));
        assert_eq!(value_at(&map, 9), Some("g"));
        assert_eq!(value_at(&map, 7), Some("j"));
        assert_eq!(map.len(), 10);
        map.table.assert_neighborhood_invariant();
    }

    #[test]
    fn aliased_keys_share_an_entry() {
        let mut map = pinned_map(&[("first", 5), ("second", 5)]);
        map.add("first", "one".to_string()).unwrap();
        map.add("second", "two".to_string()).unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("first").map(String::as_str), Some("two"));
        assert_eq!(map.get("second").map(String::as_str), Some("two"));
    }

    #[test]
    fn full_map_fails_without_corruption() {
        let keys: Vec<String> = (0..5).map(|i| format!("k{i}")).collect();
        let pins: Vec<(&str, u64)> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.as_str(), i as u64))
            .collect();
        let mut map = HashMap::new(PinnedCoder::new(&pins), 2, 2);

        for key in &keys[..4] {
            map.add(key, key.clone()).unwrap();
        }
        let err = map.add(&keys[4], keys[4].clone()).unwrap_err();
        assert_eq!(err.code(), 4);
        assert!(!map.contains(&keys[4]));

        for key in &keys[..4] {
            assert_eq!(map.get(key), Some(key));
        }
    }

    #[test]
    fn get_mut_and_insert_return_previous() {
        let mut map = HashMap::new(Fnv1a, 8, 6);
        assert_eq!(map.insert("hello", "world".to_string()), Ok(None));
        map.get_mut("hello").unwrap().push('!');
        assert_eq!(
            map.insert("hello", "again".to_string()),
            Ok(Some("world!".to_string()))
        );
        assert_eq!(map.get_mut("missing"), None);
    }

    #[test]
    fn add_get_high_load_limited() {
        let mut map = HashMap::new(Fnv1a, 2, 4);
        for i in 1..15 {
            let key = format!("key{i}");
            if map.add(&key, i).is_ok() {
                assert_eq!(map.get(&key), Some(&i));
            }
        }
        map.table.assert_neighborhood_invariant();
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn add_get_high_load() {
        let coder = BuildHasherCoder::new(SipHashBuilder::default());
        let mut map = HashMap::new(coder, 32, 14);
        let mut added = Vec::new();

        for i in 0..(1 << 14) - 500 {
            let key = format!("key{i}");
            if map.add(&key, i).is_ok() {
                assert_eq!(map.get(&key), Some(&i));
                added.push((key, i));
            }
        }

        for (key, i) in &added {
            assert!(map.contains(key));
            assert_eq!(map.get(key), Some(i));
        }
        map.table.assert_neighborhood_invariant();
    }

    #[test]
    fn misses_return_none() {
        let mut map = HashMap::new(Fnv1a, 32, 12);
        for i in 0..400 {
            let _ = map.add(&format!("{i}"), i);
        }
        for i in 400..800 {
            let key = format!("{i}");
            assert!(!map.contains(&key));
            assert_eq!(map.get(&key), None);
        }
    }

    #[test]
    fn same_sequence_same_layout() {
        let build = || {
            let mut map = HashMap::<usize, Fnv1a>::new(Fnv1a, 4, 8);
            for i in 0..300 {
                let _ = map.add(&format!("key{i}"), i);
            }
            map
        };

        let first = build();
        let second = build();
        assert!(first.iter().eq(second.iter()));
        for index in 0..first.capacity() {
            assert_eq!(first.table.code_at(index), second.table.code_at(index));
        }
    }

    #[test]
    fn default_map_uses_default_config() {
        let map: HashMap<u32> = HashMap::default();
        assert_eq!(map.capacity(), 1 << 16);
        assert_eq!(map.hop_range(), 32);
        assert!(map.is_empty());
    }

    #[test]
    fn debug_prints_codes() {
        let mut map = pinned_map(&[("x", 3)]);
        map.add("x", "y".to_string()).unwrap();
        assert_eq!(format!("{:?}", map), "{3: \"y\"}");
        assert_eq!(map.as_table().len(), 1);
    }

    #[test]
    fn from_config_rejects_bad_hop_range() {
        let err = HashMap::<u8, _>::from_config(Fnv1a, TableConfig::new(0, 8)).unwrap_err();
        assert_eq!(err, ConfigError::ZeroHopRange);
    }
}
