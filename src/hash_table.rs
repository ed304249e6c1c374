//! A fixed-capacity hopscotch hash table keyed by 64-bit hash codes.
//!
//! [`HashTable`] stores values under their hash code alone; callers compute
//! the code (see [`HashMap`](crate::HashMap) for a wrapper that does this from
//! string keys). Every entry lives inside the hop neighborhood of its base
//! bucket, so lookups only ever scan `hop_range` slots. When an insertion
//! finds its nearest empty slot outside that neighborhood, existing entries
//! are shuffled forward to pull the empty slot back into range. The table
//! never grows: if no such shuffle exists the insertion fails.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::config::TableConfig;
use crate::error::ConfigError;
use crate::error::InsertionFailed;

#[derive(Clone)]
struct Occupant<V> {
    code: u64,
    value: V,
}

/// Search for a movable index in the bubble range.
///
/// Returns the lowest index in `[bubble_base, empty_idx)` whose occupant could
/// legally live at `empty_idx`, i.e. whose base bucket is fewer than
/// `hop_range` slots before `empty_idx`.
#[inline]
fn find_next_movable_index<V>(
    slots: &[Option<Occupant<V>>],
    bubble_base: usize,
    empty_idx: usize,
    mask: usize,
    hop_range: usize,
) -> Option<usize> {
    slots[bubble_base..empty_idx]
        .iter()
        .position(|slot| match slot {
            Some(occupant) => {
                let root = occupant.code as usize & mask;
                empty_idx.wrapping_sub(root) < hop_range
            }
            None => false,
        })
        .map(|offset| bubble_base + offset)
}

/// Distribution and utilization statistics for a table.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries currently stored.
    pub populated: usize,
    /// Total number of slots.
    pub total_slots: usize,
    /// Configured neighborhood width.
    pub hop_range: usize,
    /// `populated / total_slots`.
    pub load_factor: f64,
    /// Largest distance of any entry from its base bucket.
    pub max_probe_length: usize,
    /// Bytes used by the slot array.
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hopscotch Table Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.total_slots,
            self.load_factor * 100.0
        );
        println!(
            "Max probe length: {} (hop range {})",
            self.max_probe_length, self.hop_range
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// A fixed-capacity hash table using hopscotch hashing.
///
/// The table has exactly `2^power` slots. An entry with hash code `c` has
/// base bucket `c & (size - 1)` and is always stored in
/// `base..=min(base + hop_range - 1, size - 1)`. The neighborhood does not
/// wrap around, so buckets near the end of the table have fewer legal slots.
///
/// Identity is the hash code: inserting a code that is already present
/// replaces the stored value.
///
/// # Examples
///
/// ```rust
/// use hophash::HashTable;
///
/// let mut table = HashTable::new(4, 4);
/// assert_eq!(table.insert(1, "a"), Ok(None));
/// assert_eq!(table.insert(17, "b"), Ok(None));
///
/// assert_eq!(table.find(17), Some(&"b"));
/// assert!(!table.contains(33));
///
/// // Same code, new value.
/// assert_eq!(table.insert(1, "c"), Ok(Some("a")));
/// assert_eq!(table.len(), 2);
/// ```
#[derive(Clone)]
pub struct HashTable<V> {
    slots: Box<[Option<Occupant<V>>]>,
    populated: usize,
    mask: usize,
    hop_range: usize,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::ToString;

        f.debug_struct("HashTable")
            .field("populated", &self.populated)
            .field("capacity", &self.slots.len())
            .field("hop_range", &self.hop_range)
            .field(
                "slots",
                &self
                    .slots
                    .chunks(16)
                    .enumerate()
                    .map(|(row, w)| {
                        let mut items = Vec::new();
                        for (col, slot) in w.iter().enumerate() {
                            match slot {
                                Some(occupant) => items.push(format!(
                                    "{:016x}+{:02}",
                                    occupant.code,
                                    self.probe_length(occupant.code, row * 16 + col)
                                )),
                                None => items.push("..".to_string()),
                            }
                        }
                        items.join(", ")
                    })
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<V> HashTable<V> {
    /// Creates a table with `2^power` empty slots and the given hop range.
    ///
    /// # Panics
    ///
    /// Panics if `hop_range` is zero or larger than `2^power`, or if `power`
    /// is not below the pointer width. Use [`HashTable::try_new`] to handle
    /// these as errors.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hophash::HashTable;
    ///
    /// let table: HashTable<String> = HashTable::new(8, 10);
    /// assert_eq!(table.capacity(), 1024);
    /// assert_eq!(table.hop_range(), 8);
    /// ```
    pub fn new(hop_range: usize, power: u32) -> Self {
        match Self::try_new(hop_range, power) {
            Ok(table) => table,
            Err(err) => panic!("invalid hopscotch table configuration: {err}"),
        }
    }

    /// Creates a table, validating the configuration first.
    ///
    /// ```rust
    /// use hophash::HashTable;
    /// use hophash::error::ConfigError;
    ///
    /// assert!(HashTable::<u32>::try_new(4, 4).is_ok());
    /// assert_eq!(
    ///     HashTable::<u32>::try_new(0, 4).unwrap_err(),
    ///     ConfigError::ZeroHopRange
    /// );
    /// ```
    pub fn try_new(hop_range: usize, power: u32) -> Result<Self, ConfigError> {
        Self::from_config(TableConfig::new(hop_range, power))
    }

    /// Creates a table from a [`TableConfig`].
    pub fn from_config(config: TableConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let size = config.size()?;

        let mut slots = Vec::with_capacity(size);
        slots.resize_with(size, || None);

        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(size, hop_range = config.hop_range, "hopscotch table allocated");
        }

        Ok(Self {
            slots: slots.into_boxed_slice(),
            populated: 0,
            mask: size - 1,
            hop_range: config.hop_range,
        })
    }

    /// Returns the number of entries in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the total number of slots. This never changes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the configured hop range.
    #[inline]
    pub fn hop_range(&self) -> usize {
        self.hop_range
    }

    /// Inserts `value` under `code`.
    ///
    /// Returns the previous value if `code` was already present. Otherwise
    /// the nearest empty slot at or after the base bucket is claimed, after
    /// displacing other entries if that slot is outside the hop range.
    ///
    /// # Errors
    ///
    /// Returns [`InsertionFailed`] if there is no empty slot at or after the
    /// base bucket, or if displacement cannot bring one within range. Entries
    /// moved by a failed displacement stay where they were moved to; every
    /// stored entry remains inside its own neighborhood and reachable.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hophash::HashTable;
    ///
    /// // Two slots, hop range 1: each entry must sit exactly on its base.
    /// let mut table = HashTable::new(1, 1);
    /// assert!(table.insert(0, "zero").is_ok());
    /// assert!(table.insert(2, "two").is_err());
    /// assert!(table.insert(1, "one").is_ok());
    /// ```
    pub fn insert(&mut self, code: u64, value: V) -> Result<Option<V>, InsertionFailed> {
        let base = self.base_bucket(code);

        if let Some(occupant) = self.neighborhood_mut(base).flatten().find(|o| o.code == code) {
            return Ok(Some(core::mem::replace(&mut occupant.value, value)));
        }

        let Some(empty_idx) = self.find_next_unoccupied(base) else {
            return Err(self.insertion_failed(code, base, "no empty slot"));
        };

        let landing_idx = if empty_idx <= self.last_in_range(base) {
            empty_idx
        } else {
            match self.displace(empty_idx, base) {
                Some(idx) => idx,
                None => return Err(self.insertion_failed(code, base, "no displacement candidate")),
            }
        };

        debug_assert!(self.slots[landing_idx].is_none());
        self.slots[landing_idx] = Some(Occupant { code, value });
        self.populated += 1;

        Ok(None)
    }

    /// Finds the value stored under `code`.
    ///
    /// Only the hop neighborhood of the base bucket is scanned.
    #[inline]
    pub fn find(&self, code: u64) -> Option<&V> {
        if self.populated == 0 {
            return None;
        }

        let base = self.base_bucket(code);
        self.neighborhood(base)
            .flatten()
            .find(|o| o.code == code)
            .map(|o| &o.value)
    }

    /// Finds the value stored under `code`, mutably.
    #[inline]
    pub fn find_mut(&mut self, code: u64) -> Option<&mut V> {
        if self.populated == 0 {
            return None;
        }

        let base = self.base_bucket(code);
        self.neighborhood_mut(base)
            .flatten()
            .find(|o| o.code == code)
            .map(|o| &mut o.value)
    }

    /// Returns `true` if a value is stored under `code`.
    #[inline]
    pub fn contains(&self, code: u64) -> bool {
        self.find(code).is_some()
    }

    /// Returns an iterator over `(code, &value)` pairs in slot order.
    ///
    /// ```rust
    /// use hophash::HashTable;
    ///
    /// let mut table = HashTable::new(4, 4);
    /// table.insert(3, 'x').unwrap();
    /// table.insert(1, 'y').unwrap();
    ///
    /// let entries: Vec<_> = table.iter().collect();
    /// assert_eq!(entries, vec![(1, &'y'), (3, &'x')]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.slots.iter(),
            remaining: self.populated,
        }
    }

    #[inline(always)]
    fn base_bucket(&self, code: u64) -> usize {
        (code as usize) & self.mask
    }

    /// Last index an entry with this base may occupy, before clamping to the
    /// table size.
    #[inline(always)]
    fn last_in_range(&self, base: usize) -> usize {
        base.saturating_add(self.hop_range - 1)
    }

    #[inline(always)]
    fn neighborhood_end(&self, base: usize) -> usize {
        self.last_in_range(base).min(self.mask)
    }

    #[inline(always)]
    fn neighborhood(&self, base: usize) -> core::slice::Iter<'_, Option<Occupant<V>>> {
        self.slots[base..=self.neighborhood_end(base)].iter()
    }

    #[inline(always)]
    fn neighborhood_mut(&mut self, base: usize) -> core::slice::IterMut<'_, Option<Occupant<V>>> {
        let end = self.neighborhood_end(base);
        self.slots[base..=end].iter_mut()
    }

    #[inline(always)]
    fn probe_length(&self, code: u64, index: usize) -> usize {
        index - self.base_bucket(code)
    }

    /// Find the next unoccupied index starting from `start`, without wrapping.
    #[inline]
    fn find_next_unoccupied(&self, start: usize) -> Option<usize> {
        self.slots[start..]
            .iter()
            .position(Option::is_none)
            .map(|idx| idx + start)
    }

    /// Bubble the empty slot at `empty_idx` back towards `base` until it is
    /// within the hop range of `base`.
    ///
    /// Each step moves the lowest-indexed entry that may legally occupy the
    /// current empty slot into it, leaving its old slot empty. Returns the
    /// final empty index, or `None` if the chain gets stuck.
    fn displace(&mut self, mut empty_idx: usize, base: usize) -> Option<usize> {
        let last_legal = self.last_in_range(base);

        while empty_idx > base {
            // Nothing before this can reach `empty_idx`.
            let bubble_base = empty_idx.saturating_sub(self.hop_range - 1);
            let moved_idx = find_next_movable_index(
                &self.slots,
                bubble_base,
                empty_idx,
                self.mask,
                self.hop_range,
            )?;

            debug_assert_ne!(moved_idx, empty_idx);
            let moved = self.slots[moved_idx].take();
            if tracing::enabled!(tracing::Level::TRACE) {
                if let Some(occupant) = &moved {
                    tracing::trace!(
                        code = occupant.code,
                        from = moved_idx,
                        to = empty_idx,
                        "displaced entry"
                    );
                }
            }
            self.slots[empty_idx] = moved;
            empty_idx = moved_idx;

            if empty_idx <= last_legal {
                return Some(empty_idx);
            }
        }

        None
    }

    #[cold]
    fn insertion_failed(&self, code: u64, base: usize, reason: &'static str) -> InsertionFailed {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(
                code,
                base,
                populated = self.populated,
                capacity = self.slots.len(),
                reason,
                "hopscotch insertion failed"
            );
        }
        InsertionFailed::new(code)
    }

    #[cfg(test)]
    pub(crate) fn code_at(&self, index: usize) -> Option<u64> {
        self.slots[index].as_ref().map(|o| o.code)
    }

    #[cfg(test)]
    pub(crate) fn value_at(&self, index: usize) -> Option<&V> {
        self.slots[index].as_ref().map(|o| &o.value)
    }

    /// Checks that every entry sits inside its own neighborhood.
    #[cfg(test)]
    pub(crate) fn assert_neighborhood_invariant(&self) {
        let mut populated = 0;
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(occupant) = slot {
                populated += 1;
                let base = self.base_bucket(occupant.code);
                assert!(
                    base <= index && index <= self.neighborhood_end(base),
                    "code {:#x} with base {} stored at {}: {:#?}",
                    occupant.code,
                    base,
                    index,
                    self
                );
            }
        }
        assert_eq!(populated, self.populated);
    }

    /// Computes a histogram of probe lengths for the current table state.
    ///
    /// Entry `i` of the returned vector counts the entries stored `i` slots
    /// after their base bucket. The vector has `hop_range` entries.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> Vec<usize> {
        let mut hist = alloc::vec![0usize; self.hop_range];
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(occupant) = slot {
                hist[self.probe_length(occupant.code, index)] += 1;
            }
        }
        hist
    }

    /// Returns utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let total_slots = self.slots.len();
        let max_probe_length = self
            .probe_histogram()
            .iter()
            .rposition(|&count| count != 0)
            .unwrap_or(0);

        DebugStats {
            populated: self.populated,
            total_slots,
            hop_range: self.hop_range,
            load_factor: self.populated as f64 / total_slots as f64,
            max_probe_length,
            total_bytes: total_slots * core::mem::size_of::<Option<Occupant<V>>>(),
        }
    }
}

/// An iterator over the entries of a [`HashTable`], in slot order.
///
/// Created by [`HashTable::iter`].
pub struct Iter<'a, V> {
    inner: core::slice::Iter<'a, Option<Occupant<V>>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.inner.by_ref() {
            if let Some(occupant) = slot {
                self.remaining -= 1;
                return Some((occupant.code, &occupant.value));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = (u64, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
