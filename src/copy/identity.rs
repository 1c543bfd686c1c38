//! Source-to-destination object number mapping for one copy campaign.

use std::collections::BTreeMap;

/// Maps source object numbers to the destination numbers allocated for them.
///
/// One map describes one *campaign*: a sequence of copies between the same
/// two documents that must share copied objects. Once a source number is
/// mapped the entry is fixed for the lifetime of the map.
///
/// # Examples
///
/// ```
/// use pdfjuggle::copy::IdentityMap;
///
/// let mut map = IdentityMap::new();
/// assert_eq!(map.get(7), None);
///
/// map.insert(7, 12);
/// assert_eq!(map.get(7), Some(12));
/// assert_eq!(map.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    // Sparse: sized by what is mapped, not by the largest source number.
    entries: BTreeMap<u32, u32>,
}

impl IdentityMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Destination number recorded for `source`, if any.
    pub fn get(&self, source: u32) -> Option<u32> {
        self.entries.get(&source).copied()
    }

    /// Whether `source` has already been assigned a destination object.
    pub fn contains(&self, source: u32) -> bool {
        self.entries.contains_key(&source)
    }

    /// Record `source -> dest`.
    ///
    /// An existing entry is never replaced; the call then returns the
    /// destination number already on record.
    pub fn insert(&mut self, source: u32, dest: u32) -> u32 {
        debug_assert!(source != 0 && dest != 0, "object number 0 is never valid");
        *self.entries.entry(source).or_insert(dest)
    }

    /// Number of mapped source objects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been mapped yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(source, dest)` pairs in ascending source order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.entries.iter().map(|(&source, &dest)| (source, dest))
    }
}
