//! Ordered `(minimum version → value)` dispatch tables.
//!
//! A [`VersionTable`] replaces a chain of `if version >= X … else if …`
//! conditionals. Entries are kept sorted by minimum version; selection
//! returns the value of the highest minimum not above the detected
//! version, or the floor value when no minimum matches.

// ============================================================================
// Imports
// ============================================================================

use super::triple::Version;

// ============================================================================
// VersionTable
// ============================================================================

/// Version-keyed dispatch table.
///
/// # Example
///
/// ```
/// use pusher_compat::version::{Version, VersionTable};
///
/// let table = VersionTable::new("legacy")
///     .with_entry(Version::new(1, 4, 0), "mid")
///     .with_entry(Version::new(1, 5, 0), "modern");
///
/// assert_eq!(*table.select(Version::new(1, 4, 9)), "mid");
/// assert_eq!(*table.select(Version::new(0, 9, 0)), "legacy");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTable<T> {
    /// Value used below every entry's minimum.
    floor: T,
    /// Entries sorted by ascending minimum version.
    entries: Vec<(Version, T)>,
}

impl<T> VersionTable<T> {
    /// Creates a table holding only a floor value.
    #[inline]
    #[must_use]
    pub fn new(floor: T) -> Self {
        Self {
            floor,
            entries: Vec::new(),
        }
    }

    /// Adds an entry selected for versions `>= minimum`.
    ///
    /// Entries may be added in any order. A later entry with the same
    /// minimum replaces the earlier one.
    #[must_use]
    pub fn with_entry(mut self, minimum: Version, value: T) -> Self {
        match self.entries.binary_search_by(|(v, _)| v.cmp(&minimum)) {
            Ok(index) => self.entries[index].1 = value,
            Err(index) => self.entries.insert(index, (minimum, value)),
        }
        self
    }

    /// Selects the value for `version`.
    #[must_use]
    pub fn select(&self, version: Version) -> &T {
        self.entries
            .iter()
            .rev()
            .find(|(minimum, _)| version.at_least(*minimum))
            .map_or(&self.floor, |(_, value)| value)
    }

    /// Returns the minimum version of every entry, ascending.
    pub fn thresholds(&self) -> impl Iterator<Item = Version> + '_ {
        self.entries.iter().map(|(minimum, _)| *minimum)
    }

    /// Returns the number of entries, floor excluded.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table holds only a floor value.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> VersionTable<u8> {
        VersionTable::new(0)
            .with_entry(Version::new(2, 0, 0), 2)
            .with_entry(Version::new(1, 0, 0), 1)
            .with_entry(Version::new(3, 1, 0), 3)
    }

    #[test]
    fn test_floor_below_all_entries() {
        assert_eq!(*table().select(Version::new(0, 99, 0)), 0);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let table = table();
        assert_eq!(*table.select(Version::new(1, 0, 0)), 1);
        assert_eq!(*table.select(Version::new(1, 9, 9)), 1);
        assert_eq!(*table.select(Version::new(2, 0, 0)), 2);
        assert_eq!(*table.select(Version::new(3, 0, 9)), 2);
        assert_eq!(*table.select(Version::new(3, 1, 0)), 3);
        assert_eq!(*table.select(Version::new(8, 0, 0)), 3);
    }

    #[test]
    fn test_entries_kept_sorted() {
        let thresholds: Vec<_> = table().thresholds().collect();
        assert_eq!(
            thresholds,
            vec![
                Version::new(1, 0, 0),
                Version::new(2, 0, 0),
                Version::new(3, 1, 0)
            ]
        );
    }

    #[test]
    fn test_duplicate_minimum_replaces() {
        let table = table().with_entry(Version::new(2, 0, 0), 20);
        assert_eq!(table.len(), 3);
        assert_eq!(*table.select(Version::new(2, 5, 0)), 20);
    }

    #[test]
    fn test_empty_table() {
        let table = VersionTable::new("only");
        assert!(table.is_empty());
        assert_eq!(*table.select(Version::new(9, 9, 9)), "only");
    }
}
