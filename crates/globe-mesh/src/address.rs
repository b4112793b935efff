//! Unique triangle identifier within a globe mesh.

use std::fmt;

/// Uniquely identifies a triangle of the mesh, materialized or derived.
///
/// - `root`: index of the base-polyhedron triangle it descends from.
/// - `depth`: number of subdivisions below the root (0 = the root itself).
/// - `path`: child index taken at each level, 2 bits per level, level 1 in
///   the lowest bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriangleAddress {
    root: u16,
    depth: u8,
    path: u64,
}

impl TriangleAddress {
    /// Deepest representable level (2 bits per level in a `u64`).
    pub const MAX_DEPTH: u8 = 31;

    /// Number of children produced by one subdivision.
    pub const FAN_OUT: usize = 4;

    /// Address of a root triangle.
    #[must_use]
    pub fn root(root: u16) -> Self {
        Self {
            root,
            depth: 0,
            path: 0,
        }
    }

    #[must_use]
    pub fn root_index(&self) -> u16 {
        self.root
    }

    #[must_use]
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Child index taken when descending into `level` (1-based).
    ///
    /// # Panics
    ///
    /// Panics if `level` is 0 or deeper than this address.
    #[must_use]
    pub fn child_index_at(&self, level: u8) -> usize {
        assert!(
            level >= 1 && level <= self.depth,
            "level {level} outside 1..={}",
            self.depth
        );
        ((self.path >> (2 * (level - 1))) & 0b11) as usize
    }

    /// Child indices from the root down to this triangle.
    pub fn path(&self) -> impl Iterator<Item = usize> + '_ {
        (1..=self.depth).map(|level| self.child_index_at(level))
    }

    /// The `index`-th child one level deeper.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 4` or the address is already at [`Self::MAX_DEPTH`].
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        assert!(index < Self::FAN_OUT, "child index {index} out of range");
        assert!(
            self.depth < Self::MAX_DEPTH,
            "cannot descend below depth {}",
            Self::MAX_DEPTH
        );
        Self {
            root: self.root,
            depth: self.depth + 1,
            path: self.path | ((index as u64) << (2 * self.depth)),
        }
    }

    /// The containing triangle one level up, or `None` for a root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.depth == 0 {
            return None;
        }
        let depth = self.depth - 1;
        let mask = (1u64 << (2 * depth)) - 1;
        Some(Self {
            root: self.root,
            depth,
            path: self.path & mask,
        })
    }

    /// True if `self` is `other` or one of its descendants.
    #[must_use]
    pub fn is_within(&self, other: &TriangleAddress) -> bool {
        if self.root != other.root || self.depth < other.depth {
            return false;
        }
        let mask = (1u64 << (2 * other.depth)) - 1;
        self.path & mask == other.path
    }
}

impl fmt::Display for TriangleAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.root)?;
        if self.depth > 0 {
            f.write_str(":")?;
            for index in self.path() {
                write!(f, "{index}")?;
            }
        }
        Ok(())
    }
}
