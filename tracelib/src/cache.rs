use log::debug;

use crate::config::CacheKind;
use crate::geometry::CacheGeometry;

/// The outcome of driving one access through a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub hit: bool,
    pub evicted: bool,
    /// Line (or way) holding the tag once the access completes
    pub slot: usize,
}

/// Where `place` put a tag, and whether a resident line was evicted for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub slot: usize,
    pub evicted: bool,
}

impl Access {
    fn hit(slot: usize) -> Self {
        Self {
            hit: true,
            evicted: false,
            slot,
        }
    }

    fn miss(placement: Placement) -> Self {
        Self {
            hit: false,
            evicted: placement.evicted,
            slot: placement.slot,
        }
    }
}

/// Direct-mapped occupancy: one candidate line per index
///
/// A conflicting tag always overwrites; there is no choice to make with a single candidate
#[derive(Debug, Clone)]
pub struct DirectMapped {
    lines: Vec<Option<u64>>,
}

impl DirectMapped {
    pub fn new(lines: usize) -> Self {
        Self {
            lines: vec![None; lines],
        }
    }

    pub fn capacity(&self) -> usize {
        self.lines.len()
    }

    /// Extends the store with empty lines through `index`. Capacity never shrinks
    pub fn grow(&mut self, index: usize) {
        if index >= self.lines.len() {
            debug!("extending direct-mapped store to {} lines", index + 1);
            self.lines.resize(index + 1, None);
        }
    }

    /// Reports the line holding `tag`, without touching the store
    pub fn lookup(&self, index: usize, tag: u64) -> Option<usize> {
        (self.lines[index] == Some(tag)).then_some(index)
    }

    /// Stores `tag`, evicting whatever the line held. Only called on a miss
    pub fn place(&mut self, index: usize, tag: u64) -> Placement {
        let evicted = self.lines[index].is_some();
        self.lines[index] = Some(tag);
        Placement {
            slot: index,
            evicted,
        }
    }

    pub fn access(&mut self, index: usize, tag: u64) -> Access {
        match self.lookup(index, tag) {
            Some(slot) => Access::hit(slot),
            None => Access::miss(self.place(index, tag)),
        }
    }

    pub fn line(&self, index: usize) -> Option<u64> {
        self.lines[index]
    }

    pub fn empty_lines(&self) -> usize {
        self.lines.iter().filter(|line| line.is_none()).count()
    }
}

/// Fully-associative occupancy: a tag may live in any line of a fixed-capacity store
#[derive(Debug, Clone)]
pub struct FullyAssociative {
    lines: Vec<Option<u64>>,
}

impl FullyAssociative {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.lines.len()
    }

    /// Searches the whole store for `tag`, without touching it
    pub fn lookup(&self, tag: u64) -> Option<usize> {
        self.lines.iter().position(|line| *line == Some(tag))
    }

    /// Stores `tag` in the first empty line, or evicts line 0 when none is empty
    ///
    /// The first slot stands in for the least recently used line; no recency counter is
    /// kept, so the worked tables always evict line 0 of a full store
    pub fn place(&mut self, tag: u64) -> Placement {
        match self.lines.iter().position(Option::is_none) {
            Some(free) => {
                self.lines[free] = Some(tag);
                Placement {
                    slot: free,
                    evicted: false,
                }
            }
            None => {
                self.lines[0] = Some(tag);
                Placement {
                    slot: 0,
                    evicted: true,
                }
            }
        }
    }

    pub fn access(&mut self, tag: u64) -> Access {
        match self.lookup(tag) {
            Some(slot) => Access::hit(slot),
            None => Access::miss(self.place(tag)),
        }
    }

    pub fn line(&self, slot: usize) -> Option<u64> {
        self.lines[slot]
    }

    pub fn empty_lines(&self) -> usize {
        self.lines.iter().filter(|line| line.is_none()).count()
    }
}

/// Set-associative occupancy: each set holds two candidate lines
///
/// Both the 2-way and the 4-way tables track two ways per set; the organizations differ only
/// in how many address bits select the set. With both ways resident the way holding the
/// numerically smaller tag is evicted, standing in for the least recently used way
#[derive(Debug, Clone)]
pub struct SetAssociative {
    sets: Vec<[Option<u64>; 2]>,
}

impl SetAssociative {
    pub fn new(sets: usize) -> Self {
        Self {
            sets: vec![[None; 2]; sets],
        }
    }

    pub fn capacity(&self) -> usize {
        self.sets.len()
    }

    /// Extends the store with empty sets through `set`. Capacity never shrinks
    pub fn grow(&mut self, set: usize) {
        if set >= self.sets.len() {
            debug!("extending set-associative store to {} sets", set + 1);
            self.sets.resize(set + 1, [None; 2]);
        }
    }

    /// Reports the way of `set` holding `tag`, without touching the store
    pub fn lookup(&self, set: usize, tag: u64) -> Option<usize> {
        self.sets[set].iter().position(|way| *way == Some(tag))
    }

    /// Stores `tag` in an empty way of `set`, or evicts the smaller-tagged way when both are
    /// resident. Only called on a miss
    pub fn place(&mut self, set: usize, tag: u64) -> Placement {
        let ways = &mut self.sets[set];
        match (ways[0], ways[1]) {
            (None, _) => {
                ways[0] = Some(tag);
                Placement {
                    slot: 0,
                    evicted: false,
                }
            }
            (_, None) => {
                ways[1] = Some(tag);
                Placement {
                    slot: 1,
                    evicted: false,
                }
            }
            (Some(first), Some(second)) => {
                // Strictly smaller picks way 0; ties go to way 1
                let victim = if first < second { 0 } else { 1 };
                ways[victim] = Some(tag);
                Placement {
                    slot: victim,
                    evicted: true,
                }
            }
        }
    }

    pub fn access(&mut self, set: usize, tag: u64) -> Access {
        match self.lookup(set, tag) {
            Some(slot) => Access::hit(slot),
            None => Access::miss(self.place(set, tag)),
        }
    }

    /// Both resident tags of `set`, in way order
    pub fn resident(&self, set: usize) -> [Option<u64>; 2] {
        self.sets[set]
    }

    pub fn empty_lines(&self) -> usize {
        self.sets
            .iter()
            .flatten()
            .filter(|way| way.is_none())
            .count()
    }
}

/// The store for a configured run
///
/// The organizations differ in indexing shape (flat lines, one searchable pool, sets of
/// two), so each keeps its own type and the simulator branches on the variant instead of
/// dispatching through a common trait
#[derive(Debug, Clone)]
pub enum Store {
    DirectMapped(DirectMapped),
    FullyAssociative(FullyAssociative),
    SetAssociative(SetAssociative),
}

impl Store {
    /// Allocates an empty store sized for the geometry
    pub fn with_capacity(kind: CacheKind, geometry: &CacheGeometry) -> Self {
        match kind {
            CacheKind::Direct => DirectMapped::new(geometry.total_blocks as usize).into(),
            CacheKind::Full => FullyAssociative::new(geometry.total_blocks as usize).into(),
            CacheKind::TwoWay | CacheKind::FourWay => {
                SetAssociative::new(geometry.index_space()).into()
            }
        }
    }

    /// Number of unoccupied cache lines. Useful for debugging a run
    pub fn empty_lines(&self) -> usize {
        match self {
            Store::DirectMapped(lines) => lines.empty_lines(),
            Store::FullyAssociative(lines) => lines.empty_lines(),
            Store::SetAssociative(sets) => sets.empty_lines(),
        }
    }
}

impl From<DirectMapped> for Store {
    fn from(value: DirectMapped) -> Self {
        Self::DirectMapped(value)
    }
}

impl From<FullyAssociative> for Store {
    fn from(value: FullyAssociative) -> Self {
        Self::FullyAssociative(value)
    }
}

impl From<SetAssociative> for Store {
    fn from(value: SetAssociative) -> Self {
        Self::SetAssociative(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{DirectMapped, FullyAssociative, SetAssociative};

    #[test]
    fn direct_mapped_overwrites_conflicting_tag() {
        let mut lines = DirectMapped::new(4);
        let first = lines.access(0, 0);
        assert!(!first.hit && !first.evicted);
        let conflict = lines.access(0, 2);
        assert!(!conflict.hit && conflict.evicted);
        assert_eq!(lines.line(0), Some(2));
    }

    #[test]
    fn fully_associative_fills_before_evicting_line_zero() {
        let mut lines = FullyAssociative::new(2);
        assert!(!lines.access(5).hit);
        assert!(!lines.access(9).hit);
        let repeat = lines.access(5);
        assert!(repeat.hit && repeat.slot == 0);
        let evicting = lines.access(13);
        assert!(!evicting.hit && evicting.evicted && evicting.slot == 0);
        assert_eq!(lines.line(0), Some(13));
        assert_eq!(lines.line(1), Some(9));
    }

    #[test]
    fn set_associative_uses_free_way_before_replacing() {
        let mut sets = SetAssociative::new(8);
        let first = sets.access(3, 7);
        assert!(!first.hit && !first.evicted && first.slot == 0);
        let second = sets.access(3, 9);
        assert!(!second.hit && !second.evicted && second.slot == 1);
        assert_eq!(sets.resident(3), [Some(7), Some(9)]);
    }

    #[test]
    fn set_associative_evicts_smaller_resident_tag() {
        let mut sets = SetAssociative::new(8);
        sets.access(0, 7);
        sets.access(0, 9);
        let replaced = sets.access(0, 11);
        assert!(!replaced.hit && replaced.evicted && replaced.slot == 0);
        assert_eq!(sets.resident(0), [Some(11), Some(9)]);
        // 11 and 9 both resident; 9 is smaller so way 1 goes next
        let replaced = sets.access(0, 3);
        assert!(replaced.evicted && replaced.slot == 1);
        assert_eq!(sets.resident(0), [Some(11), Some(3)]);
    }

    #[test]
    fn lookup_on_hit_leaves_lines_untouched() {
        let mut sets = SetAssociative::new(4);
        sets.access(1, 5);
        sets.access(1, 6);
        let before = sets.resident(1);
        assert!(sets.access(1, 5).hit);
        assert!(sets.access(1, 6).hit);
        assert_eq!(sets.resident(1), before);
    }

    #[test]
    fn growth_extends_through_the_requested_index() {
        let mut lines = DirectMapped::new(256);
        lines.grow(300);
        assert_eq!(lines.capacity(), 301);
        assert_eq!(lines.line(300), None);
        // Growing backwards is a no-op
        lines.grow(10);
        assert_eq!(lines.capacity(), 301);
    }
}
