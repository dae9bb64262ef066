use crate::config::CacheKind;

/// Bit-level shape of a cache, derived once per run and immutable afterwards
///
/// `index_bits` is the set-selector width for the set-associative organizations and 0 for a
/// fully-associative cache, so `offset_bits + index_bits + tag_bits == address_bits` holds
/// for every organization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeometry {
    pub address_bits: u32,
    pub offset_bits: u32,
    pub index_bits: u32,
    pub tag_bits: u32,
    pub total_blocks: u64,
}

impl CacheGeometry {
    /// Derives the bit widths from the exercise parameters
    ///
    /// # Arguments
    ///
    /// * `memory_mb`: main memory size in MiB
    /// * `block_size`: block size in bytes
    /// * `blocks`: number of blocks the cache holds
    /// * `kind`: the cache organization, which decides how many of the block-count bits
    ///   select a set
    ///
    /// returns: CacheGeometry
    pub fn resolve(memory_mb: u64, block_size: u64, blocks: u64, kind: CacheKind) -> Self {
        let address_bits = log2(memory_mb) + 20;
        let offset_bits = log2(block_size);
        let index_bits = match kind {
            CacheKind::Direct => log2(blocks),
            CacheKind::Full => 0,
            CacheKind::TwoWay => log2(blocks).saturating_sub(1),
            CacheKind::FourWay => log2(blocks).saturating_sub(2),
        };
        Self {
            address_bits,
            offset_bits,
            index_bits,
            tag_bits: address_bits.saturating_sub(index_bits + offset_bits),
            total_blocks: blocks,
        }
    }

    /// Number of addressable lines (direct-mapped) or sets (set-associative)
    pub fn index_space(&self) -> usize {
        1usize << self.index_bits
    }
}

// Powers of two are assumed, not validated. A non-power-of-two size silently truncates to
// the largest power of two dividing it, which is an accepted caller error.
fn log2(value: u64) -> u32 {
    value.trailing_zeros()
}

/// A raw address split into its per-organization fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decomposed {
    pub tag: u64,
    pub index: u64,
    pub offset: u64,
}

/// Splits an address into tag, index (or set), and offset
///
/// Pure function of the address and the geometry; with `index_bits == 0` the index is always
/// 0 and the tag covers everything above the offset
pub fn decompose(address: u64, geometry: &CacheGeometry) -> Decomposed {
    Decomposed {
        offset: address & mask(geometry.offset_bits),
        index: (address >> geometry.offset_bits) & mask(geometry.index_bits),
        tag: address >> (geometry.offset_bits + geometry.index_bits),
    }
}

fn mask(bits: u32) -> u64 {
    (1u64 << bits) - 1
}

#[cfg(test)]
mod tests {
    use super::{decompose, CacheGeometry};
    use crate::config::CacheKind;

    #[test]
    fn resolves_widths_per_organization() {
        let direct = CacheGeometry::resolve(64, 64, 256, CacheKind::Direct);
        assert_eq!(
            (direct.address_bits, direct.offset_bits, direct.index_bits, direct.tag_bits),
            (26, 6, 8, 12)
        );
        let full = CacheGeometry::resolve(64, 64, 256, CacheKind::Full);
        assert_eq!((full.index_bits, full.tag_bits), (0, 20));
        let two_way = CacheGeometry::resolve(64, 64, 256, CacheKind::TwoWay);
        assert_eq!((two_way.index_bits, two_way.tag_bits), (7, 13));
        let four_way = CacheGeometry::resolve(64, 64, 256, CacheKind::FourWay);
        assert_eq!((four_way.index_bits, four_way.tag_bits), (6, 14));
    }

    #[test]
    fn decomposes_against_direct_geometry() {
        let geometry = CacheGeometry::resolve(64, 64, 256, CacheKind::Direct);
        let parts = decompose(1031, &geometry);
        assert_eq!((parts.tag, parts.index, parts.offset), (0, 16, 7));
        let parts = decompose(32769, &geometry);
        assert_eq!((parts.tag, parts.index, parts.offset), (2, 0, 1));
    }

    #[test]
    fn fully_associative_index_is_always_zero() {
        let geometry = CacheGeometry::resolve(64, 64, 256, CacheKind::Full);
        let parts = decompose(4352, &geometry);
        assert_eq!((parts.tag, parts.index, parts.offset), (68, 0, 0));
    }
}
