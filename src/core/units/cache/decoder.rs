//! Address Decoder.
//!
//! Splits an address into its block number (the tag stored in a line) and
//! the index of the set that block maps to. Both are pure shift/mask
//! operations derived from a validated [`Geometry`].
//!
//! ```text
//! | block tag                         | offset |
//! |             ...  | set index      | offset |
//! ```
//!
//! The stored tag keeps the set index bits, so a victim's full line address
//! is recovered with a single shift.

use super::geometry::Geometry;

/// Mask/shift decomposition for one cache level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressDecoder {
    index_shift: u32,
    set_mask: u64,
    offset_mask: u64,
}

impl AddressDecoder {
    pub fn new(geometry: &Geometry) -> Self {
        Self {
            index_shift: geometry.line_bytes().trailing_zeros(),
            set_mask: geometry.sets() as u64 - 1,
            offset_mask: geometry.line_bytes() as u64 - 1,
        }
    }

    /// Number of bits an address is shifted right to get its block number.
    pub fn index_shift(&self) -> u32 {
        self.index_shift
    }

    pub fn set_index(&self, addr: u64) -> usize {
        ((addr >> self.index_shift) & self.set_mask) as usize
    }

    pub fn block_tag(&self, addr: u64) -> u64 {
        addr >> self.index_shift
    }

    /// Reconstructs the line-aligned address of a stored tag.
    pub fn block_addr(&self, tag: u64) -> u64 {
        tag << self.index_shift
    }

    pub fn line_base(&self, addr: u64) -> u64 {
        addr & !self.offset_mask
    }

    pub fn line_offset(&self, addr: u64) -> u64 {
        addr & self.offset_mask
    }

    /// Returns the line-aligned addresses covering `[addr, addr + bytes)`.
    ///
    /// An empty range yields nothing, while a range that merely touches a
    /// line includes it. Ranges running past the top of the address space
    /// are clamped to the last line.
    pub fn lines_in_range(&self, addr: u64, bytes: usize) -> impl Iterator<Item = u64> {
        let line = self.offset_mask + 1;
        let start = self.line_base(addr);
        let last = self.line_base(addr.saturating_add((bytes as u64).saturating_sub(1)));
        let count = if bytes == 0 {
            0
        } else {
            (last - start) / line + 1
        };
        (0..count).map(move |i| start + i * line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder(sets: usize, ways: usize, line: usize) -> AddressDecoder {
        AddressDecoder::new(&Geometry::new(sets, ways, line).unwrap())
    }

    #[test]
    fn test_split() {
        let d = decoder(64, 2, 32);
        assert_eq!(d.index_shift(), 5);
        assert_eq!(d.block_tag(0x1234), 0x1234 >> 5);
        assert_eq!(d.set_index(0x1234), (0x1234 >> 5) & 63);
        assert_eq!(d.line_offset(0x1234), 0x14);
        assert_eq!(d.line_base(0x1234), 0x1220);
    }

    #[test]
    fn test_single_set_index_is_zero() {
        let d = decoder(1, 8, 64);
        for addr in [0u64, 0x40, 0xdead_beef, u64::MAX] {
            assert_eq!(d.set_index(addr), 0);
        }
    }

    #[test]
    fn test_lines_in_range() {
        let d = decoder(4, 1, 16);
        let lines: Vec<u64> = d.lines_in_range(0x18, 0x10).collect();
        assert_eq!(lines, vec![0x10, 0x20]);

        let lines: Vec<u64> = d.lines_in_range(0x20, 16).collect();
        assert_eq!(lines, vec![0x20]);

        assert_eq!(d.lines_in_range(0x20, 0).count(), 0);
        assert_eq!(d.lines_in_range(0x27, 0).count(), 0);
    }

    #[test]
    fn test_lines_in_range_at_top_of_address_space() {
        let d = decoder(4, 1, 16);
        let top = u64::MAX & !0xf;

        let lines: Vec<u64> = d.lines_in_range(u64::MAX - 10, 8).collect();
        assert_eq!(lines, vec![top]);

        let lines: Vec<u64> = d.lines_in_range(u64::MAX - 20, 100).collect();
        assert_eq!(lines, vec![top - 16, top]);
    }
}
