//! Bit-packed array of fixed-width unsigned integers.
//!
//! Backs the execution trace: each entry takes exactly `width` bits and
//! entries are packed back to back across `u64` word boundaries.

const WORD: usize = u64::BITS as usize;

/// Growable array of `width`-bit unsigned values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedArray {
    width: u32,
    len: usize,
    words: Vec<u64>,
}

impl PackedArray {
    /// Create an empty array of `width`-bit entries.
    ///
    /// # Panics
    ///
    /// Panics if `width` exceeds 64.
    #[must_use]
    pub fn new(width: u32) -> Self {
        assert!(width <= u64::BITS, "packed width {width} exceeds 64 bits");
        Self {
            width,
            len: 0,
            words: Vec::new(),
        }
    }

    /// Bits per entry.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn mask(&self) -> u64 {
        if self.width == u64::BITS {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }

    /// Append a value.
    ///
    /// # Panics
    ///
    /// Panics if `value` does not fit in `width` bits.
    pub fn push(&mut self, value: u64) {
        assert!(
            value & !self.mask() == 0,
            "value {value} does not fit in {} bits",
            self.width
        );
        let width = self.width as usize;
        let start = self.len * width;
        self.len += 1;
        let needed = (self.len * width).div_ceil(WORD);
        self.words.resize(needed, 0);
        if width == 0 {
            return;
        }
        let (word, offset) = (start / WORD, start % WORD);
        self.words[word] |= value << offset;
        let spill = offset + width;
        if spill > WORD {
            // Upper bits continue in the next word.
            self.words[word + 1] |= value >> (WORD - offset);
        }
    }

    /// Read entry `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u64> {
        if index >= self.len {
            return None;
        }
        let width = self.width as usize;
        if width == 0 {
            return Some(0);
        }
        let start = index * width;
        let (word, offset) = (start / WORD, start % WORD);
        let mut value = self.words[word] >> offset;
        if offset + width > WORD {
            value |= self.words[word + 1] << (WORD - offset);
        }
        Some(value & self.mask())
    }

    /// Iterate over all entries in order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// Drop every entry, keeping the width.
    pub fn clear(&mut self) {
        self.len = 0;
        self.words.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_straddle_words() {
        let mut array = PackedArray::new(7);
        let values: Vec<u64> = (0..40).map(|i| (i * 37) % 128).collect();
        for &v in &values {
            array.push(v);
        }
        // entry 9 spans bits 63..70
        assert_eq!(array.get(9), Some(values[9]));
        assert_eq!(array.iter().collect::<Vec<_>>(), values);
        assert_eq!(array.get(40), None);
    }

    #[test]
    fn test_zero_width_counts_entries() {
        let mut array = PackedArray::new(0);
        array.push(0);
        array.push(0);
        assert_eq!(array.len(), 2);
        assert_eq!(array.get(1), Some(0));
        assert!(array.words.is_empty());
    }

    #[test]
    fn test_full_width_values() {
        let mut array = PackedArray::new(64);
        array.push(u64::MAX);
        array.push(1);
        assert_eq!(array.get(0), Some(u64::MAX));
        assert_eq!(array.get(1), Some(1));
        array.clear();
        assert!(array.is_empty());
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn test_rejects_wide_values() {
        PackedArray::new(3).push(8);
    }
}
