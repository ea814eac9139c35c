//! Fixed-width vectors of three-valued bits.

use crate::bit::{Bit, LogicOp};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

/// An ordered, fixed-width sequence of [`Bit`]s.
///
/// Index 0 is the least significant bit. The width is fixed at construction;
/// binary operations between vectors of different widths are programming
/// errors and panic.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitVector {
    bits: Vec<Bit>,
}

impl BitVector {
    /// Creates a vector of the given width with every bit `Undef`.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero.
    pub fn new(width: usize) -> Self {
        Self::filled(Bit::Undef, width)
    }

    /// Creates a vector of the given width with every bit set to `bit`.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero.
    pub fn filled(bit: Bit, width: usize) -> Self {
        assert!(width > 0, "BitVector width must be positive");
        Self {
            bits: vec![bit; width],
        }
    }

    /// Creates a single-bit vector.
    pub fn from_bit(bit: Bit) -> Self {
        Self { bits: vec![bit] }
    }

    /// Creates a vector holding the low `width` bits of `value`.
    ///
    /// Bits above position 63 are `Low`.
    pub fn from_u64(value: u64, width: usize) -> Self {
        assert!(width > 0, "BitVector width must be positive");
        let bits = (0..width)
            .map(|i| Bit::from(i < 64 && (value >> i) & 1 != 0))
            .collect();
        Self { bits }
    }

    /// Parses a string like `"10x1"` into a vector.
    ///
    /// The leftmost character is the most significant bit (highest index).
    /// Returns `None` for an empty string or any character other than
    /// `0`, `1`, `x` or `X`.
    pub fn from_binary_str(s: &str) -> Option<Self> {
        if s.is_empty() {
            return None;
        }
        let bits = s
            .chars()
            .rev()
            .map(Bit::from_char)
            .collect::<Option<Vec<_>>>()?;
        Some(Self { bits })
    }

    /// Draws a vector of uniformly random defined bits.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, width: usize) -> Self {
        assert!(width > 0, "BitVector width must be positive");
        Self {
            bits: (0..width).map(|_| Bit::random(rng)).collect(),
        }
    }

    /// Returns the number of bits.
    pub fn width(&self) -> usize {
        self.bits.len()
    }

    /// Gets the bit at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: usize) -> Bit {
        assert!(
            index < self.width(),
            "index {index} out of bounds for width {}",
            self.width()
        );
        self.bits[index]
    }

    /// Sets the bit at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: usize, bit: Bit) {
        assert!(
            index < self.width(),
            "index {index} out of bounds for width {}",
            self.width()
        );
        self.bits[index] = bit;
    }

    /// Iterates over the bits from least to most significant.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Bit> + '_ {
        self.bits.iter().copied()
    }

    /// Returns `true` if no bit is `Undef`.
    pub fn is_defined(&self) -> bool {
        self.bits.iter().all(|b| b.is_defined())
    }

    /// Converts to a `u64` if every bit is defined and the width is at most 64.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width() > 64 {
            return None;
        }
        let mut result = 0u64;
        for (i, bit) in self.bits.iter().enumerate() {
            match bit {
                Bit::Low => {}
                Bit::High => result |= 1 << i,
                Bit::Undef => return None,
            }
        }
        Some(result)
    }

    /// Combines `other` into `self` element-wise with the given operator.
    ///
    /// # Panics
    ///
    /// Panics if the widths differ.
    pub fn apply(&mut self, op: LogicOp, other: &BitVector) -> &mut Self {
        assert_eq!(
            self.width(),
            other.width(),
            "BitVector width mismatch in {op}"
        );
        for (a, b) in self.bits.iter_mut().zip(&other.bits) {
            a.apply(op, *b);
        }
        self
    }

    /// Inverts every bit in place.
    pub fn invert(&mut self) -> &mut Self {
        for b in &mut self.bits {
            b.invert();
        }
        self
    }

    /// Reduces all bits with the N-input form of `op`.
    pub fn reduce(&self, op: LogicOp) -> Bit {
        op.reduce(self.iter())
    }

    fn zip_with(&self, rhs: &BitVector, op: LogicOp) -> BitVector {
        let mut result = self.clone();
        result.apply(op, rhs);
        result
    }
}

impl From<Bit> for BitVector {
    fn from(bit: Bit) -> Self {
        Self::from_bit(bit)
    }
}

impl FromIterator<Bit> for BitVector {
    /// Collects bits from least to most significant.
    ///
    /// # Panics
    ///
    /// Panics if the iterator is empty.
    fn from_iter<I: IntoIterator<Item = Bit>>(iter: I) -> Self {
        let bits: Vec<Bit> = iter.into_iter().collect();
        assert!(!bits.is_empty(), "BitVector width must be positive");
        Self { bits }
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits.iter().rev() {
            write!(f, "{bit}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVector({self})")
    }
}

impl BitAnd for &BitVector {
    type Output = BitVector;

    fn bitand(self, rhs: Self) -> BitVector {
        self.zip_with(rhs, LogicOp::And)
    }
}

impl BitOr for &BitVector {
    type Output = BitVector;

    fn bitor(self, rhs: Self) -> BitVector {
        self.zip_with(rhs, LogicOp::Or)
    }
}

impl BitXor for &BitVector {
    type Output = BitVector;

    fn bitxor(self, rhs: Self) -> BitVector {
        self.zip_with(rhs, LogicOp::Xor)
    }
}

impl Not for &BitVector {
    type Output = BitVector;

    fn not(self) -> BitVector {
        let mut result = self.clone();
        result.invert();
        result
    }
}

impl BitAndAssign<&BitVector> for BitVector {
    fn bitand_assign(&mut self, rhs: &BitVector) {
        self.apply(LogicOp::And, rhs);
    }
}

impl BitOrAssign<&BitVector> for BitVector {
    fn bitor_assign(&mut self, rhs: &BitVector) {
        self.apply(LogicOp::Or, rhs);
    }
}

impl BitXorAssign<&BitVector> for BitVector {
    fn bitxor_assign(&mut self, rhs: &BitVector) {
        self.apply(LogicOp::Xor, rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn new_is_undefined() {
        let v = BitVector::new(8);
        assert_eq!(v.width(), 8);
        assert!(v.iter().all(|b| b == Bit::Undef));
        assert!(!v.is_defined());
        assert_eq!(v.to_u64(), None);
    }

    #[test]
    #[should_panic(expected = "width must be positive")]
    fn zero_width_panics() {
        BitVector::new(0);
    }

    #[test]
    fn from_u64_lsb_first() {
        let v = BitVector::from_u64(0b0110_0110, 8);
        assert_eq!(v.get(0), Bit::Low);
        assert_eq!(v.get(1), Bit::High);
        assert_eq!(v.get(7), Bit::Low);
        assert_eq!(v.to_u64(), Some(102));
        assert_eq!(format!("{v}"), "01100110");
    }

    #[test]
    fn from_u64_truncates() {
        let v = BitVector::from_u64(0x1ff, 8);
        assert_eq!(v.to_u64(), Some(0xff));
    }

    #[test]
    fn from_binary_str() {
        let v = BitVector::from_binary_str("10x1").unwrap();
        assert_eq!(v.width(), 4);
        assert_eq!(v.get(3), Bit::High); // MSB
        assert_eq!(v.get(2), Bit::Low);
        assert_eq!(v.get(1), Bit::Undef);
        assert_eq!(v.get(0), Bit::High); // LSB
    }

    #[test]
    fn from_binary_str_invalid() {
        assert!(BitVector::from_binary_str("10z1").is_none());
        assert!(BitVector::from_binary_str("").is_none());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn get_out_of_range_panics() {
        BitVector::new(4).get(4);
    }

    #[test]
    fn bitwise_ops() {
        let a = BitVector::from_binary_str("1100x").unwrap();
        let b = BitVector::from_binary_str("10100").unwrap();
        assert_eq!((&a & &b).to_string(), "10000");
        assert_eq!((&a | &b).to_string(), "1110x");
        assert_eq!((&a ^ &b).to_string(), "0110x");
        assert_eq!((!&a).to_string(), "0011x");
    }

    #[test]
    fn in_place_ops() {
        let mut a = BitVector::from_binary_str("1100").unwrap();
        let b = BitVector::from_binary_str("1010").unwrap();
        a.apply(LogicOp::Nand, &b);
        assert_eq!(a.to_string(), "0111");
        a ^= &b;
        assert_eq!(a.to_string(), "1101");
        a &= &b;
        assert_eq!(a.to_string(), "1000");
        a |= &b;
        assert_eq!(a.to_string(), "1010");
    }

    #[test]
    #[should_panic(expected = "width mismatch")]
    fn mismatched_widths_panic() {
        let a = BitVector::new(3);
        let b = BitVector::new(4);
        let _ = &a & &b;
    }

    #[test]
    fn reduce() {
        let v = BitVector::from_binary_str("111").unwrap();
        assert_eq!(v.reduce(LogicOp::And), Bit::High);
        assert_eq!(v.reduce(LogicOp::Xor), Bit::High);
        assert_eq!(v.reduce(LogicOp::Nor), Bit::Low);
    }

    #[test]
    fn random_is_defined_and_seeded() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = BitVector::random(&mut rng, 16);
        let mut rng = StdRng::seed_from_u64(7);
        let b = BitVector::random(&mut rng, 16);
        assert!(a.is_defined());
        assert_eq!(a, b);
    }

    #[test]
    fn collect_from_bits() {
        let v: BitVector = [Bit::High, Bit::Low, Bit::Undef].into_iter().collect();
        assert_eq!(v.to_string(), "x01");
    }

    #[test]
    fn serde_roundtrip() {
        let v = BitVector::from_binary_str("10x1010").unwrap();
        let json = serde_json::to_string(&v).unwrap();
        let back: BitVector = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
