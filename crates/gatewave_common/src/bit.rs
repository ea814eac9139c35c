//! Three-valued logic bits with truth-table-based operators.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

/// A single three-valued logic value.
///
/// `Undef` is an ordinary value, not an error: it is the initial state of
/// every wire and compares equal to itself, so "no change" detection during
/// simulation treats an undefined signal staying undefined as unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Bit {
    /// Logic low (0).
    Low = 0,
    /// Logic high (1).
    High = 1,
    /// Unknown or not yet settled.
    #[default]
    Undef = 2,
}

impl Bit {
    /// Converts a character to a [`Bit`].
    ///
    /// Accepts '0', '1', and 'x'/'X'.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Bit::Low),
            '1' => Some(Bit::High),
            'x' | 'X' => Some(Bit::Undef),
            _ => None,
        }
    }

    /// Returns `true` for `Low` and `High`.
    pub fn is_defined(self) -> bool {
        self != Bit::Undef
    }

    /// Returns `Some(true)`/`Some(false)` for defined bits, `None` for `Undef`.
    pub fn to_bool(self) -> Option<bool> {
        match self {
            Bit::Low => Some(false),
            Bit::High => Some(true),
            Bit::Undef => None,
        }
    }

    /// Draws a uniformly random defined bit.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Bit::from(rng.gen::<bool>())
    }

    /// Combines `other` into `self` with the given operator, in place.
    ///
    /// Returns `self` so reductions can be chained.
    pub fn apply(&mut self, op: LogicOp, other: Bit) -> &mut Self {
        *self = op.eval(*self, other);
        self
    }

    /// Inverts `self` in place.
    pub fn invert(&mut self) -> &mut Self {
        *self = !*self;
        self
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value {
            Bit::High
        } else {
            Bit::Low
        }
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bit::Low => write!(f, "0"),
            Bit::High => write!(f, "1"),
            Bit::Undef => write!(f, "x"),
        }
    }
}

/// AND truth table:
/// ```text
///     0  1  x
/// 0 | 0  0  0
/// 1 | 0  1  x
/// x | 0  x  x
/// ```
impl BitAnd for Bit {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        use Bit::*;
        match (self, rhs) {
            (Low, _) | (_, Low) => Low,
            (High, High) => High,
            _ => Undef,
        }
    }
}

/// OR truth table:
/// ```text
///     0  1  x
/// 0 | 0  1  x
/// 1 | 1  1  1
/// x | x  1  x
/// ```
impl BitOr for Bit {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        use Bit::*;
        match (self, rhs) {
            (High, _) | (_, High) => High,
            (Low, Low) => Low,
            _ => Undef,
        }
    }
}

/// XOR truth table:
/// ```text
///     0  1  x
/// 0 | 0  1  x
/// 1 | 1  0  x
/// x | x  x  x
/// ```
impl BitXor for Bit {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        use Bit::*;
        match (self, rhs) {
            (Low, Low) | (High, High) => Low,
            (Low, High) | (High, Low) => High,
            _ => Undef,
        }
    }
}

/// NOT: `!0 = 1`, `!1 = 0`, `!x = x`
impl Not for Bit {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Bit::Low => Bit::High,
            Bit::High => Bit::Low,
            Bit::Undef => Bit::Undef,
        }
    }
}

impl BitAndAssign for Bit {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs;
    }
}

impl BitOrAssign for Bit {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

impl BitXorAssign for Bit {
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}

/// The two-input boolean operators and their negations.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum LogicOp {
    /// Conjunction.
    And,
    /// Negated conjunction.
    Nand,
    /// Disjunction.
    Or,
    /// Negated disjunction.
    Nor,
    /// Exclusive or.
    Xor,
    /// Negated exclusive or.
    Xnor,
}

impl LogicOp {
    /// All six operators, in declaration order.
    pub const ALL: [LogicOp; 6] = [
        LogicOp::And,
        LogicOp::Nand,
        LogicOp::Or,
        LogicOp::Nor,
        LogicOp::Xor,
        LogicOp::Xnor,
    ];

    /// Returns the operator name in upper case, e.g. `"NAND"`.
    pub fn name(self) -> &'static str {
        match self {
            LogicOp::And => "AND",
            LogicOp::Nand => "NAND",
            LogicOp::Or => "OR",
            LogicOp::Nor => "NOR",
            LogicOp::Xor => "XOR",
            LogicOp::Xnor => "XNOR",
        }
    }

    /// Returns `true` for NAND, NOR and XNOR.
    pub fn is_inverting(self) -> bool {
        matches!(self, LogicOp::Nand | LogicOp::Nor | LogicOp::Xnor)
    }

    /// Returns the non-inverting operator this one is built on.
    pub fn base(self) -> LogicOp {
        match self {
            LogicOp::And | LogicOp::Nand => LogicOp::And,
            LogicOp::Or | LogicOp::Nor => LogicOp::Or,
            LogicOp::Xor | LogicOp::Xnor => LogicOp::Xor,
        }
    }

    /// Evaluates the two-input operator.
    pub fn eval(self, a: Bit, b: Bit) -> Bit {
        let v = match self.base() {
            LogicOp::And => a & b,
            LogicOp::Or => a | b,
            _ => a ^ b,
        };
        if self.is_inverting() {
            !v
        } else {
            v
        }
    }

    /// Evaluates the N-input form of the operator.
    ///
    /// The bits are folded with the base operator and the result is inverted
    /// once for the negated operators, so `Nand.reduce([a, b, c])` is
    /// `!(a & b & c)`. An empty input reduces to `Undef`.
    pub fn reduce<I: IntoIterator<Item = Bit>>(self, bits: I) -> Bit {
        let base = self.base();
        let mut bits = bits.into_iter();
        let Some(mut acc) = bits.next() else {
            return Bit::Undef;
        };
        for b in bits {
            acc.apply(base, b);
        }
        if self.is_inverting() {
            acc.invert();
        }
        acc
    }
}

impl fmt::Display for LogicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
