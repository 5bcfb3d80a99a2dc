use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PenneyError;
use crate::model::symbol::Symbol;

pub const SEQUENCE_LEN: usize = 3;
pub const SEQUENCE_COUNT: usize = 8;

/// A three-symbol pattern a player bets on.
///
/// The eight sequences are totally ordered by their binary value, and that
/// order is the row/column index used by every matrix in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sequence([Symbol; SEQUENCE_LEN]);

impl Sequence {
    pub const ALL: [Sequence; SEQUENCE_COUNT] = [
        Sequence([Symbol::Black, Symbol::Black, Symbol::Black]),
        Sequence([Symbol::Black, Symbol::Black, Symbol::Red]),
        Sequence([Symbol::Black, Symbol::Red, Symbol::Black]),
        Sequence([Symbol::Black, Symbol::Red, Symbol::Red]),
        Sequence([Symbol::Red, Symbol::Black, Symbol::Black]),
        Sequence([Symbol::Red, Symbol::Black, Symbol::Red]),
        Sequence([Symbol::Red, Symbol::Red, Symbol::Black]),
        Sequence([Symbol::Red, Symbol::Red, Symbol::Red]),
    ];

    pub const fn new(symbols: [Symbol; SEQUENCE_LEN]) -> Self {
        Self(symbols)
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        if index < SEQUENCE_COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        ((self.0[0] as usize) << 2) | ((self.0[1] as usize) << 1) | self.0[2] as usize
    }

    pub const fn symbols(self) -> [Symbol; SEQUENCE_LEN] {
        self.0
    }

    pub fn matches(self, window: &[Symbol]) -> bool {
        *window == self.0
    }

    /// Binary digit form, e.g. `"011"`.
    pub fn digits(self) -> String {
        self.0.iter().map(|symbol| symbol.digit()).collect()
    }

    pub fn from_symbols(symbols: &[Symbol]) -> Result<Self, PenneyError> {
        let array: [Symbol; SEQUENCE_LEN] = symbols.try_into().map_err(|_| {
            PenneyError::invalid(
                "sequence",
                format!(
                    "expected {SEQUENCE_LEN} symbols but found {}",
                    symbols.len()
                ),
            )
        })?;
        Ok(Self(array))
    }
}

impl FromStr for Sequence {
    type Err = PenneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbols = s
            .trim()
            .chars()
            .map(Symbol::from_char)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_symbols(&symbols)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in self.0 {
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}

impl Serialize for Sequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Sequence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// An ordered (opponent, me) pair; `first` indexes the row, `second` the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequencePair {
    pub first: Sequence,
    pub second: Sequence,
}

impl SequencePair {
    pub const fn new(first: Sequence, second: Sequence) -> Self {
        Self { first, second }
    }

    /// Both players picked the same sequence; the game is meaningless.
    pub fn is_diagonal(self) -> bool {
        self.first == self.second
    }

    pub const fn swapped(self) -> Self {
        Self {
            first: self.second,
            second: self.first,
        }
    }

    /// All 64 ordered pairs in row-major order, diagonal included.
    pub fn all() -> impl Iterator<Item = SequencePair> {
        Sequence::ALL.into_iter().flat_map(|first| {
            Sequence::ALL
                .into_iter()
                .map(move |second| SequencePair::new(first, second))
        })
    }
}
