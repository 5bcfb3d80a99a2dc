use core::fmt;

use crate::error::PenneyError;

/// One of the two card colours in a Penney deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Symbol {
    Black = 0,
    Red = 1,
}

impl Symbol {
    pub const ALL: [Symbol; 2] = [Symbol::Black, Symbol::Red];

    pub const fn from_bit(bit: u8) -> Option<Self> {
        match bit {
            0 => Some(Symbol::Black),
            1 => Some(Symbol::Red),
            _ => None,
        }
    }

    pub const fn bit(self) -> u8 {
        self as u8
    }

    pub const fn digit(self) -> char {
        match self {
            Symbol::Black => '0',
            Symbol::Red => '1',
        }
    }

    /// Accepts both digit (`0`/`1`) and colour (`B`/`R`) notation.
    pub fn from_char(ch: char) -> Result<Self, PenneyError> {
        match ch {
            '0' | 'B' | 'b' => Ok(Symbol::Black),
            '1' | 'R' | 'r' => Ok(Symbol::Red),
            other => Err(PenneyError::invalid(
                "symbol",
                format!("'{other}' is not one of 0, 1, B or R"),
            )),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Symbol::Black => "B",
            Symbol::Red => "R",
        };
        f.write_str(label)
    }
}
