use core::fmt;
use std::str::FromStr;

use crate::error::PenneyError;
use crate::model::symbol::Symbol;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

pub const DECK_SIZE: usize = 52;
pub const CARDS_PER_COLOUR: usize = DECK_SIZE / 2;

/// A 52-card deck reduced to card colours.
///
/// Any deck built through this type has exactly [`DECK_SIZE`] symbols. Decks
/// produced by [`Deck::standard`] and the shuffling constructors also hold
/// exactly [`CARDS_PER_COLOUR`] of each colour; [`Deck::from_symbols`] accepts
/// unbalanced decks for analysis and tests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Deck {
    symbols: Vec<Symbol>,
}

impl Deck {
    pub fn standard() -> Self {
        let mut symbols = Vec::with_capacity(DECK_SIZE);
        for symbol in Symbol::ALL {
            symbols.extend(std::iter::repeat_n(symbol, CARDS_PER_COLOUR));
        }
        Self { symbols }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.symbols.shuffle(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn from_symbols(symbols: Vec<Symbol>) -> Result<Self, PenneyError> {
        if symbols.len() != DECK_SIZE {
            return Err(PenneyError::invalid(
                "deck",
                format!(
                    "expected {DECK_SIZE} cards but found {}",
                    symbols.len()
                ),
            ));
        }
        Ok(Self { symbols })
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn count(&self, symbol: Symbol) -> usize {
        self.symbols.iter().filter(|&&s| s == symbol).count()
    }

    /// Stable identity: the deck read as a 52-bit binary number, first card
    /// most significant.
    pub fn id(&self) -> u64 {
        self.symbols
            .iter()
            .fold(0u64, |acc, symbol| (acc << 1) | u64::from(symbol.bit()))
    }

    /// Binary digit form, e.g. `"0110…"`.
    pub fn digits(&self) -> String {
        self.symbols.iter().map(|symbol| symbol.digit()).collect()
    }
}

impl FromStr for Deck {
    type Err = PenneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbols = s
            .trim()
            .chars()
            .map(Symbol::from_char)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_symbols(symbols)
    }
}

impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits())
    }
}
