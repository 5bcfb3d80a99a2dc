//! Single-deck scanning for one (opponent, me) pair.
//!
//! The scan keeps a cursor and a running pile. Every step adds one card to the
//! pile and inspects the three-card window under the cursor. A match awards
//! the whole pile and one trick, resets the pile to two and jumps past the
//! window, so matched cards are never reused. A miss advances one card and the
//! next window overlaps the current one. Player 1's sequence is checked first.

use crate::error::PenneyError;
use crate::model::deck::Deck;
use crate::model::score::ScoreTotals;
use crate::model::sequence::{SEQUENCE_LEN, Sequence, SequencePair};
use crate::model::symbol::Symbol;

const PILE_AFTER_MATCH: u32 = SEQUENCE_LEN as u32 - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    One,
    Two,
}

/// One inspected window during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanStep {
    /// Cursor position of the window's first card.
    pub position: usize,
    /// Pile size when the window was inspected.
    pub pile: u32,
    pub winner: Option<Player>,
}

/// Iterator over every window the scan inspects.
#[derive(Debug, Clone)]
pub struct Scan<'a> {
    symbols: &'a [Symbol],
    pair: SequencePair,
    cursor: usize,
    pile: u32,
}

impl<'a> Scan<'a> {
    fn new(symbols: &'a [Symbol], pair: SequencePair) -> Self {
        Self {
            symbols,
            pair,
            cursor: 0,
            pile: PILE_AFTER_MATCH,
        }
    }
}

impl Iterator for Scan<'_> {
    type Item = ScanStep;

    fn next(&mut self) -> Option<Self::Item> {
        let window = self.symbols.get(self.cursor..self.cursor + SEQUENCE_LEN)?;
        self.pile += 1;
        let step = ScanStep {
            position: self.cursor,
            pile: self.pile,
            winner: if self.pair.first.matches(window) {
                Some(Player::One)
            } else if self.pair.second.matches(window) {
                Some(Player::Two)
            } else {
                None
            },
        };

        if step.winner.is_some() {
            self.pile = PILE_AFTER_MATCH;
            self.cursor += SEQUENCE_LEN;
        } else {
            self.cursor += 1;
        }
        Some(step)
    }
}

/// Step-by-step view of a scan, mostly useful for tracing and tests.
pub fn scan(deck: &Deck, first: Sequence, second: Sequence) -> Scan<'_> {
    Scan::new(deck.symbols(), SequencePair::new(first, second))
}

/// Score a validated deck. Total for every input.
pub fn score(deck: &Deck, first: Sequence, second: Sequence) -> ScoreTotals {
    tally(scan(deck, first, second))
}

/// Score an arbitrary symbol slice; it must hold at least one full window.
pub fn score_symbols(
    symbols: &[Symbol],
    first: Sequence,
    second: Sequence,
) -> Result<ScoreTotals, PenneyError> {
    if symbols.len() < SEQUENCE_LEN {
        return Err(PenneyError::invalid(
            "deck",
            format!(
                "expected at least {SEQUENCE_LEN} cards but found {}",
                symbols.len()
            ),
        ));
    }
    Ok(tally(Scan::new(symbols, SequencePair::new(first, second))))
}

fn tally(steps: Scan<'_>) -> ScoreTotals {
    steps.fold(ScoreTotals::new(), |mut totals, step| {
        match step.winner {
            Some(Player::One) => {
                totals.p1_cards += step.pile;
                totals.p1_tricks += 1;
            }
            Some(Player::Two) => {
                totals.p2_cards += step.pile;
                totals.p2_tricks += 1;
            }
            None => {}
        }
        totals
    })
}
