//! Cross-deck accumulation of outcome matrices.
//!
//! An [`Aggregate`] is a plain value owned by whoever drives the simulation.
//! Sums are integers, so folding decks in any order, or merging partial
//! aggregates built on different threads, gives identical totals.

use serde::{Deserialize, Serialize};

use crate::error::PenneyError;
use crate::game::evaluator::DeckOutcomes;
use crate::model::matrix::{Category, Matrix, Rule};
use crate::model::sequence::SequencePair;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Aggregate {
    totals: [Matrix<u64>; 4],
    decks: u64,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, outcomes: &DeckOutcomes) {
        for category in Category::ALL {
            self.totals[category.index()].accumulate(outcomes.matrix(category));
        }
        self.decks += 1;
    }

    /// Combine a partial aggregate built elsewhere.
    pub fn merge(&mut self, other: &Aggregate) {
        for category in Category::ALL {
            self.totals[category.index()].merge(&other.totals[category.index()]);
        }
        self.decks += other.decks;
    }

    pub fn decks(&self) -> u64 {
        self.decks
    }

    pub fn is_empty(&self) -> bool {
        self.decks == 0
    }

    pub fn totals(&self, category: Category) -> &Matrix<u64> {
        &self.totals[category.index()]
    }

    pub fn finalize(&self) -> Result<Probabilities, PenneyError> {
        if self.decks == 0 {
            return Err(PenneyError::EmptyAggregate);
        }
        let n = self.decks as f64;
        let mean = |category: Category| {
            self.totals(category)
                .map(|total| total as f64 / n)
                .without_diagonal()
        };
        Ok(Probabilities {
            cards_win: mean(Category::CardsWin),
            cards_tie: mean(Category::CardsTie),
            tricks_win: mean(Category::TricksWin),
            tricks_tie: mean(Category::TricksTie),
            n: self.decks,
        })
    }
}

impl Extend<DeckOutcomes> for Aggregate {
    fn extend<I: IntoIterator<Item = DeckOutcomes>>(&mut self, iter: I) {
        for outcomes in iter {
            self.fold(&outcomes);
        }
    }
}

impl FromIterator<DeckOutcomes> for Aggregate {
    fn from_iter<I: IntoIterator<Item = DeckOutcomes>>(iter: I) -> Self {
        let mut aggregate = Aggregate::new();
        aggregate.extend(iter);
        aggregate
    }
}

/// Empirical probabilities in `[0, 1]`; self-play cells are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    pub cards_win: Matrix<Option<f64>>,
    pub cards_tie: Matrix<Option<f64>>,
    pub tricks_win: Matrix<Option<f64>>,
    pub tricks_tie: Matrix<Option<f64>>,
    pub n: u64,
}

impl Probabilities {
    pub fn matrix(&self, category: Category) -> &Matrix<Option<f64>> {
        match category {
            Category::CardsWin => &self.cards_win,
            Category::CardsTie => &self.cards_tie,
            Category::TricksWin => &self.tricks_win,
            Category::TricksTie => &self.tricks_tie,
        }
    }

    /// Whole-number percentages in `[0, 100]` for display.
    pub fn percentages(&self, category: Category) -> Matrix<Option<f64>> {
        self.matrix(category)
            .map(|cell| cell.map(|p| (p * 100.0).round()))
    }

    /// Probability the opponent (row player) wins outright.
    pub fn opponent_win(&self, pair: SequencePair, rule: Rule) -> Option<f64> {
        let win = self.matrix(rule.win()).get(pair)?;
        let tie = self.matrix(rule.tie()).get(pair)?;
        Some((1.0 - win - tie).max(0.0))
    }
}
