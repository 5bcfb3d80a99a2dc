use serde::{Deserialize, Serialize};

use crate::error::PenneyError;
use crate::game::scorer;
use crate::model::deck::Deck;
use crate::model::matrix::{Category, Matrix, Rule};
use crate::model::outcome::Outcome;
use crate::model::sequence::SequencePair;

/// Raw 0/1 outcome matrices for one deck, from player 2's ("me") side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeckOutcomes {
    pub cards_win: Matrix<u8>,
    pub cards_tie: Matrix<u8>,
    pub tricks_win: Matrix<u8>,
    pub tricks_tie: Matrix<u8>,
}

impl DeckOutcomes {
    pub fn matrix(&self, category: Category) -> &Matrix<u8> {
        match category {
            Category::CardsWin => &self.cards_win,
            Category::CardsTie => &self.cards_tie,
            Category::TricksWin => &self.tricks_win,
            Category::TricksTie => &self.tricks_tie,
        }
    }

    /// Reject matrices that could not come out of [`evaluate`]: every cell is
    /// 0 or 1, and win and tie never both hold for the same pair and rule.
    pub fn validate(&self) -> Result<(), PenneyError> {
        for category in Category::ALL {
            if let Some((pair, value)) = self.matrix(category).cells().find(|&(_, v)| v > 1) {
                return Err(PenneyError::invalid(
                    "outcome matrix",
                    format!("{category} cell {}/{} holds {value}", pair.first, pair.second),
                ));
            }
        }
        for rule in Rule::ALL {
            let wins = self.matrix(rule.win());
            let ties = self.matrix(rule.tie());
            if let Some(pair) = SequencePair::all().find(|&pair| wins.get(pair) + ties.get(pair) > 1) {
                return Err(PenneyError::invalid(
                    "outcome matrix",
                    format!(
                        "{} cell {}/{} is both a win and a tie",
                        rule.label(),
                        pair.first,
                        pair.second
                    ),
                ));
            }
        }
        Ok(())
    }

    fn record(&mut self, pair: SequencePair, outcome: Outcome) {
        self.cards_win.set(pair, outcome.cards_win());
        self.cards_tie.set(pair, outcome.cards_tie());
        self.tricks_win.set(pair, outcome.tricks_win());
        self.tricks_tie.set(pair, outcome.tricks_tie());
    }
}

/// Score every ordered pair, diagonal included, against one deck.
pub fn evaluate(deck: &Deck) -> DeckOutcomes {
    let mut outcomes = DeckOutcomes::default();
    for pair in SequencePair::all() {
        let totals = scorer::score(deck, pair.first, pair.second);
        outcomes.record(pair, Outcome::classify(&totals));
    }
    outcomes
}
