use serde::{Deserialize, Serialize};

use crate::error::PenneyError;
use crate::game::aggregate::Probabilities;
use crate::game::evaluator::DeckOutcomes;
use crate::model::deck::Deck;
use crate::model::matrix::Matrix;

/// Final probabilities as published to reporting and plotting.
///
/// Field names follow the historical `results.json` layout; self-play cells
/// serialize as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultRecord {
    pub cards: Matrix<Option<f64>>,
    pub card_ties: Matrix<Option<f64>>,
    pub tricks: Matrix<Option<f64>>,
    pub trick_ties: Matrix<Option<f64>>,
    pub n: u64,
}

impl ResultRecord {
    pub fn capture(probabilities: &Probabilities) -> Self {
        ResultRecord {
            cards: probabilities.cards_win,
            card_ties: probabilities.cards_tie,
            tricks: probabilities.tricks_win,
            trick_ties: probabilities.tricks_tie,
            n: probabilities.n,
        }
    }

    pub fn restore(self) -> Probabilities {
        Probabilities {
            cards_win: self.cards,
            cards_tie: self.card_ties,
            tricks_win: self.tricks,
            tricks_tie: self.trick_ties,
            n: self.n,
        }
    }

    pub fn to_json(probabilities: &Probabilities) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Self::capture(probabilities))
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// One evaluated deck as stored in the per-deck log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeckRecord {
    pub index: u64,
    pub seed: u64,
    pub deck_id: u64,
    pub deck: String,
    pub cards: Matrix<u8>,
    pub card_ties: Matrix<u8>,
    pub tricks: Matrix<u8>,
    pub trick_ties: Matrix<u8>,
}

impl DeckRecord {
    pub fn capture(index: u64, seed: u64, deck: &Deck, outcomes: &DeckOutcomes) -> Self {
        DeckRecord {
            index,
            seed,
            deck_id: deck.id(),
            deck: deck.digits(),
            cards: outcomes.cards_win,
            card_ties: outcomes.cards_tie,
            tricks: outcomes.tricks_win,
            trick_ties: outcomes.tricks_tie,
        }
    }

    pub fn outcomes(&self) -> DeckOutcomes {
        DeckOutcomes {
            cards_win: self.cards,
            cards_tie: self.card_ties,
            tricks_win: self.tricks,
            tricks_tie: self.trick_ties,
        }
    }

    /// Parse the stored deck and check it against its recorded identity.
    pub fn deck(&self) -> Result<Deck, PenneyError> {
        let deck: Deck = self.deck.parse()?;
        if deck.id() != self.deck_id {
            return Err(PenneyError::InvalidInput {
                what: "deck record",
                detail: format!(
                    "deck {} does not match recorded id {}",
                    deck.id(),
                    self.deck_id
                ),
            });
        }
        Ok(deck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::aggregate::Aggregate;
    use crate::game::evaluator::evaluate;

    #[test]
    fn result_record_uses_historical_field_names() {
        let deck = Deck::shuffled_with_seed(3);
        let aggregate: Aggregate = std::iter::once(evaluate(&deck)).collect();
        let probabilities = aggregate.finalize().unwrap();

        let json = ResultRecord::to_json(&probabilities).unwrap();
        for field in ["\"cards\"", "\"card_ties\"", "\"tricks\"", "\"trick_ties\"", "\"n\": 1"] {
            assert!(json.contains(field), "missing {field}");
        }
        assert!(json.contains("null"));
    }

    #[test]
    fn result_record_restores_probabilities() {
        let aggregate: Aggregate = [1u64, 2]
            .iter()
            .map(|&seed| evaluate(&Deck::shuffled_with_seed(seed)))
            .collect();
        let probabilities = aggregate.finalize().unwrap();
        let json = ResultRecord::to_json(&probabilities).unwrap();
        let restored = ResultRecord::from_json(&json).unwrap().restore();
        assert_eq!(restored, probabilities);
    }

    #[test]
    fn deck_record_checks_identity() {
        let deck = Deck::shuffled_with_seed(8);
        let outcomes = evaluate(&deck);
        let mut record = DeckRecord::capture(0, 8, &deck, &outcomes);
        assert_eq!(record.deck().unwrap(), deck);
        assert_eq!(record.outcomes(), outcomes);

        record.deck_id += 1;
        assert!(record.deck().is_err());
    }
}
