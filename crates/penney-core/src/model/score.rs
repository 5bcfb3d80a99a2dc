use serde::{Deserialize, Serialize};

/// Card and trick totals for both players after scanning one deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreTotals {
    pub p1_cards: u32,
    pub p2_cards: u32,
    pub p1_tricks: u32,
    pub p2_tricks: u32,
}

impl ScoreTotals {
    pub const fn new() -> Self {
        Self {
            p1_cards: 0,
            p2_cards: 0,
            p1_tricks: 0,
            p2_tricks: 0,
        }
    }

    /// Totals as seen with the players' seats exchanged.
    pub const fn swapped(self) -> Self {
        Self {
            p1_cards: self.p2_cards,
            p2_cards: self.p1_cards,
            p1_tricks: self.p2_tricks,
            p2_tricks: self.p1_tricks,
        }
    }

    pub const fn cards_awarded(&self) -> u32 {
        self.p1_cards + self.p2_cards
    }

    pub const fn tricks_awarded(&self) -> u32 {
        self.p1_tricks + self.p2_tricks
    }
}
