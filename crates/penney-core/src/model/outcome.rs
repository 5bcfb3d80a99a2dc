use core::cmp::Ordering;

use crate::model::score::ScoreTotals;

/// Who came out ahead on one scoring rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Player1,
    Player2,
    Tie,
}

impl Verdict {
    pub fn compare(p1: u32, p2: u32) -> Self {
        match p1.cmp(&p2) {
            Ordering::Less => Verdict::Player2,
            Ordering::Equal => Verdict::Tie,
            Ordering::Greater => Verdict::Player1,
        }
    }

    pub const fn is_player2_win(self) -> bool {
        matches!(self, Verdict::Player2)
    }

    pub const fn is_tie(self) -> bool {
        matches!(self, Verdict::Tie)
    }
}

/// Win/tie indicators for both scoring rules, from player 2's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Outcome {
    pub cards: Verdict,
    pub tricks: Verdict,
}

impl Outcome {
    pub fn classify(totals: &ScoreTotals) -> Self {
        Self {
            cards: Verdict::compare(totals.p1_cards, totals.p2_cards),
            tricks: Verdict::compare(totals.p1_tricks, totals.p2_tricks),
        }
    }

    pub fn cards_win(&self) -> u8 {
        u8::from(self.cards.is_player2_win())
    }

    pub fn cards_tie(&self) -> u8 {
        u8::from(self.cards.is_tie())
    }

    pub fn tricks_win(&self) -> u8 {
        u8::from(self.tricks.is_player2_win())
    }

    pub fn tricks_tie(&self) -> u8 {
        u8::from(self.tricks.is_tie())
    }

    /// `(cards_win, cards_tie, tricks_win, tricks_tie)` as 0/1 indicators.
    pub fn indicators(&self) -> (u8, u8, u8, u8) {
        (
            self.cards_win(),
            self.cards_tie(),
            self.tricks_win(),
            self.tricks_tie(),
        )
    }
}
