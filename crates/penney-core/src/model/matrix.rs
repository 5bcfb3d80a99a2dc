use core::fmt;

use serde::{Deserialize, Serialize};

use crate::model::sequence::{SEQUENCE_COUNT, Sequence, SequencePair};

/// The four per-pair statistics tracked for every deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Category {
    CardsWin = 0,
    CardsTie = 1,
    TricksWin = 2,
    TricksTie = 3,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::CardsWin,
        Category::CardsTie,
        Category::TricksWin,
        Category::TricksTie,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Field name used in result records and persisted logs.
    pub const fn key(self) -> &'static str {
        match self {
            Category::CardsWin => "cards",
            Category::CardsTie => "card_ties",
            Category::TricksWin => "tricks",
            Category::TricksTie => "trick_ties",
        }
    }

    pub const fn is_tie(self) -> bool {
        matches!(self, Category::CardsTie | Category::TricksTie)
    }

    pub const fn rule(self) -> Rule {
        match self {
            Category::CardsWin | Category::CardsTie => Rule::Cards,
            Category::TricksWin | Category::TricksTie => Rule::Tricks,
        }
    }
}

/// The two ways a deck is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Cards,
    Tricks,
}

impl Rule {
    pub const ALL: [Rule; 2] = [Rule::Cards, Rule::Tricks];

    pub const fn win(self) -> Category {
        match self {
            Rule::Cards => Category::CardsWin,
            Rule::Tricks => Category::TricksWin,
        }
    }

    pub const fn tie(self) -> Category {
        match self {
            Rule::Cards => Category::CardsTie,
            Rule::Tricks => Category::TricksTie,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Rule::Cards => "Cards",
            Rule::Tricks => "Tricks",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// An 8×8 grid indexed by (opponent sequence, my sequence).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Matrix<T> {
    cells: [[T; SEQUENCE_COUNT]; SEQUENCE_COUNT],
}

impl<T: Copy> Matrix<T> {
    pub const fn filled(value: T) -> Self {
        Self {
            cells: [[value; SEQUENCE_COUNT]; SEQUENCE_COUNT],
        }
    }

    pub const fn from_rows(cells: [[T; SEQUENCE_COUNT]; SEQUENCE_COUNT]) -> Self {
        Self { cells }
    }

    pub fn at(&self, row: usize, column: usize) -> T {
        self.cells[row][column]
    }

    pub fn get(&self, pair: SequencePair) -> T {
        self.cells[pair.first.index()][pair.second.index()]
    }

    pub fn set(&mut self, pair: SequencePair, value: T) {
        self.cells[pair.first.index()][pair.second.index()] = value;
    }

    pub fn rows(&self) -> &[[T; SEQUENCE_COUNT]; SEQUENCE_COUNT] {
        &self.cells
    }

    pub fn row(&self, first: Sequence) -> &[T; SEQUENCE_COUNT] {
        &self.cells[first.index()]
    }

    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Matrix<U> {
        Matrix {
            cells: self.cells.map(|row| row.map(&f)),
        }
    }

    /// Cells paired with their coordinates, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (SequencePair, T)> + '_ {
        SequencePair::all().map(move |pair| (pair, self.get(pair)))
    }

    /// Replace self-play cells with `None`.
    pub fn without_diagonal(&self) -> Matrix<Option<T>> {
        let mut masked = self.map(Some);
        for sequence in Sequence::ALL {
            masked.set(SequencePair::new(sequence, sequence), None);
        }
        masked
    }
}

impl<T: Copy + Default> Default for Matrix<T> {
    fn default() -> Self {
        Self::filled(T::default())
    }
}

impl Matrix<u64> {
    /// Element-wise accumulate a 0/1 indicator matrix.
    pub fn accumulate(&mut self, indicators: &Matrix<u8>) {
        for (total_row, row) in self.cells.iter_mut().zip(indicators.cells.iter()) {
            for (total, &value) in total_row.iter_mut().zip(row.iter()) {
                *total += u64::from(value);
            }
        }
    }

    pub fn merge(&mut self, other: &Matrix<u64>) {
        for (total_row, row) in self.cells.iter_mut().zip(other.cells.iter()) {
            for (total, &value) in total_row.iter_mut().zip(row.iter()) {
                *total += value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_use_sequence_indices() {
        let mut matrix = Matrix::filled(0u8);
        let pair = SequencePair::new(Sequence::ALL[2], Sequence::ALL[5]);
        matrix.set(pair, 1);
        assert_eq!(matrix.at(2, 5), 1);
        assert_eq!(matrix.get(pair.swapped()), 0);
        assert_eq!(matrix.cells().filter(|(_, v)| *v == 1).count(), 1);
    }

    #[test]
    fn without_diagonal_masks_self_play() {
        let masked = Matrix::filled(3u8).without_diagonal();
        for idx in 0..SEQUENCE_COUNT {
            assert_eq!(masked.at(idx, idx), None);
        }
        assert_eq!(masked.at(0, 7), Some(3));
    }

    #[test]
    fn accumulate_adds_indicators() {
        let mut totals = Matrix::<u64>::default();
        let ones = Matrix::filled(1u8);
        totals.accumulate(&ones);
        totals.accumulate(&ones);
        assert_eq!(totals.at(4, 1), 2);

        let mut other = Matrix::<u64>::default();
        other.accumulate(&ones);
        totals.merge(&other);
        assert_eq!(totals.at(7, 7), 3);
    }

    #[test]
    fn category_keys_match_record_fields() {
        let keys: Vec<_> = Category::ALL.iter().map(|c| c.key()).collect();
        assert_eq!(keys, ["cards", "card_ties", "tricks", "trick_ties"]);
        assert!(Category::TricksTie.is_tie());
        assert_eq!(Category::CardsTie.rule(), Rule::Cards);
        assert_eq!(Rule::Tricks.win(), Category::TricksWin);
    }
}
