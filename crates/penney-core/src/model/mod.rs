pub mod deck;
pub mod matrix;
pub mod outcome;
pub mod score;
pub mod sequence;
pub mod symbol;
