pub mod aggregate;
pub mod evaluator;
pub mod scorer;
pub mod serialization;
