// Public API
pub use generator::{generate_question, Difficulty, Operator, Question};

// Internal modules
mod generator;
