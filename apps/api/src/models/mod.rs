pub mod candidate;
pub mod interview;
pub mod result;
pub mod score;
