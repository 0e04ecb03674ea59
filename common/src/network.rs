pub mod generator;
pub mod range;
