pub mod detector;
pub mod generator;
