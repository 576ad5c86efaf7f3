//! Domain models for the practice registry.

mod patient;
mod practice;

pub use patient::*;
pub use practice::*;
