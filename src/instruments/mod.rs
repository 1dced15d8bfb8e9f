//! Option contract definitions implementing the [`crate::core::Instrument`]
//! capability trait.

pub mod vanilla;

pub use vanilla::{AmericanOption, DEFAULT_BINOMIAL_STEPS, EuropeanOption, JumpParams};
