//! Volatility analytics: implied-volatility inversion.

pub mod implied;

pub use implied::implied_vol;
