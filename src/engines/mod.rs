//! Pricing kernels grouped by methodology: closed-form analytics and
//! binomial lattices.

pub mod analytic;
pub mod tree;
