//! Lattice pricing kernels.

pub mod binomial;

pub use binomial::{
    MAX_BINOMIAL_STEPS, TreeNode, build_tree, crr_american_price, crr_european_price,
};
