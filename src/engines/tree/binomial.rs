//! Cox-Ross-Rubinstein binomial tree kernel.
//!
//! Parameters for an `n`-step tree: `dt = T/n`, `u = exp(sigma sqrt(dt))`,
//! `d = 1/u`, risk-neutral probability `p = (exp(r dt) - d)/(u - d)`,
//! per-step discount `exp(-r dt)`. A probability outside `[0, 1]` is a
//! numerical-instability failure, not a silent clamp.
//!
//! Pricing runs an in-place backward induction over a single value vector;
//! node spots use a multiplicative recurrence so the inner loops contain no
//! `powf`. The full lattice (`O(n^2)` nodes) is only materialized by
//! [`build_tree`] for diagnostic callers.

use crate::core::{ExerciseStyle, OptionKind, PricingError};
use crate::math::{validate_pricing_inputs, validate_rate};

/// Upper bound on tree depth accepted by the kernel.
pub const MAX_BINOMIAL_STEPS: usize = 10_000;

/// One lattice node, as reported by [`build_tree`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeNode {
    /// Spot at the node.
    pub spot: f64,
    /// Option value at the node.
    pub value: f64,
    /// Whether immediate exercise strictly beats holding (American only).
    pub exercise_optimal: bool,
}

struct CrrParams {
    up: f64,
    ratio: f64,
    prob_up: f64,
    discount: f64,
}

fn validate_steps(steps: usize) -> Result<(), PricingError> {
    if steps < 1 || steps > MAX_BINOMIAL_STEPS {
        return Err(PricingError::InvalidInput(format!(
            "binomial steps must be between 1 and {MAX_BINOMIAL_STEPS}, got {steps}"
        )));
    }
    Ok(())
}

fn crr_params(rate: f64, vol: f64, expiry: f64, steps: usize) -> Result<CrrParams, PricingError> {
    let dt = expiry / steps as f64;
    let up = (vol * dt.sqrt()).exp();
    let down = 1.0 / up;
    let prob_up = ((rate * dt).exp() - down) / (up - down);
    if !prob_up.is_finite() || !(0.0..=1.0).contains(&prob_up) {
        return Err(PricingError::NumericalError(format!(
            "risk-neutral probability {prob_up} is outside [0, 1]"
        )));
    }
    Ok(CrrParams {
        up,
        ratio: up / down,
        prob_up,
        discount: (-rate * dt).exp(),
    })
}

fn crr_price(
    kind: OptionKind,
    style: ExerciseStyle,
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
    steps: usize,
) -> Result<f64, PricingError> {
    validate_pricing_inputs(spot, strike, expiry, vol)?;
    validate_rate(rate)?;
    validate_steps(steps)?;

    // Degenerate tree: immediate expiry or a driftless lattice.
    if expiry <= 0.0 || vol <= 0.0 {
        return Ok(kind.intrinsic(spot, strike));
    }

    let p = crr_params(rate, vol, expiry, steps)?;
    let disc_up = p.discount * p.prob_up;
    let disc_down = p.discount * (1.0 - p.prob_up);
    let is_american = style == ExerciseStyle::American;

    // Terminal layer: node j carries j up-moves.
    let mut values = vec![0.0_f64; steps + 1];
    let mut node_spot = spot / p.up.powi(steps as i32);
    for value in values.iter_mut() {
        *value = kind.intrinsic(node_spot, strike);
        node_spot *= p.ratio;
    }

    let mut base = spot / p.up.powi(steps as i32 - 1);
    for i in (0..steps).rev() {
        if is_american {
            let mut st = base;
            for j in 0..=i {
                let hold = disc_up * values[j + 1] + disc_down * values[j];
                values[j] = hold.max(kind.intrinsic(st, strike));
                st *= p.ratio;
            }
        } else {
            for j in 0..=i {
                values[j] = disc_up * values[j + 1] + disc_down * values[j];
            }
        }
        base *= p.up;
    }

    Ok(values[0])
}

/// European option price on the CRR lattice.
pub fn crr_european_price(
    kind: OptionKind,
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
    steps: usize,
) -> Result<f64, PricingError> {
    crr_price(
        kind,
        ExerciseStyle::European,
        spot,
        strike,
        rate,
        vol,
        expiry,
        steps,
    )
}

/// American option price on the CRR lattice, with
/// `V = max(hold, intrinsic)` at every interior node.
pub fn crr_american_price(
    kind: OptionKind,
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
    steps: usize,
) -> Result<f64, PricingError> {
    crr_price(
        kind,
        ExerciseStyle::American,
        spot,
        strike,
        rate,
        vol,
        expiry,
        steps,
    )
}

/// Materializes the full lattice for diagnostic callers.
///
/// Level `i` holds `i + 1` nodes; node `j` of level `i` carries `j`
/// up-moves. `exercise_optimal` marks nodes where immediate exercise
/// strictly beats the hold value (terminal nodes: any in-the-money node of
/// an American contract). Not on the pricing hot path; allocation is
/// `O(steps^2)`.
#[allow(clippy::too_many_arguments)]
pub fn build_tree(
    kind: OptionKind,
    style: ExerciseStyle,
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
    steps: usize,
) -> Result<Vec<Vec<TreeNode>>, PricingError> {
    validate_pricing_inputs(spot, strike, expiry, vol)?;
    validate_rate(rate)?;
    validate_steps(steps)?;

    let is_american = style == ExerciseStyle::American;

    if expiry <= 0.0 || vol <= 0.0 {
        let value = kind.intrinsic(spot, strike);
        return Ok(vec![vec![TreeNode {
            spot,
            value,
            exercise_optimal: is_american && value > 0.0,
        }]]);
    }

    let p = crr_params(rate, vol, expiry, steps)?;
    let disc_up = p.discount * p.prob_up;
    let disc_down = p.discount * (1.0 - p.prob_up);

    let mut tree: Vec<Vec<TreeNode>> = Vec::with_capacity(steps + 1);
    for i in 0..=steps {
        let mut level = Vec::with_capacity(i + 1);
        let mut node_spot = spot / p.up.powi(i as i32);
        for _ in 0..=i {
            level.push(TreeNode {
                spot: node_spot,
                value: 0.0,
                exercise_optimal: false,
            });
            node_spot *= p.ratio;
        }
        tree.push(level);
    }

    for node in tree[steps].iter_mut() {
        node.value = kind.intrinsic(node.spot, strike);
        node.exercise_optimal = is_american && node.value > 0.0;
    }

    for i in (0..steps).rev() {
        for j in 0..=i {
            let hold = disc_up * tree[i + 1][j + 1].value + disc_down * tree[i + 1][j].value;
            let node = &mut tree[i][j];
            if is_american {
                let exercise = kind.intrinsic(node.spot, strike);
                if exercise > hold {
                    node.value = exercise;
                    node.exercise_optimal = true;
                } else {
                    node.value = hold;
                }
            } else {
                node.value = hold;
            }
        }
    }

    Ok(tree)
}
