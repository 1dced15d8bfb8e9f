//! Pricing-kernel reference tests.
//!
//! Reference values for the ATM scenario (S=100, K=100, r=0.05, sigma=0.2,
//! T=1) cross-checked against Hull (11th ed.) Ch. 15 worked examples and
//! the usual QuantLib European test values.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use riskforge::core::{ExerciseStyle, OptionKind};
use riskforge::engines::analytic::{
    bs_call_delta, bs_call_price, bs_call_theta, bs_gamma, bs_price, bs_put_delta, bs_put_price,
    bs_put_theta, bs_vega, merton_price,
};
use riskforge::engines::tree::{build_tree, crr_american_price, crr_european_price};
use riskforge::vol::implied_vol;

struct EuropeanCase {
    kind: OptionKind,
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
    expected: f64,
    tolerance: f64,
}

fn european_reference_cases() -> Vec<EuropeanCase> {
    vec![
        EuropeanCase {
            kind: OptionKind::Call,
            spot: 100.0,
            strike: 100.0,
            rate: 0.05,
            vol: 0.2,
            expiry: 1.0,
            expected: 10.4506,
            tolerance: 2e-4,
        },
        EuropeanCase {
            kind: OptionKind::Put,
            spot: 100.0,
            strike: 100.0,
            rate: 0.05,
            vol: 0.2,
            expiry: 1.0,
            expected: 5.5735,
            tolerance: 2e-4,
        },
        // Intrinsic boundaries at expiry.
        EuropeanCase {
            kind: OptionKind::Call,
            spot: 110.0,
            strike: 100.0,
            rate: 0.05,
            vol: 0.2,
            expiry: 0.0,
            expected: 10.0,
            tolerance: 0.0,
        },
        EuropeanCase {
            kind: OptionKind::Put,
            spot: 90.0,
            strike: 100.0,
            rate: 0.05,
            vol: 0.2,
            expiry: 0.0,
            expected: 10.0,
            tolerance: 0.0,
        },
    ]
}

#[test]
fn european_reference_values() {
    for case in european_reference_cases() {
        let px = bs_price(
            case.kind,
            case.spot,
            case.strike,
            case.rate,
            case.vol,
            case.expiry,
        )
        .unwrap();
        assert_abs_diff_eq!(px, case.expected, epsilon = case.tolerance.max(1e-12));
    }
}

#[test]
fn atm_greeks_reference_values() {
    let (s, k, r, vol, t) = (100.0, 100.0, 0.05, 0.2, 1.0);

    assert_relative_eq!(bs_call_delta(s, k, r, vol, t).unwrap(), 0.6368, epsilon = 1e-4);
    assert_relative_eq!(bs_put_delta(s, k, r, vol, t).unwrap(), -0.3632, epsilon = 1e-4);
    assert_relative_eq!(bs_gamma(s, k, r, vol, t).unwrap(), 0.0188, epsilon = 5e-5);
    assert_relative_eq!(bs_vega(s, k, r, vol, t).unwrap(), 37.5245, epsilon = 1e-3);
    assert_abs_diff_eq!(bs_call_theta(s, k, r, vol, t).unwrap(), -0.0176, epsilon = 5e-4);
    assert_abs_diff_eq!(bs_put_theta(s, k, r, vol, t).unwrap(), -0.0045, epsilon = 5e-4);
}

#[test]
fn put_call_parity_holds_across_strikes_and_expiries() {
    let s = 100.0;
    let r = 0.03;
    let vol = 0.25;
    for k in [70.0, 90.0, 100.0, 115.0, 140.0] {
        for t in [0.1, 0.5, 1.0, 3.0] {
            let c = bs_call_price(s, k, r, vol, t).unwrap();
            let p = bs_put_price(s, k, r, vol, t).unwrap();
            assert_abs_diff_eq!(c - p, s - k * (-r * t).exp(), epsilon = 1e-8);
        }
    }
}

#[test]
fn gamma_peaks_at_the_money() {
    let atm = bs_gamma(100.0, 100.0, 0.05, 0.2, 1.0).unwrap();
    assert!(atm > bs_gamma(100.0, 80.0, 0.05, 0.2, 1.0).unwrap());
    assert!(atm > bs_gamma(100.0, 120.0, 0.05, 0.2, 1.0).unwrap());
}

#[test]
fn long_option_theta_is_non_positive() {
    for kind in [OptionKind::Call, OptionKind::Put] {
        for k in [80.0, 100.0, 120.0] {
            let theta = match kind {
                OptionKind::Call => bs_call_theta(100.0, k, 0.05, 0.2, 1.0).unwrap(),
                OptionKind::Put => bs_put_theta(100.0, k, 0.05, 0.2, 1.0).unwrap(),
            };
            assert!(theta <= 1e-12, "{kind:?} K={k} theta={theta}");
        }
    }
}

#[test]
fn binomial_tree_converges_and_brackets_black_scholes() {
    let bs = bs_call_price(100.0, 100.0, 0.05, 0.2, 1.0).unwrap();
    let price =
        |steps| crr_european_price(OptionKind::Call, 100.0, 100.0, 0.05, 0.2, 1.0, steps).unwrap();

    let gap_coarse = (price(50) - price(100)).abs();
    let gap_fine = (price(100) - price(200)).abs();
    assert!(gap_fine < gap_coarse);
    assert_abs_diff_eq!(price(2000), bs, epsilon = 5e-3);
}

#[test]
fn american_put_early_exercise_premium() {
    let eur = crr_european_price(OptionKind::Put, 80.0, 100.0, 0.05, 0.3, 1.0, 150).unwrap();
    let amer = crr_american_price(OptionKind::Put, 80.0, 100.0, 0.05, 0.3, 1.0, 150).unwrap();
    assert!(amer > eur);
    assert!((amer - eur).is_finite());

    // Without dividends, American and European calls stay close.
    let eur_call = bs_call_price(100.0, 100.0, 0.05, 0.2, 1.0).unwrap();
    let amer_call = crr_american_price(OptionKind::Call, 100.0, 100.0, 0.05, 0.2, 1.0, 200).unwrap();
    assert!((amer_call - eur_call).abs() < 0.3);
}

#[test]
fn full_tree_diagnostics_are_consistent_with_pricing() {
    let steps = 100;
    let tree = build_tree(
        OptionKind::Put,
        ExerciseStyle::American,
        80.0,
        100.0,
        0.05,
        0.3,
        1.0,
        steps,
    )
    .unwrap();
    let price = crr_american_price(OptionKind::Put, 80.0, 100.0, 0.05, 0.3, 1.0, steps).unwrap();

    assert_eq!(tree.len(), steps + 1);
    assert_abs_diff_eq!(tree[0][0].value, price, epsilon = 1e-10);
    assert!(tree.iter().flatten().any(|node| node.exercise_optimal));
}

#[test]
fn merton_collapses_to_black_scholes_without_jumps() {
    for kind in [OptionKind::Call, OptionKind::Put] {
        let bs = bs_price(kind, 100.0, 105.0, 0.04, 0.22, 0.8).unwrap();
        let merton =
            merton_price(kind, 100.0, 105.0, 0.04, 0.22, 0.8, 0.0, -0.1, 0.3).unwrap();
        assert_abs_diff_eq!(merton, bs, epsilon = 1e-12);
    }
}

#[test]
fn merton_jump_premium_is_positive_for_otm_options() {
    let bs = bs_call_price(100.0, 130.0, 0.05, 0.2, 1.0).unwrap();
    let merton = merton_price(
        OptionKind::Call,
        100.0,
        130.0,
        0.05,
        0.2,
        1.0,
        1.0,
        -0.1,
        0.25,
    )
    .unwrap();
    assert!(merton > bs);
}

#[test]
fn implied_vol_round_trips_the_surface() {
    let s = 100.0;
    let r = 0.02;
    for kind in [OptionKind::Call, OptionKind::Put] {
        for k in [90.0, 100.0, 110.0] {
            for sigma in [0.15, 0.3, 0.6] {
                let price = bs_price(kind, s, k, r, sigma, 1.0).unwrap();
                let iv = implied_vol(kind, s, k, r, 1.0, price).unwrap();
                assert_abs_diff_eq!(iv, sigma, epsilon = 1e-4);
            }
        }
    }
}
