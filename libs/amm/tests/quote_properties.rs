//! Quote Calculator Property Tests
//!
//! Properties of the slippage and withdrawal math that must hold for every input,
//! independent of specific pool conditions.

use proptest::prelude::*;
use tidepool_amm::{QuoteCalculator, SlippageTolerance, BPS_DENOMINATOR, U256};

fn amount() -> impl Strategy<Value = U256> {
    prop_oneof![
        any::<u64>().prop_map(U256::from),
        any::<u128>().prop_map(U256::from),
        any::<[u64; 4]>().prop_map(U256),
    ]
}

fn tolerance_below_total() -> impl Strategy<Value = SlippageTolerance> {
    (0..BPS_DENOMINATOR).prop_map(|bps| SlippageTolerance::from_bps(bps).unwrap())
}

proptest! {
    #[test]
    fn minimum_never_exceeds_desired(desired in amount(), tolerance in tolerance_below_total()) {
        prop_assert!(QuoteCalculator::minimum_amount(desired, tolerance) <= desired);
    }

    #[test]
    fn zero_tolerance_keeps_desired(desired in amount()) {
        prop_assert_eq!(
            QuoteCalculator::minimum_amount(desired, SlippageTolerance::ZERO),
            desired
        );
    }

    #[test]
    fn total_tolerance_is_zero(desired in amount()) {
        prop_assert_eq!(
            QuoteCalculator::minimum_amount(desired, SlippageTolerance::TOTAL),
            U256::zero()
        );
    }

    #[test]
    fn minimum_matches_wide_arithmetic(desired in any::<u128>(), bps in 0..=BPS_DENOMINATOR) {
        let tolerance = SlippageTolerance::from_bps(bps).unwrap();
        let expected = U256::from(desired) * U256::from(BPS_DENOMINATOR - bps)
            / U256::from(BPS_DENOMINATOR);
        prop_assert_eq!(
            QuoteCalculator::minimum_amount(U256::from(desired), tolerance),
            expected
        );
    }

    #[test]
    fn larger_tolerance_never_raises_minimum(
        desired in amount(),
        a in 0..=BPS_DENOMINATOR,
        b in 0..=BPS_DENOMINATOR,
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let loose_tolerance = SlippageTolerance::from_bps(high).unwrap();
        let tight_tolerance = SlippageTolerance::from_bps(low).unwrap();
        let loose = QuoteCalculator::minimum_amount(desired, loose_tolerance);
        let tight = QuoteCalculator::minimum_amount(desired, tight_tolerance);
        prop_assert!(loose <= tight);
    }

    #[test]
    fn covered_withdrawal_is_unchanged(requested in amount(), extra in any::<u128>()) {
        let available = requested.saturating_add(U256::from(extra));
        prop_assert_eq!(
            QuoteCalculator::safe_withdrawal_amount(requested, available),
            requested
        );
    }

    #[test]
    fn uncovered_withdrawal_is_half_balance(available in amount(), shortfall in 1u128..) {
        prop_assume!(available < U256::MAX);
        let requested = available.saturating_add(U256::from(shortfall));
        prop_assume!(requested > available);
        let amount = QuoteCalculator::safe_withdrawal_amount(requested, available);
        prop_assert_eq!(amount, available / U256::from(2u64));
        prop_assert!(amount <= available);
    }

    #[test]
    fn quotes_are_deterministic(
        desired in amount(),
        bps in 0..=BPS_DENOMINATOR,
        available in amount(),
    ) {
        let tolerance = SlippageTolerance::from_bps(bps).unwrap();
        prop_assert_eq!(
            QuoteCalculator::minimum_amount(desired, tolerance),
            QuoteCalculator::minimum_amount(desired, tolerance)
        );
        prop_assert_eq!(
            QuoteCalculator::safe_withdrawal_amount(desired, available),
            QuoteCalculator::safe_withdrawal_amount(desired, available)
        );
    }

    #[test]
    fn pro_rata_minimum_bounded(minimum in amount(), original in amount(), clamped in amount()) {
        let scaled = QuoteCalculator::pro_rata_minimum(minimum, original, clamped);
        prop_assert!(scaled <= minimum);
    }
}

#[test]
fn scenario_twenty_percent_tolerance() {
    let tolerance: SlippageTolerance = "0.2".parse().unwrap();
    assert_eq!(
        QuoteCalculator::minimum_amount(U256::from(100_000_000u64), tolerance),
        U256::from(80_000_000u64)
    );
}

#[test]
fn scenario_clamp_to_half_balance() {
    let requested = U256::from(1_000_000_000_000_000_000u128);
    let available = U256::from(400_000_000_000_000_000u128);
    assert_eq!(
        QuoteCalculator::safe_withdrawal_amount(requested, available),
        U256::from(200_000_000_000_000_000u128)
    );
}
