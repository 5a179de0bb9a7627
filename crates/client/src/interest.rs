// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Client-side mirror of the on-chain interest setters.
//!
//! Rates must match the settlement engine bit for bit, so every division here
//! truncates exactly where the contracts truncate. All rates are per-second values
//! scaled by the fixed base; [`InterestPerSecond::borrow_apr`] annualizes for
//! display only.
//!
//! [`InterestPerSecond::borrow_apr`]: crate::types::InterestPerSecond::borrow_apr

use alloy_primitives::U256;
use solera_core::math::{BASE, MathError, Rounding, SECONDS_IN_A_YEAR, div, mul_div};

use crate::{
    config::{InterestSetter, NetworkConstants},
    error::ClientError,
    types::{InterestPerSecond, MarketId, MarketTotals},
};

/// The maximum annual borrow rate of the kinked linear model (100% per year).
pub const MAX_APR: U256 = BASE;

/// Annual rate targeted at the utilization kink for stablecoin markets (4%).
const STABLECOIN_GOAL_APR: U256 = U256::from_limbs([40_000_000_000_000_000, 0, 0, 0]);

/// Annual rate targeted at the utilization kink for all other markets (7%).
const STANDARD_GOAL_APR: U256 = U256::from_limbs([70_000_000_000_000_000, 0, 0, 0]);

/// The utilization kink of the linear model.
const NINETY_PERCENT: U256 = U256::from_limbs([900_000_000_000_000_000, 0, 0, 0]);

/// The width of the segment between the kink and full utilization.
const TEN_PERCENT: U256 = U256::from_limbs([100_000_000_000_000_000, 0, 0, 0]);

/// Evaluates a market's interest setter against its current totals.
///
/// Returns zero in both directions when nothing is borrowed. The supply rate is the
/// borrow rate scaled by the earnings rate, and additionally by utilization whenever
/// the market is not fully borrowed.
///
/// # Errors
///
/// Returns an error on 256-bit overflow in curve evaluation.
pub fn interest_per_second(
    setter: &InterestSetter,
    earnings_rate: U256,
    totals: &MarketTotals,
) -> Result<InterestPerSecond, MathError> {
    if totals.borrowed.is_zero() {
        return Ok(InterestPerSecond::ZERO);
    }

    let borrow_rate = match setter {
        InterestSetter::AlwaysZero => U256::ZERO,
        InterestSetter::AaveCopyCat { stablecoin } => aave_borrow_rate(*stablecoin, totals)?,
        InterestSetter::DoubleExponent {
            max_apr,
            coefficients,
        } => double_exponent_borrow_rate(*max_apr, coefficients, totals)?,
    };

    let mut supply_rate = mul_div(borrow_rate, earnings_rate, BASE, Rounding::Down)?;
    if totals.borrowed < totals.supply {
        supply_rate = mul_div(supply_rate, totals.borrowed, totals.supply, Rounding::Down)?;
    }

    Ok(InterestPerSecond {
        borrow_rate,
        supply_rate,
    })
}

/// Looks up a market's configured curve and evaluates it in one step.
///
/// # Errors
///
/// Returns an error when the network or market has no configuration, or on
/// arithmetic overflow.
pub fn market_interest_rate(
    network_id: u32,
    market_id: MarketId,
    totals: &MarketTotals,
) -> Result<InterestPerSecond, ClientError> {
    let constants = NetworkConstants::for_network(network_id)?;
    let setter = constants.interest_setter(market_id)?;
    Ok(interest_per_second(
        setter,
        constants.earnings_rate,
        totals,
    )?)
}

/// Two-segment linear curve: 0 to the goal APR over `[0, 90%)` utilization, then the
/// goal to 100% APR over `[90%, 100%]`, clamped at 100% once borrows meet supply.
fn aave_borrow_rate(stablecoin: bool, totals: &MarketTotals) -> Result<U256, MathError> {
    let goal = if stablecoin {
        STABLECOIN_GOAL_APR
    } else {
        STANDARD_GOAL_APR
    };

    if totals.borrowed >= totals.supply {
        return div(MAX_APR, SECONDS_IN_A_YEAR, Rounding::Down);
    }

    let utilization = mul_div(totals.borrowed, BASE, totals.supply, Rounding::Down)?;
    let annual = if utilization > NINETY_PERCENT {
        let excess = utilization - NINETY_PERCENT;
        goal + mul_div(MAX_APR - goal, excess, TEN_PERCENT, Rounding::Down)?
    } else {
        mul_div(goal, utilization, NINETY_PERCENT, Rounding::Down)?
    };

    div(annual, SECONDS_IN_A_YEAR, Rounding::Down)
}

/// Repeated-squaring polynomial: the running term starts at utilization and is
/// squared (not re-multiplied by utilization) between coefficients.
fn double_exponent_borrow_rate(
    max_apr: U256,
    coefficients: &[u8],
    totals: &MarketTotals,
) -> Result<U256, MathError> {
    let mut result = U256::from(coefficients.first().copied().unwrap_or(0)) * BASE;

    if totals.borrowed >= totals.supply {
        // fully borrowed pins the accumulator to the full coefficient sum
        result = U256::from(100_u8) * BASE;
    } else {
        let mut polynomial = mul_div(BASE, totals.borrowed, totals.supply, Rounding::Down)?;
        for &coefficient in coefficients.iter().skip(1) {
            result += polynomial * U256::from(coefficient);
            polynomial = mul_div(polynomial, polynomial, BASE, Rounding::Down)?;
        }
    }

    let denominator = SECONDS_IN_A_YEAR * BASE * U256::from(100_u8);
    mul_div(result, max_apr, denominator, Rounding::Down)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    const EARNINGS_RATE: u64 = 900_000_000_000_000_000;

    fn totals(borrowed: u64, supply: u64) -> MarketTotals {
        MarketTotals::new(U256::from(borrowed), U256::from(supply))
    }

    fn borrow_rate(setter: &InterestSetter, totals: &MarketTotals) -> U256 {
        interest_per_second(setter, U256::from(EARNINGS_RATE), totals)
            .unwrap()
            .borrow_rate
    }

    #[rstest]
    #[case(InterestSetter::AlwaysZero)]
    #[case(InterestSetter::AaveCopyCat { stablecoin: true })]
    #[case(InterestSetter::AaveCopyCat { stablecoin: false })]
    #[case(InterestSetter::DoubleExponent {
        max_apr: BASE,
        coefficients: vec![0, 100],
    })]
    fn test_zero_borrow_short_circuits_every_family(#[case] setter: InterestSetter) {
        let rates =
            interest_per_second(&setter, U256::from(EARNINGS_RATE), &totals(0, 1_000)).unwrap();
        assert_eq!(rates, InterestPerSecond::ZERO);
    }

    #[rstest]
    fn test_always_zero_with_outstanding_borrows() {
        let rates = interest_per_second(
            &InterestSetter::AlwaysZero,
            U256::from(EARNINGS_RATE),
            &totals(500, 1_000),
        )
        .unwrap();
        assert_eq!(rates, InterestPerSecond::ZERO);
    }

    #[rstest]
    // at the kink the annual rate is exactly the goal
    #[case(true, 90, 100, 40_000_000_000_000_000)]
    #[case(false, 90, 100, 70_000_000_000_000_000)]
    // half way to the kink the annual rate is half the goal
    #[case(true, 45, 100, 20_000_000_000_000_000)]
    #[case(false, 45, 100, 35_000_000_000_000_000)]
    // 95% utilization: goal + (max - goal) / 2, exactly
    #[case(true, 95, 100, 520_000_000_000_000_000)]
    #[case(false, 95, 100, 535_000_000_000_000_000)]
    fn test_aave_annual_rates(
        #[case] stablecoin: bool,
        #[case] borrowed: u64,
        #[case] supply: u64,
        #[case] annual: u64,
    ) {
        let setter = InterestSetter::AaveCopyCat { stablecoin };
        let expected = div(U256::from(annual), SECONDS_IN_A_YEAR, Rounding::Down).unwrap();
        assert_eq!(borrow_rate(&setter, &totals(borrowed, supply)), expected);
    }

    #[rstest]
    #[case(100, 100)]
    #[case(150, 100)]
    fn test_aave_clamps_at_full_utilization(#[case] borrowed: u64, #[case] supply: u64) {
        let setter = InterestSetter::AaveCopyCat { stablecoin: false };
        // 1e18 / 31,536,000 truncates to 31,709,791,983
        assert_eq!(
            borrow_rate(&setter, &totals(borrowed, supply)),
            U256::from(31_709_791_983_u64)
        );
    }

    #[rstest]
    fn test_supply_rate_full_utilization_skips_scaling() {
        let setter = InterestSetter::AaveCopyCat { stablecoin: false };
        let rates =
            interest_per_second(&setter, U256::from(EARNINGS_RATE), &totals(100, 100)).unwrap();
        assert_eq!(rates.borrow_rate, U256::from(31_709_791_983_u64));
        // floor(31,709,791,983 * 0.9), with no utilization scaling applied
        assert_eq!(rates.supply_rate, U256::from(28_538_812_784_u64));
    }

    #[rstest]
    fn test_supply_rate_scales_by_utilization_below_full() {
        let setter = InterestSetter::AaveCopyCat { stablecoin: true };
        let rates =
            interest_per_second(&setter, U256::from(EARNINGS_RATE), &totals(45, 100)).unwrap();
        // annual 2% -> 634,195,839 per second
        assert_eq!(rates.borrow_rate, U256::from(634_195_839_u64));
        // floor(634,195,839 * 0.9) = 570,776,255, then * 45 / 100
        assert_eq!(rates.supply_rate, U256::from(256_849_314_u64));
    }

    #[rstest]
    // single linear term: 100 * u = 50e18, then / (100 * seconds-per-year)
    #[case(vec![0, 100], 1_000_000_000_000_000_000, 15_854_895_991)]
    // constant plus linear: 20e18 + 80 * 0.5e18 = 60e18
    #[case(vec![20, 80], 1_000_000_000_000_000_000, 19_025_875_190)]
    // pure squared term: 100 * (0.5e18)^2 / 1e18 = 25e18, proving self-composition
    #[case(vec![0, 0, 100], 1_000_000_000_000_000_000, 7_927_447_995)]
    // halving max APR halves the result
    #[case(vec![0, 100], 500_000_000_000_000_000, 7_927_447_995)]
    fn test_double_exponent_at_half_utilization(
        #[case] coefficients: Vec<u8>,
        #[case] max_apr: u64,
        #[case] expected: u64,
    ) {
        let setter = InterestSetter::DoubleExponent {
            max_apr: U256::from(max_apr),
            coefficients,
        };
        assert_eq!(
            borrow_rate(&setter, &totals(500, 1_000)),
            U256::from(expected)
        );
    }

    #[rstest]
    fn test_double_exponent_full_utilization_uses_coefficient_sum() {
        let setter = InterestSetter::DoubleExponent {
            max_apr: BASE,
            coefficients: vec![0, 20, 10, 0, 0, 0, 10, 60],
        };
        // 100e18 * 1e18 / (31,536,000 * 1e18 * 100)
        assert_eq!(
            borrow_rate(&setter, &totals(700, 700)),
            U256::from(31_709_791_983_u64)
        );
    }

    #[rstest]
    fn test_market_interest_rate_composes_config() {
        let rates = market_interest_rate(1, 1, &totals(45, 100)).unwrap();
        // mainnet market 1 is the stablecoin linear curve
        assert_eq!(rates.borrow_rate, U256::from(634_195_839_u64));

        let err = market_interest_rate(424_242, 0, &totals(1, 2)).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Property-based testing
    ////////////////////////////////////////////////////////////////////////////////

    proptest! {
        #[rstest]
        fn prop_aave_borrow_rate_monotone_in_utilization(
            stablecoin in any::<bool>(),
            supply in 1_u64..=1_000_000,
            borrowed_lo in 0_u64..=1_500_000,
            step in 0_u64..=500_000,
        ) {
            let setter = InterestSetter::AaveCopyCat { stablecoin };
            let borrowed_hi = borrowed_lo.saturating_add(step);
            let lo = borrow_rate(&setter, &totals(borrowed_lo, supply));
            let hi = borrow_rate(&setter, &totals(borrowed_hi, supply));
            prop_assert!(lo <= hi);
        }

        #[rstest]
        fn prop_supply_rate_never_exceeds_borrow_rate(
            borrowed in 1_u64..=2_000_000,
            supply in 1_u64..=1_000_000,
            coefficients in proptest::collection::vec(0_u8..=50, 1..=6),
        ) {
            let setter = InterestSetter::DoubleExponent {
                max_apr: BASE,
                coefficients,
            };
            let rates = interest_per_second(
                &setter,
                U256::from(EARNINGS_RATE),
                &totals(borrowed, supply),
            )
            .unwrap();
            prop_assert!(rates.supply_rate <= rates.borrow_rate);
        }
    }
}
