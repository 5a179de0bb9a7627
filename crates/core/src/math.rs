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

//! Full-precision 256-bit fixed-point arithmetic with explicit rounding modes.
//!
//! Every division in the Solera settlement engine rounds in a documented direction,
//! and the client must reproduce those results bit for bit. This module provides the
//! primitive operations the rest of the workspace builds on: `mul_div` with a 512-bit
//! intermediate product, plain division with rounding selection, and the shared
//! fixed-base constants.

use alloy_primitives::{U256, U512};
use thiserror::Error;

/// The number of fractional decimal digits in the fixed base.
pub const BASE_DECIMALS: u32 = 18;

/// The fixed base (`1e18`) all protocol rates and indices are scaled by.
pub const BASE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Seconds in a protocol year (365 days).
pub const SECONDS_IN_A_YEAR: U256 = U256::from_limbs([31_536_000, 0, 0, 0]);

/// Errors returned by fixed-point arithmetic operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MathError {
    /// The denominator of a division was zero.
    #[error("division by zero")]
    DivisionByZero,
    /// The result does not fit in 256 bits.
    #[error("arithmetic overflow: result does not fit in 256 bits")]
    Overflow,
}

/// The rounding mode applied to a division's remainder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Truncate toward zero.
    Down,
    /// Round away from zero whenever a remainder exists.
    Up,
    /// Round to nearest, ties away from zero.
    HalfUp,
}

/// Returns `10^exp` as a [`U256`].
///
/// # Errors
///
/// Returns an error if the power exceeds 256 bits (`exp > 77`).
pub fn pow10(exp: u32) -> Result<U256, MathError> {
    U256::from(10_u8)
        .checked_pow(U256::from(exp))
        .ok_or(MathError::Overflow)
}

/// Computes `a * b / denominator` at full 512-bit intermediate precision.
///
/// # Errors
///
/// Returns an error if `denominator` is zero or the rounded quotient exceeds 256 bits.
pub fn mul_div(a: U256, b: U256, denominator: U256, rounding: Rounding) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }

    let numerator: U512 = a.widening_mul(b);
    let denominator = U512::from(denominator);
    let (quotient, remainder) = numerator.div_rem(denominator);

    // remainder < denominator <= U256::MAX, so doubling cannot wrap 512 bits
    let bump = match rounding {
        Rounding::Down => false,
        Rounding::Up => !remainder.is_zero(),
        Rounding::HalfUp => remainder + remainder >= denominator,
    };
    let quotient = if bump {
        quotient + U512::from(1_u8)
    } else {
        quotient
    };

    if quotient > U512::from(U256::MAX) {
        return Err(MathError::Overflow);
    }
    Ok(quotient.to::<U256>())
}

/// Computes `a / b` with the given rounding mode.
///
/// # Errors
///
/// Returns an error if `b` is zero.
pub fn div(a: U256, b: U256, rounding: Rounding) -> Result<U256, MathError> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }

    let (quotient, remainder) = a.div_rem(b);
    let bump = match rounding {
        Rounding::Down => false,
        Rounding::Up => !remainder.is_zero(),
        // a wrapped doubling means 2 * remainder > U256::MAX >= b
        Rounding::HalfUp => remainder
            .checked_add(remainder)
            .is_none_or(|doubled| doubled >= b),
    };
    if bump {
        Ok(quotient + U256::from(1_u8))
    } else {
        Ok(quotient)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(7, 1, 2, Rounding::Down, 3)]
    #[case(7, 1, 2, Rounding::Up, 4)]
    #[case(7, 1, 2, Rounding::HalfUp, 4)]
    #[case(6, 1, 4, Rounding::Down, 1)]
    #[case(6, 1, 4, Rounding::Up, 2)]
    #[case(6, 1, 4, Rounding::HalfUp, 2)]
    #[case(5, 1, 4, Rounding::Down, 1)]
    #[case(5, 1, 4, Rounding::Up, 2)]
    #[case(5, 1, 4, Rounding::HalfUp, 1)]
    #[case(8, 1, 2, Rounding::Down, 4)]
    #[case(8, 1, 2, Rounding::Up, 4)]
    #[case(8, 1, 2, Rounding::HalfUp, 4)]
    fn test_mul_div_rounding(
        #[case] a: u64,
        #[case] b: u64,
        #[case] denominator: u64,
        #[case] rounding: Rounding,
        #[case] expected: u64,
    ) {
        let result = mul_div(
            U256::from(a),
            U256::from(b),
            U256::from(denominator),
            rounding,
        )
        .unwrap();
        assert_eq!(result, U256::from(expected));
    }

    #[rstest]
    fn test_mul_div_full_width_intermediate() {
        // MAX * MAX / MAX == MAX must not overflow the intermediate product
        let result = mul_div(U256::MAX, U256::MAX, U256::MAX, Rounding::Down).unwrap();
        assert_eq!(result, U256::MAX);
    }

    #[rstest]
    fn test_mul_div_overflow() {
        let result = mul_div(U256::MAX, U256::from(2_u8), U256::from(1_u8), Rounding::Down);
        assert_eq!(result, Err(MathError::Overflow));
    }

    #[rstest]
    fn test_mul_div_division_by_zero() {
        let result = mul_div(U256::from(1_u8), U256::from(1_u8), U256::ZERO, Rounding::Down);
        assert_eq!(result, Err(MathError::DivisionByZero));
    }

    #[rstest]
    #[case(9, 2, Rounding::Down, 4)]
    #[case(9, 2, Rounding::Up, 5)]
    #[case(9, 2, Rounding::HalfUp, 5)]
    #[case(9, 4, Rounding::HalfUp, 2)]
    #[case(11, 4, Rounding::HalfUp, 3)]
    fn test_div_rounding(
        #[case] a: u64,
        #[case] b: u64,
        #[case] rounding: Rounding,
        #[case] expected: u64,
    ) {
        let result = div(U256::from(a), U256::from(b), rounding).unwrap();
        assert_eq!(result, U256::from(expected));
    }

    #[rstest]
    fn test_div_by_zero() {
        assert_eq!(
            div(U256::from(1_u8), U256::ZERO, Rounding::Down),
            Err(MathError::DivisionByZero)
        );
    }

    #[rstest]
    fn test_pow10_base() {
        assert_eq!(pow10(BASE_DECIMALS).unwrap(), BASE);
        assert_eq!(pow10(0).unwrap(), U256::from(1_u8));
    }

    #[rstest]
    fn test_pow10_overflow() {
        assert!(pow10(77).is_ok());
        assert_eq!(pow10(78), Err(MathError::Overflow));
    }

    #[rstest]
    fn test_base_constants_consistent() {
        assert_eq!(BASE, U256::from(10_u64).pow(U256::from(BASE_DECIMALS)));
        assert_eq!(SECONDS_IN_A_YEAR, U256::from(31_536_000_u64));
    }
}
