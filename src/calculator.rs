//! Spot price from constant-product reserves
//!
//! price = (price_reserve / 10^price_decimals) / (target_reserve / 10^target_decimals)
//!
//! Reserves are uint112 on chain, far past what an f64 holds exactly, so the
//! ratio is formed with big integers and only the final quotient is rounded.

use alloy_primitives::U256;
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use thiserror::Error;

/// Bits kept in the integer quotient before rounding to f64
const QUOTIENT_BITS: u64 = 64;

/// One of the two reserves is zero, so there is no spot price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("pool has an empty reserve")]
pub struct EmptyPool;

/// Price of the target token expressed in the price token.
pub fn compute(
    reserve0: U256,
    reserve1: U256,
    target_decimals: u8,
    price_decimals: u8,
    target_is_token0: bool,
) -> Result<f64, EmptyPool> {
    let (target_reserve, price_reserve) = if target_is_token0 {
        (reserve0, reserve1)
    } else {
        (reserve1, reserve0)
    };

    if target_reserve.is_zero() || price_reserve.is_zero() {
        return Err(EmptyPool);
    }

    // Cross-multiply the two 10^decimals divisors to keep everything integral
    let numerator = to_big(price_reserve) * pow10(target_decimals);
    let denominator = to_big(target_reserve) * pow10(price_decimals);

    Ok(ratio_to_f64(&numerator, &denominator))
}

fn to_big(value: U256) -> BigUint {
    BigUint::from_bytes_be(&value.to_be_bytes::<32>())
}

fn pow10(decimals: u8) -> BigUint {
    BigUint::from(10u32).pow(decimals as u32)
}

/// `num / den` rounded to the nearest f64. Both must be non-zero.
fn ratio_to_f64(num: &BigUint, den: &BigUint) -> f64 {
    debug_assert!(!num.is_zero() && !den.is_zero());

    // Scale so the integer quotient carries QUOTIENT_BITS of precision
    let shift = QUOTIENT_BITS as i64 + den.bits() as i64 - num.bits() as i64;
    let (quotient, remainder) = if shift >= 0 {
        let scaled = num << shift as usize;
        (&scaled / den, &scaled % den)
    } else {
        let scaled = den << (-shift) as usize;
        (num / &scaled, num % &scaled)
    };

    // The quotient has 64+ bits, so its lowest bit sits well below the f64
    // rounding point. Setting it for a non-zero remainder keeps the single
    // rounding in to_f64 correct for values just past a halfway point.
    let quotient = if remainder.is_zero() {
        quotient
    } else {
        quotient | BigUint::one()
    };

    // A BigUint always converts to f64 (saturating to infinity when huge)
    let mantissa = quotient.to_f64().unwrap_or(f64::INFINITY);
    scale_pow2(mantissa, -shift)
}

/// x * 2^exp without overflowing the intermediate power
fn scale_pow2(mut x: f64, mut exp: i64) -> f64 {
    while exp > 0 {
        let step = exp.min(512);
        x *= 2f64.powi(step as i32);
        exp -= step;
    }
    while exp < 0 {
        let step = (-exp).min(512);
        x /= 2f64.powi(step as i32);
        exp += step;
    }
    x
}
