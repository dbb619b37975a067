use alloy::primitives::U256;
use thiserror::Error;

/// Canonical fixed-point precision: all internal price math is 18-decimal.
pub const WAD_DECIMALS: u8 = 18;

/// Arithmetic failure while scaling or multiplying fixed-point amounts.
///
/// Always a hard error — amounts never silently wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("arithmetic overflow in fixed-point math")]
pub struct Overflow;

/// `10^18`, the canonical scale factor.
pub fn wad() -> U256 {
    pow10(WAD_DECIMALS)
}

/// `10^n` as a U256. Decimal exponents in practice stay well below the
/// U256 ceiling (10^77), so a plain `pow` is fine here.
pub fn pow10(n: u8) -> U256 {
    U256::from(10u64).pow(U256::from(n))
}

/// Rescale `amount` from `from` decimals to `to` decimals.
///
/// Scaling up is overflow-checked; scaling down truncates toward zero.
/// The truncation is observable and intentional: a round trip through
/// fewer decimals loses up to `10^(from-to) - 1` units.
pub fn convert(amount: U256, from: u8, to: u8) -> Result<U256, Overflow> {
    if to >= from {
        amount.checked_mul(pow10(to - from)).ok_or(Overflow)
    } else {
        Ok(amount / pow10(from - to))
    }
}

/// Scale a raw token amount up to the canonical 18-decimal representation.
pub fn to_canonical(amount: U256, decimals: u8) -> Result<U256, Overflow> {
    convert(amount, decimals, WAD_DECIMALS)
}

/// Scale a canonical 18-decimal amount down to a token's native decimals.
pub fn from_canonical(amount: U256, decimals: u8) -> Result<U256, Overflow> {
    convert(amount, WAD_DECIMALS, decimals)
}

/// `a * b / denom` with an overflow-checked product and truncating division.
pub fn mul_div(a: U256, b: U256, denom: U256) -> Result<U256, Overflow> {
    if denom.is_zero() {
        return Err(Overflow);
    }
    Ok(a.checked_mul(b).ok_or(Overflow)? / denom)
}
