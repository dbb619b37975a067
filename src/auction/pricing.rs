use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::model::wad::Overflow;

use super::AuctionError;

/// Shape of the price decline over an auction's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayType {
    /// Straight line from start price to end price.
    Linear,
    /// Power-2 convex curve: a steep initial descent that flattens out as
    /// the price approaches the floor. Not exponential (e^x) decay.
    Quadratic,
}

/// Spot price of a decaying auction at time `now`.
///
/// `now` is unconstrained: before `start_time` it is treated as
/// `start_time`, at or after `end_time` the price is exactly `end_price`.
/// Assumes `start_time < end_time` and `end_price < start_price`, which
/// auction creation validates.
pub fn current_price(
    start_price: U256,
    end_price: U256,
    start_time: u64,
    end_time: u64,
    now: u64,
    decay: DecayType,
) -> Result<U256, AuctionError> {
    let duration = end_time - start_time;
    let elapsed = now.saturating_sub(start_time).min(duration);
    if elapsed >= duration {
        return Ok(end_price);
    }

    let range = start_price - end_price;
    let duration = U256::from(duration);
    let elapsed = U256::from(elapsed);

    let price = match decay {
        DecayType::Linear => {
            let drop = range.checked_mul(elapsed).ok_or(Overflow)? / duration;
            start_price - drop
        }
        DecayType::Quadratic => {
            // end + range * (duration - elapsed)^2 / duration^2
            let remaining = duration - elapsed;
            let num = remaining
                .checked_mul(remaining)
                .and_then(|sq| sq.checked_mul(range))
                .ok_or(Overflow)?;
            let denom = duration.checked_mul(duration).ok_or(Overflow)?;
            end_price + num / denom
        }
    };

    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 86_400;

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
    }

    fn price_at(elapsed: u64, decay: DecayType) -> U256 {
        current_price(ether(100), ether(50), 1_000, 1_000 + DAY, 1_000 + elapsed, decay).unwrap()
    }

    #[test]
    fn both_curves_hit_the_endpoints_exactly() {
        for decay in [DecayType::Linear, DecayType::Quadratic] {
            assert_eq!(price_at(0, decay), ether(100));
            assert_eq!(price_at(DAY, decay), ether(50));
            assert_eq!(price_at(DAY + 999, decay), ether(50));
        }
    }

    #[test]
    fn before_start_clamps_to_start_price() {
        for decay in [DecayType::Linear, DecayType::Quadratic] {
            let p = current_price(ether(100), ether(50), 1_000, 1_000 + DAY, 0, decay).unwrap();
            assert_eq!(p, ether(100));
        }
    }

    #[test]
    fn linear_midpoint() {
        assert_eq!(price_at(DAY / 2, DecayType::Linear), ether(75));
    }

    #[test]
    fn quadratic_midpoint() {
        // end + range * (d/2)^2 / d^2 = 50 + 50 * 0.25 = 62.5 ether
        assert_eq!(
            price_at(DAY / 2, DecayType::Quadratic),
            ether(50) + ether(25) / U256::from(2u64)
        );
    }

    #[test]
    fn quadratic_drops_below_linear_early() {
        let early = DAY / 10;
        assert!(price_at(early, DecayType::Quadratic) < price_at(early, DecayType::Linear));
    }
}
