use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use super::wad::{self, Overflow};

/// WAD-scaled percentage: `10^18` represents 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(U256);

impl Percentage {
    pub const ZERO: Percentage = Percentage(U256::ZERO);

    /// 100% as a WAD fraction.
    pub fn one_hundred() -> Self {
        Percentage(wad::wad())
    }

    /// Build from whole percentage points (e.g. `from_percent(5)` = 5%).
    pub fn from_percent(points: u64) -> Self {
        Percentage(U256::from(points) * wad::wad() / U256::from(100u64))
    }

    /// Build from a raw WAD fraction (`10^18` = 100%).
    pub fn from_wad(fraction: U256) -> Self {
        Percentage(fraction)
    }

    pub fn as_wad(&self) -> U256 {
        self.0
    }

    /// Apply this percentage to an amount, truncating toward zero.
    pub fn of(&self, amount: U256) -> Result<U256, Overflow> {
        wad::mul_div(amount, self.0, wad::wad())
    }
}
