use std::collections::HashMap;

use alloy::primitives::U256;

use super::AuctionError;

/// Per-account token balance tracking. Stands in for on-ledger custody:
/// escrow, kicker payouts and buyer payments all move through here.
#[derive(Debug, Default)]
pub struct Ledger {
    inner: HashMap<String, HashMap<String, U256>>,
}

impl Ledger {
    pub fn balance_of(&self, account: &str, token: &str) -> U256 {
        self.inner
            .get(account)
            .and_then(|m| m.get(token))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// Credit an account out of thin air. Supply bootstrap for hosts and
    /// tests; real deployments feed deposits in through this as well.
    pub fn mint(&mut self, account: &str, token: &str, amount: U256) -> Result<(), AuctionError> {
        let entry = self
            .inner
            .entry(account.to_string())
            .or_default()
            .entry(token.to_string())
            .or_insert(U256::ZERO);
        *entry = entry
            .checked_add(amount)
            .ok_or(crate::model::wad::Overflow)?;
        Ok(())
    }

    /// Move `amount` of `token` between accounts. Fails closed on an
    /// insufficient source balance; zero-amount moves are a no-op.
    pub fn transfer(
        &mut self,
        from: &str,
        to: &str,
        token: &str,
        amount: U256,
    ) -> Result<(), AuctionError> {
        if amount.is_zero() {
            return Ok(());
        }
        match self.inner.get_mut(from).and_then(|m| m.get_mut(token)) {
            Some(balance) if *balance >= amount => *balance -= amount,
            other => {
                let available = other.map(|b| *b).unwrap_or(U256::ZERO);
                return Err(AuctionError::InsufficientBalance {
                    account: from.to_string(),
                    token: token.to_string(),
                    requested: amount,
                    available,
                });
            }
        }
        self.mint(to, token, amount)
    }
}
