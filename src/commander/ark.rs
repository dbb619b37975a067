use alloy::primitives::U256;
use anyhow::{Result, bail};

/// Capability interface every yield adapter ("ark") exposes.
///
/// The commander depends only on this surface and never on a concrete
/// adapter type. Read methods must not fail under normal conditions, but
/// whatever failure an adapter does raise aborts the whole enclosing
/// operation — the aggregation layer neither retries nor swallows it.
pub trait Ark: Send + std::fmt::Debug {
    fn id(&self) -> &str;

    /// Assets this ark manages, in the fleet asset's native decimals.
    fn total_assets(&self) -> Result<U256>;

    /// The portion of `total_assets` withdrawable right now, with no
    /// protocol-side delay, lockup or pause in the way.
    fn withdrawable_total_assets(&self) -> Result<U256>;

    /// Cap on assets this ark will accept within one rebalance operation.
    fn max_rebalance_inflow(&self) -> Result<U256>;

    /// Cap on assets this ark will release within one rebalance operation.
    fn max_rebalance_outflow(&self) -> Result<U256>;

    /// Deposit assets into the wrapped protocol. `data` carries adapter
    /// specific auxiliary bytes and is opaque to the commander.
    fn board(&mut self, amount: U256, data: &[u8]) -> Result<()>;

    /// Withdraw assets from the wrapped protocol.
    fn disembark(&mut self, amount: U256, data: &[u8]) -> Result<()>;
}

/// The always-present ark holding idle, undeployed funds.
///
/// No external protocol behind it: everything is withdrawable and flow
/// caps do not apply.
#[derive(Debug)]
pub struct BufferArk {
    id: String,
    balance: U256,
}

impl BufferArk {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            balance: U256::ZERO,
        }
    }
}

impl Ark for BufferArk {
    fn id(&self) -> &str {
        &self.id
    }

    fn total_assets(&self) -> Result<U256> {
        Ok(self.balance)
    }

    fn withdrawable_total_assets(&self) -> Result<U256> {
        Ok(self.balance)
    }

    fn max_rebalance_inflow(&self) -> Result<U256> {
        Ok(U256::MAX)
    }

    fn max_rebalance_outflow(&self) -> Result<U256> {
        Ok(U256::MAX)
    }

    fn board(&mut self, amount: U256, _data: &[u8]) -> Result<()> {
        self.balance = match self.balance.checked_add(amount) {
            Some(b) => b,
            None => bail!("buffer balance overflow"),
        };
        Ok(())
    }

    fn disembark(&mut self, amount: U256, _data: &[u8]) -> Result<()> {
        if amount > self.balance {
            bail!(
                "buffer holds {} but {} was requested",
                self.balance,
                amount
            );
        }
        self.balance -= amount;
        Ok(())
    }
}
