//! Shared mock ark for cache and rebalance tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use alloy::primitives::U256;
use anyhow::{Result, bail};
use fleet_commander::Ark;

/// Call-count instrumentation, shared out of the ark so tests can keep
/// reading it after the ark moves into the commander.
#[derive(Debug, Default)]
pub struct CallCounters {
    pub total_assets: AtomicU64,
    pub withdrawable: AtomicU64,
    pub max_inflow: AtomicU64,
    pub max_outflow: AtomicU64,
}

impl CallCounters {
    pub fn total_assets_calls(&self) -> u64 {
        self.total_assets.load(Ordering::Relaxed)
    }

    pub fn withdrawable_calls(&self) -> u64 {
        self.withdrawable.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct MockArk {
    id: String,
    assets: U256,
    withdrawable: U256,
    max_inflow: U256,
    max_outflow: U256,
    pub counters: Arc<CallCounters>,
    pub fail_reads: Arc<AtomicBool>,
    pub fail_board: Arc<AtomicBool>,
}

impl MockArk {
    pub fn new(id: &str, assets: U256) -> Self {
        Self {
            id: id.to_string(),
            assets,
            withdrawable: assets,
            max_inflow: U256::MAX,
            max_outflow: U256::MAX,
            counters: Arc::new(CallCounters::default()),
            fail_reads: Arc::new(AtomicBool::new(false)),
            fail_board: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Simulate a position partially locked up protocol-side.
    pub fn with_withdrawable(mut self, withdrawable: U256) -> Self {
        self.withdrawable = withdrawable;
        self
    }

    pub fn with_flow_caps(mut self, max_inflow: U256, max_outflow: U256) -> Self {
        self.max_inflow = max_inflow;
        self.max_outflow = max_outflow;
        self
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::Relaxed) {
            bail!("mock ark `{}` read failure", self.id);
        }
        Ok(())
    }
}

impl Ark for MockArk {
    fn id(&self) -> &str {
        &self.id
    }

    fn total_assets(&self) -> Result<U256> {
        self.counters.total_assets.fetch_add(1, Ordering::Relaxed);
        self.check_reads()?;
        Ok(self.assets)
    }

    fn withdrawable_total_assets(&self) -> Result<U256> {
        self.counters.withdrawable.fetch_add(1, Ordering::Relaxed);
        self.check_reads()?;
        Ok(self.withdrawable)
    }

    fn max_rebalance_inflow(&self) -> Result<U256> {
        self.counters.max_inflow.fetch_add(1, Ordering::Relaxed);
        Ok(self.max_inflow)
    }

    fn max_rebalance_outflow(&self) -> Result<U256> {
        self.counters.max_outflow.fetch_add(1, Ordering::Relaxed);
        Ok(self.max_outflow)
    }

    fn board(&mut self, amount: U256, _data: &[u8]) -> Result<()> {
        if self.fail_board.load(Ordering::Relaxed) {
            bail!("mock ark `{}` deposit failure", self.id);
        }
        self.assets += amount;
        self.withdrawable += amount;
        Ok(())
    }

    fn disembark(&mut self, amount: U256, _data: &[u8]) -> Result<()> {
        if amount > self.withdrawable {
            bail!(
                "mock ark `{}` has {} withdrawable, {} requested",
                self.id,
                self.withdrawable,
                amount
            );
        }
        self.assets -= amount;
        self.withdrawable -= amount;
        Ok(())
    }
}

pub fn units(n: u64) -> U256 {
    U256::from(n)
}
