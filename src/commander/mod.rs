pub mod ark;
pub mod cache;

use alloy::primitives::U256;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ark::{Ark, BufferArk};
pub use cache::{ArkBalance, OpCache};

/// One step of a rebalance: move `amount` from one ark to another.
/// `U256::MAX` means "everything the source ark currently reports".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceData {
    pub from_ark: String,
    pub to_ark: String,
    pub amount: U256,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommanderError {
    #[error("no ark with id `{ark_id}`")]
    UnknownArk { ark_id: String },

    #[error("ark `{ark_id}` already registered")]
    DuplicateArk { ark_id: String },

    #[error("ark `{ark_id}` still holds assets")]
    ArkNotEmpty { ark_id: String },

    #[error("rebalance from ark `{ark_id}` to itself")]
    RebalanceToSelf { ark_id: String },

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("rebalance has no operations")]
    NoRebalanceOperations,

    #[error("rebalance has {count} operations, max is {max}")]
    TooManyRebalanceOperations { count: usize, max: usize },

    #[error("rebalance cooldown: {remaining_secs}s remaining")]
    RebalanceCooldown { remaining_secs: u64 },

    #[error("withdrawal of {requested} exceeds withdrawable assets {available}")]
    InsufficientWithdrawableAssets { requested: U256, available: U256 },

    #[error("inflow of {requested} into ark `{ark_id}` exceeds cap {max}")]
    ExceedsMaxInflow {
        ark_id: String,
        requested: U256,
        max: U256,
    },

    #[error("outflow of {requested} from ark `{ark_id}` exceeds cap {max}")]
    ExceedsMaxOutflow {
        ark_id: String,
        requested: U256,
        max: U256,
    },
}

/// Commander tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Minimum seconds between rebalance operations. 0 disables.
    pub rebalance_cooldown_secs: u64,
    /// Upper bound on steps per rebalance call.
    pub max_rebalance_operations: usize,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            rebalance_cooldown_secs: 0,
            max_rebalance_operations: 50,
        }
    }
}

/// Capital allocator over a dynamic set of arks plus the always-present
/// buffer ark holding idle funds.
///
/// Every mutating entrypoint flushes the aggregation cache on entry and
/// exit. In a single-threaded host there is no reentrancy to defend
/// against mid-operation, so once per boundary is enough; the exit flush
/// keeps later read-only queries from serving totals staled by the
/// mutation.
pub struct FleetCommander {
    arks: Vec<Box<dyn Ark>>,
    buffer: Box<dyn Ark>,
    cache: OpCache,
    config: FleetConfig,
    last_rebalance: Option<u64>,
}

impl FleetCommander {
    pub fn new(buffer: Box<dyn Ark>, arks: Vec<Box<dyn Ark>>, config: FleetConfig) -> Self {
        Self {
            arks,
            buffer,
            cache: OpCache::default(),
            config,
            last_rebalance: None,
        }
    }

    // ── Ark set management ──────────────────────────────────────────

    /// Look up an ark (buffer included) by id.
    pub fn ark(&self, id: &str) -> Option<&dyn Ark> {
        if self.buffer.id() == id {
            return Some(self.buffer.as_ref());
        }
        self.arks.iter().map(|a| a.as_ref()).find(|a| a.id() == id)
    }

    pub fn ark_ids(&self) -> Vec<String> {
        self.arks.iter().map(|a| a.id().to_string()).collect()
    }

    pub fn add_ark(&mut self, ark: Box<dyn Ark>) -> Result<()> {
        if self.ark(ark.id()).is_some() {
            return Err(CommanderError::DuplicateArk {
                ark_id: ark.id().to_string(),
            }
            .into());
        }
        self.cache.flush();
        self.arks.push(ark);
        Ok(())
    }

    /// Remove an ark. Only an emptied ark can leave the fleet.
    pub fn remove_ark(&mut self, id: &str) -> Result<Box<dyn Ark>> {
        let idx = self
            .arks
            .iter()
            .position(|a| a.id() == id)
            .ok_or_else(|| CommanderError::UnknownArk {
                ark_id: id.to_string(),
            })?;
        if !self.arks[idx].total_assets()?.is_zero() {
            return Err(CommanderError::ArkNotEmpty {
                ark_id: id.to_string(),
            }
            .into());
        }
        self.cache.flush();
        Ok(self.arks.remove(idx))
    }

    // ── Aggregate views (read-through-cache) ────────────────────────

    /// Total assets under management across every ark plus the buffer.
    pub fn total_assets(&mut self) -> Result<U256> {
        self.cache.total_assets(&self.arks, self.buffer.as_ref())
    }

    /// Assets withdrawable right now across the fleet.
    pub fn withdrawable_total_assets(&mut self) -> Result<U256> {
        self.cache
            .withdrawable_total_assets(&self.arks, self.buffer.as_ref())
    }

    /// Per-ark balances behind `total_assets`, buffer last. Populates the
    /// cache if this operation has not read it yet.
    pub fn ark_balances(&mut self) -> Result<Vec<ArkBalance>> {
        self.cache.total_assets(&self.arks, self.buffer.as_ref())?;
        Ok(self.cache.all_ark_balances().to_vec())
    }

    /// Withdrawable positions sorted ascending — the order withdrawals
    /// drain them in.
    pub fn withdrawal_queue(&mut self) -> Result<Vec<ArkBalance>> {
        self.cache
            .withdrawable_total_assets(&self.arks, self.buffer.as_ref())?;
        Ok(self.cache.withdrawable_ark_balances().to_vec())
    }

    /// Drop every cached total and breakdown. Mutating entrypoints do
    /// this themselves; hosts batching several logical operations into
    /// one call sequence can force a fresh snapshot here.
    pub fn flush_cache(&mut self) {
        self.cache.flush();
    }

    // ── Mutating entrypoints ────────────────────────────────────────

    /// Accept a deposit. New funds land in the buffer ark undeployed;
    /// a later rebalance puts them to work.
    pub fn deposit(&mut self, amount: U256) -> Result<()> {
        if amount.is_zero() {
            return Err(CommanderError::ZeroAmount.into());
        }
        self.cache.flush();
        let result = self.buffer.board(amount, &[]).context("buffer deposit failed");
        self.cache.flush();
        result
    }

    /// Serve a withdrawal, draining the smallest withdrawable positions
    /// first to minimize the impact on any single protocol.
    pub fn withdraw(&mut self, amount: U256) -> Result<()> {
        if amount.is_zero() {
            return Err(CommanderError::ZeroAmount.into());
        }
        self.cache.flush();
        let result = self.withdraw_inner(amount);
        self.cache.flush();
        result
    }

    fn withdraw_inner(&mut self, amount: U256) -> Result<()> {
        let available = self
            .cache
            .withdrawable_total_assets(&self.arks, self.buffer.as_ref())?;
        if amount > available {
            return Err(CommanderError::InsufficientWithdrawableAssets {
                requested: amount,
                available,
            }
            .into());
        }

        let plan: Vec<ArkBalance> = self.cache.withdrawable_ark_balances().to_vec();
        let buffer_id = self.buffer.id().to_string();
        let mut remaining = amount;

        // Idle buffer funds go first; protocol positions are only touched
        // for whatever the buffer cannot cover.
        if let Some(entry) = plan.iter().find(|b| b.ark_id == buffer_id) {
            let take = remaining.min(entry.assets);
            if !take.is_zero() {
                self.buffer
                    .disembark(take, &[])
                    .context("withdrawing from the buffer")?;
                remaining -= take;
            }
        }

        for entry in plan.iter().filter(|b| b.ark_id != buffer_id) {
            if remaining.is_zero() {
                break;
            }
            let take = remaining.min(entry.assets);
            self.ark_mut(&entry.ark_id)?
                .disembark(take, &[])
                .with_context(|| format!("withdrawing from ark `{}`", entry.ark_id))?;
            remaining -= take;
        }
        Ok(())
    }

    /// Shift capital between arks. Each step is bounded by the source
    /// ark's outflow cap and the target ark's inflow cap, accumulated
    /// across all steps of this one operation.
    pub fn rebalance(&mut self, ops: &[RebalanceData], now: u64) -> Result<()> {
        if ops.is_empty() {
            return Err(CommanderError::NoRebalanceOperations.into());
        }
        if ops.len() > self.config.max_rebalance_operations {
            return Err(CommanderError::TooManyRebalanceOperations {
                count: ops.len(),
                max: self.config.max_rebalance_operations,
            }
            .into());
        }
        if let Some(last) = self.last_rebalance {
            let ready_at = last.saturating_add(self.config.rebalance_cooldown_secs);
            if now < ready_at {
                return Err(CommanderError::RebalanceCooldown {
                    remaining_secs: ready_at - now,
                }
                .into());
            }
        }

        self.cache.flush();
        let result = self.rebalance_inner(ops);
        self.cache.flush();
        if result.is_ok() {
            self.last_rebalance = Some(now);
        }
        result
    }

    fn rebalance_inner(&mut self, ops: &[RebalanceData]) -> Result<()> {
        // Plan phase: resolve amounts and run every validation — ark
        // lookups, self-moves, flow caps — before a single asset moves.
        // A rejected operation leaves the fleet untouched.
        let mut plan = Vec::with_capacity(ops.len());
        for op in ops {
            if op.from_ark == op.to_ark {
                return Err(CommanderError::RebalanceToSelf {
                    ark_id: op.from_ark.clone(),
                }
                .into());
            }

            // uint256::MAX convention: move everything the source reports.
            let amount = if op.amount == U256::MAX {
                self.ark_ref(&op.from_ark)?.total_assets()?
            } else {
                op.amount
            };
            if amount.is_zero() {
                return Err(CommanderError::ZeroAmount.into());
            }

            let from = cache::find_ark(&self.arks, self.buffer.as_ref(), &op.from_ark)?;
            self.cache.register_outflow(from, amount)?;
            let to = cache::find_ark(&self.arks, self.buffer.as_ref(), &op.to_ark)?;
            self.cache.register_inflow(to, amount)?;

            plan.push((op.from_ark.clone(), op.to_ark.clone(), amount));
        }

        // Execute phase. An adapter failure here aborts the remainder
        // with earlier steps applied; see DESIGN.md for the host-level
        // atomicity contract.
        for (from_ark, to_ark, amount) in plan {
            self.ark_mut(&from_ark)?
                .disembark(amount, &[])
                .with_context(|| format!("rebalance out of ark `{from_ark}`"))?;
            self.ark_mut(&to_ark)?
                .board(amount, &[])
                .with_context(|| format!("rebalance into ark `{to_ark}`"))?;

            eprintln!("[fleet] rebalance {from_ark} -> {to_ark}: {amount}");
        }
        Ok(())
    }

    // ── Helpers ─────────────────────────────────────────────────────

    fn ark_ref(&self, id: &str) -> Result<&dyn Ark> {
        self.ark(id).ok_or_else(|| {
            CommanderError::UnknownArk {
                ark_id: id.to_string(),
            }
            .into()
        })
    }

    fn ark_mut(&mut self, id: &str) -> Result<&mut (dyn Ark + 'static)> {
        if self.buffer.id() == id {
            return Ok(&mut *self.buffer);
        }
        self.arks
            .iter_mut()
            .find(|a| a.id() == id)
            .map(|a| &mut **a)
            .ok_or_else(|| {
                CommanderError::UnknownArk {
                    ark_id: id.to_string(),
                }
                .into()
            })
    }
}
