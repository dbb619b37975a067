use std::collections::HashMap;

use alloy::primitives::U256;
use anyhow::{Context, Result};

use crate::model::wad::Overflow;

use super::CommanderError;
use super::ark::Ark;

/// One ark's reported balance inside a cached breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArkBalance {
    pub ark_id: String,
    pub assets: U256,
}

#[derive(Debug, Clone)]
struct FlowLimits {
    max_inflow: U256,
    max_outflow: U256,
    inflow_used: U256,
    outflow_used: U256,
}

/// Aggregation cache scoped to one top-level operation.
///
/// Populated lazily on first read, so repeated queries within one
/// operation hit every ark exactly once. `flush` resets everything; the
/// commander flushes around every mutating entrypoint so no breakdown
/// computed under one operation leaks into the next.
#[derive(Debug, Default)]
pub struct OpCache {
    total_assets: Option<U256>,
    withdrawable_total_assets: Option<U256>,
    all_arks: Vec<ArkBalance>,
    withdrawable_arks: Vec<ArkBalance>,
    flow_limits: HashMap<String, FlowLimits>,
}

impl OpCache {
    /// Drop all cached data. Cheap; the next read repopulates.
    pub fn flush(&mut self) {
        *self = Self::default();
    }

    /// Sum of every ark's `total_assets`, buffer included (always last in
    /// the breakdown). Cached after the first call.
    pub fn total_assets(&mut self, arks: &[Box<dyn Ark>], buffer: &dyn Ark) -> Result<U256> {
        if let Some(total) = self.total_assets {
            return Ok(total);
        }

        let mut breakdown = Vec::with_capacity(arks.len() + 1);
        let mut total = U256::ZERO;
        for ark in arks.iter().map(|a| a.as_ref()).chain([buffer]) {
            let assets = ark
                .total_assets()
                .with_context(|| format!("ark `{}` totalAssets failed", ark.id()))?;
            total = total.checked_add(assets).ok_or(Overflow)?;
            breakdown.push(ArkBalance {
                ark_id: ark.id().to_string(),
                assets,
            });
        }

        self.all_arks = breakdown;
        self.total_assets = Some(total);
        Ok(total)
    }

    /// Sum of every ark's immediately withdrawable assets. Builds on the
    /// full breakdown (populating it if needed), keeps only arks with a
    /// positive withdrawable balance, and sorts them ascending so that
    /// withdrawal logic drains the smallest positions first.
    pub fn withdrawable_total_assets(
        &mut self,
        arks: &[Box<dyn Ark>],
        buffer: &dyn Ark,
    ) -> Result<U256> {
        if let Some(total) = self.withdrawable_total_assets {
            return Ok(total);
        }

        // The full breakdown defines the ark set for this operation.
        self.total_assets(arks, buffer)?;

        let mut breakdown = Vec::with_capacity(self.all_arks.len());
        let mut total = U256::ZERO;
        for entry in &self.all_arks {
            let ark = find_ark(arks, buffer, &entry.ark_id)?;
            let assets = ark
                .withdrawable_total_assets()
                .with_context(|| format!("ark `{}` withdrawableTotalAssets failed", ark.id()))?;
            if assets.is_zero() {
                continue;
            }
            total = total.checked_add(assets).ok_or(Overflow)?;
            breakdown.push(ArkBalance {
                ark_id: entry.ark_id.clone(),
                assets,
            });
        }
        breakdown.sort_by(|a, b| a.assets.cmp(&b.assets));

        self.withdrawable_arks = breakdown;
        self.withdrawable_total_assets = Some(total);
        Ok(total)
    }

    /// Per-ark balances backing the cached `total_assets`, buffer last.
    /// Empty until `total_assets` has run.
    pub fn all_ark_balances(&self) -> &[ArkBalance] {
        &self.all_arks
    }

    /// Withdrawable balances sorted ascending. Empty until
    /// `withdrawable_total_assets` has run.
    pub fn withdrawable_ark_balances(&self) -> &[ArkBalance] {
        &self.withdrawable_arks
    }

    /// Record assets flowing into `ark` during a rebalance. The ark's
    /// inflow cap is queried once per operation; the running total across
    /// all steps of the operation may not exceed it.
    pub fn register_inflow(&mut self, ark: &dyn Ark, amount: U256) -> Result<()> {
        let limits = self.flow_limits_for(ark)?;
        let used = limits.inflow_used.checked_add(amount).ok_or(Overflow)?;
        if used > limits.max_inflow {
            return Err(CommanderError::ExceedsMaxInflow {
                ark_id: ark.id().to_string(),
                requested: used,
                max: limits.max_inflow,
            }
            .into());
        }
        limits.inflow_used = used;
        Ok(())
    }

    /// Record assets flowing out of `ark` during a rebalance, bounded by
    /// its outflow cap the same way.
    pub fn register_outflow(&mut self, ark: &dyn Ark, amount: U256) -> Result<()> {
        let limits = self.flow_limits_for(ark)?;
        let used = limits.outflow_used.checked_add(amount).ok_or(Overflow)?;
        if used > limits.max_outflow {
            return Err(CommanderError::ExceedsMaxOutflow {
                ark_id: ark.id().to_string(),
                requested: used,
                max: limits.max_outflow,
            }
            .into());
        }
        limits.outflow_used = used;
        Ok(())
    }

    fn flow_limits_for(&mut self, ark: &dyn Ark) -> Result<&mut FlowLimits> {
        if !self.flow_limits.contains_key(ark.id()) {
            let limits = FlowLimits {
                max_inflow: ark
                    .max_rebalance_inflow()
                    .with_context(|| format!("ark `{}` maxRebalanceInflow failed", ark.id()))?,
                max_outflow: ark
                    .max_rebalance_outflow()
                    .with_context(|| format!("ark `{}` maxRebalanceOutflow failed", ark.id()))?,
                inflow_used: U256::ZERO,
                outflow_used: U256::ZERO,
            };
            self.flow_limits.insert(ark.id().to_string(), limits);
        }
        Ok(self.flow_limits.get_mut(ark.id()).expect("inserted above"))
    }
}

pub(crate) fn find_ark<'a>(
    arks: &'a [Box<dyn Ark>],
    buffer: &'a dyn Ark,
    id: &str,
) -> Result<&'a dyn Ark> {
    if buffer.id() == id {
        return Ok(buffer);
    }
    arks.iter()
        .map(|a| a.as_ref())
        .find(|a| a.id() == id)
        .ok_or_else(|| {
            CommanderError::UnknownArk {
                ark_id: id.to_string(),
            }
            .into()
        })
}
