use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::model::wad;
use crate::model::{Percentage, Token};

use super::AuctionError;
use super::pricing::{self, DecayType};

/// Caller-supplied auction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionParams {
    pub auction_token: Token,
    pub payment_token: Token,
    /// Seconds from kick to expiry.
    pub duration: u64,
    /// Canonical 18-decimal price per whole auction token, at kick time.
    pub start_price: U256,
    /// Floor price, reached at expiry. Must be below `start_price`.
    pub end_price: U256,
    /// Tokens put up for sale, in the auction token's native decimals.
    /// The kicker reward is carved out of this before escrow.
    pub total_tokens: U256,
    pub kicker_reward_percentage: Percentage,
    pub unsold_tokens_recipient: String,
    pub decay_type: DecayType,
}

/// Immutable once the auction is kicked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionConfig {
    pub id: u64,
    pub auction_token: Token,
    pub payment_token: Token,
    pub start_price: U256,
    pub end_price: U256,
    /// Tokens actually up for sale, after the kicker reward deduction.
    pub total_tokens: U256,
    pub kicker_reward_amount: U256,
    pub unsold_tokens_recipient: String,
    pub start_time: u64,
    pub end_time: u64,
    pub decay_type: DecayType,
}

/// The only mutable auction data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionState {
    pub remaining_tokens: U256,
    pub is_finalized: bool,
}

/// One auction: config plus fill bookkeeping.
///
/// States are `Active` and `Finalized`; a sell-out during `buy` and an
/// explicit post-expiry `finalize` both land in `Finalized`, and there is
/// no way back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    pub config: AuctionConfig,
    pub state: AuctionState,
}

impl Auction {
    /// Validate params and build the auction, kicked at `now`.
    ///
    /// Returns the auction together with the kicker reward amount the
    /// caller owes the kicker immediately.
    pub fn create(id: u64, params: &AuctionParams, now: u64) -> Result<Auction, AuctionError> {
        if params.duration == 0 {
            return Err(AuctionError::InvalidDuration);
        }
        if params.end_price.is_zero() || params.start_price <= params.end_price {
            return Err(AuctionError::InvalidPrices);
        }
        if params.total_tokens.is_zero() {
            return Err(AuctionError::InvalidTokenAmount);
        }
        if params.kicker_reward_percentage > Percentage::one_hundred() {
            return Err(AuctionError::InvalidKickerRewardPercentage);
        }
        if !params.auction_token.is_valid() {
            return Err(AuctionError::InvalidAuctionToken);
        }
        if !params.payment_token.is_valid() {
            return Err(AuctionError::InvalidPaymentToken);
        }

        let end_time = now
            .checked_add(params.duration)
            .ok_or(AuctionError::InvalidDuration)?;
        let kicker_reward_amount = params.kicker_reward_percentage.of(params.total_tokens)?;
        let for_sale = params.total_tokens - kicker_reward_amount;

        Ok(Auction {
            config: AuctionConfig {
                id,
                auction_token: params.auction_token.clone(),
                payment_token: params.payment_token.clone(),
                start_price: params.start_price,
                end_price: params.end_price,
                total_tokens: for_sale,
                kicker_reward_amount,
                unsold_tokens_recipient: params.unsold_tokens_recipient.clone(),
                start_time: now,
                end_time,
                decay_type: params.decay_type,
            },
            state: AuctionState {
                remaining_tokens: for_sale,
                is_finalized: false,
            },
        })
    }

    /// Spot price at `now`. Read-only; past expiry this is the end price.
    pub fn current_price(&self, now: u64) -> Result<U256, AuctionError> {
        pricing::current_price(
            self.config.start_price,
            self.config.end_price,
            self.config.start_time,
            self.config.end_time,
            now,
            self.config.decay_type,
        )
    }

    /// Validate a purchase and compute its cost without mutating state.
    ///
    /// Cost is `price * amount / scale`, normalized from the canonical
    /// representation into the payment token's native decimals.
    pub fn quote(&self, amount: U256, now: u64) -> Result<U256, AuctionError> {
        if self.state.is_finalized {
            return Err(AuctionError::AuctionAlreadyFinalized);
        }
        if now >= self.config.end_time {
            return Err(AuctionError::AuctionNotActive);
        }
        if amount.is_zero() {
            return Err(AuctionError::InvalidTokenAmount);
        }
        if amount > self.state.remaining_tokens {
            return Err(AuctionError::InsufficientTokensAvailable);
        }

        let price = self.current_price(now)?;
        let amount_canonical = wad::to_canonical(amount, self.config.auction_token.decimals)?;
        let cost_canonical = wad::mul_div(price, amount_canonical, wad::wad())?;
        let cost = wad::from_canonical(cost_canonical, self.config.payment_token.decimals)?;
        Ok(cost)
    }

    /// Fill `amount` tokens at the spot price, returning the cost in
    /// payment-token decimals. Selling out finalizes the auction in place.
    pub fn buy(&mut self, amount: U256, now: u64) -> Result<U256, AuctionError> {
        let cost = self.quote(amount, now)?;
        self.state.remaining_tokens -= amount;
        if self.state.remaining_tokens.is_zero() {
            self.state.is_finalized = true;
        }
        Ok(cost)
    }

    /// Close out after expiry (or after a sell-out left nothing to sweep).
    /// Returns the unsold remainder owed to `unsold_tokens_recipient`.
    pub fn finalize(&mut self, now: u64) -> Result<U256, AuctionError> {
        if self.state.is_finalized {
            return Err(AuctionError::AuctionAlreadyFinalized);
        }
        if now < self.config.end_time && !self.state.remaining_tokens.is_zero() {
            return Err(AuctionError::AuctionNotEnded);
        }
        let unsold = self.state.remaining_tokens;
        self.state.remaining_tokens = U256::ZERO;
        self.state.is_finalized = true;
        Ok(unsold)
    }
}
