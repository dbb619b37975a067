pub mod ledger;
pub mod pricing;
pub mod state;

use std::collections::BTreeMap;

use alloy::primitives::U256;
use thiserror::Error;

use crate::model::wad;

pub use ledger::Ledger;
pub use pricing::DecayType;
pub use state::{Auction, AuctionConfig, AuctionParams, AuctionState};

/// Ledger account holding escrowed auction tokens and collected payments.
pub const ESCROW_ACCOUNT: &str = "auction-escrow";

#[derive(Debug, Error)]
pub enum AuctionError {
    #[error("auction duration must be non-zero")]
    InvalidDuration,

    #[error("start price must exceed end price, end price must be non-zero")]
    InvalidPrices,

    #[error("token amount must be non-zero")]
    InvalidTokenAmount,

    #[error("kicker reward percentage exceeds 100%")]
    InvalidKickerRewardPercentage,

    #[error("invalid auction token")]
    InvalidAuctionToken,

    #[error("invalid payment token")]
    InvalidPaymentToken,

    #[error("no auction with id {0}")]
    AuctionNotFound(u64),

    #[error("auction is expired or finalized")]
    AuctionNotActive,

    #[error("auction already finalized")]
    AuctionAlreadyFinalized,

    #[error("auction has not ended")]
    AuctionNotEnded,

    #[error("purchase exceeds remaining auction tokens")]
    InsufficientTokensAvailable,

    #[error("account `{account}` holds {available} {token}, needs {requested}")]
    InsufficientBalance {
        account: String,
        token: String,
        requested: U256,
        available: U256,
    },

    #[error(transparent)]
    Overflow(#[from] wad::Overflow),
}

/// Registry of independent Dutch auctions plus the token custody that goes
/// with them. Ids are sequential from 0; auctions share nothing but the
/// escrow account.
#[derive(Debug, Default)]
pub struct AuctionManager {
    auctions: BTreeMap<u64, Auction>,
    next_id: u64,
    ledger: Ledger,
}

impl AuctionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn auction(&self, id: u64) -> Option<&Auction> {
        self.auctions.get(&id)
    }

    /// Kick a new auction. Pulls `total_tokens` of the auction token from
    /// the kicker into escrow and immediately pays the kicker their reward
    /// cut out of it. Returns the new auction's id.
    pub fn create_auction(
        &mut self,
        params: &AuctionParams,
        kicker: &str,
        now: u64,
    ) -> Result<u64, AuctionError> {
        let id = self.next_id;
        let auction = Auction::create(id, params, now)?;

        let token = &params.auction_token.symbol;
        self.ledger
            .transfer(kicker, ESCROW_ACCOUNT, token, params.total_tokens)?;
        self.ledger.transfer(
            ESCROW_ACCOUNT,
            kicker,
            token,
            auction.config.kicker_reward_amount,
        )?;

        self.auctions.insert(id, auction);
        self.next_id += 1;
        Ok(id)
    }

    /// Buy `amount` auction tokens at the current spot price. The buyer
    /// pays into escrow, the tokens leave escrow, and the fill is recorded.
    /// Returns the cost in payment-token decimals.
    pub fn buy_tokens(
        &mut self,
        id: u64,
        buyer: &str,
        amount: U256,
        now: u64,
    ) -> Result<U256, AuctionError> {
        let auction = self
            .auctions
            .get_mut(&id)
            .ok_or(AuctionError::AuctionNotFound(id))?;

        // Quote first so custody only moves once the fill is known valid.
        let cost = auction.quote(amount, now)?;
        let payment = auction.config.payment_token.symbol.clone();
        let token = auction.config.auction_token.symbol.clone();

        self.ledger.transfer(buyer, ESCROW_ACCOUNT, &payment, cost)?;
        self.ledger.transfer(ESCROW_ACCOUNT, buyer, &token, amount)?;

        let auction = self.auctions.get_mut(&id).expect("looked up above");
        auction.buy(amount, now)
    }

    /// Finalize an expired (or sold-out) auction, sweeping unsold tokens
    /// to the configured recipient.
    pub fn finalize_auction(&mut self, id: u64, now: u64) -> Result<(), AuctionError> {
        let auction = self
            .auctions
            .get_mut(&id)
            .ok_or(AuctionError::AuctionNotFound(id))?;

        let unsold = auction.finalize(now)?;
        let token = auction.config.auction_token.symbol.clone();
        let recipient = auction.config.unsold_tokens_recipient.clone();
        self.ledger
            .transfer(ESCROW_ACCOUNT, &recipient, &token, unsold)
    }

    /// Spot price for an auction at `now`. Read-only.
    pub fn get_current_price(&self, id: u64, now: u64) -> Result<U256, AuctionError> {
        self.auctions
            .get(&id)
            .ok_or(AuctionError::AuctionNotFound(id))?
            .current_price(now)
    }
}
