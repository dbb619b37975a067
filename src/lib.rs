//! Fleet Commander core: a capital allocator that spreads deposited funds
//! across yield adapters ("arks"), plus the Dutch auction engine used to
//! dispose of reward tokens.
//!
//! Two subsystems carry the weight here:
//!
//! - [`commander`] — the per-operation aggregation cache that computes
//!   fleet-wide and per-ark asset totals once per top-level operation, and
//!   the deposit/withdraw/rebalance entrypoints built on it.
//! - [`auction`] — time-decayed (linear or quadratic) auction pricing,
//!   per-auction fill bookkeeping, and the multi-auction registry with
//!   token custody.
//!
//! All amounts are `U256` in native token decimals; price math happens in
//! a canonical 18-decimal fixed point (see [`model::wad`]).

pub mod auction;
pub mod commander;
pub mod model;

pub use auction::{AuctionError, AuctionManager, AuctionParams, DecayType};
pub use commander::{Ark, BufferArk, CommanderError, FleetCommander, FleetConfig, RebalanceData};
pub use model::{Percentage, Token};
