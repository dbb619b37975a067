use serde::{Deserialize, Serialize};

/// Handle to a fungible token: a ledger symbol plus its native decimal
/// precision. The auction engine never inspects token internals beyond this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
    pub decimals: u8,
}

impl Token {
    pub fn new(symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
        }
    }

    /// A token handle is usable only if it names something.
    pub fn is_valid(&self) -> bool {
        !self.symbol.is_empty()
    }
}
