use std::fmt;

use serde::Serialize;
use tabled::Tabled;

use crate::Shares;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Buy,
    Sell,
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementKind::Buy => f.write_str("buy"),
            MovementKind::Sell => f.write_str("sell"),
        }
    }
}

/// A share trade suggested by [`crate::Portfolio::rebalance`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Tabled)]
pub struct Movement {
    #[tabled(rename = "Symbol")]
    pub symbol: String,
    #[tabled(rename = "Shares")]
    pub shares: Shares,
    #[serde(rename = "type")]
    #[tabled(rename = "Action")]
    pub kind: MovementKind,
}

impl Movement {
    pub fn buy(symbol: impl Into<String>, shares: Shares) -> Self {
        Self {
            symbol: symbol.into(),
            shares,
            kind: MovementKind::Buy,
        }
    }

    pub fn sell(symbol: impl Into<String>, shares: Shares) -> Self {
        Self {
            symbol: symbol.into(),
            shares,
            kind: MovementKind::Sell,
        }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind, self.shares, self.symbol)
    }
}
