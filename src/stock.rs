use std::{fmt, sync::Arc};

use crate::{
    Dollar,
    price::{FixedPrice, PriceError, PriceSource},
};

/// A tradeable symbol together with where its price comes from.
///
/// Clones share the same price source. The price is looked up on every call to
/// [`Stock::current_price`] and never stored on the stock itself.
#[derive(Clone)]
pub struct Stock {
    symbol: String,
    source: Arc<dyn PriceSource>,
}

impl Stock {
    pub fn new(symbol: impl Into<String>, source: Arc<dyn PriceSource>) -> Self {
        Self {
            symbol: symbol.into(),
            source,
        }
    }

    /// Stock quoted at [`crate::price::DEFAULT_PRICE`].
    pub fn fixed(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Arc::new(FixedPrice::default()))
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn current_price(&self) -> Result<Dollar, PriceError> {
        self.source.price_for(&self.symbol)
    }
}

impl fmt::Debug for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stock").field("symbol", &self.symbol).finish()
    }
}

impl fmt::Display for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

impl PartialEq for Stock {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for Stock {}
