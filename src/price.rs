use std::{collections::HashMap, io::Read, path::Path};

use anyhow::{Context, anyhow, bail};
use thiserror::Error;
use tracing::{debug, warn};

use crate::Dollar;

/// Price every stock is quoted at when no market data is wired in.
pub const DEFAULT_PRICE: Dollar = 100.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PriceError {
    #[error("no price available for symbol '{0}'")]
    UnknownSymbol(String),
}

/// Somewhere a current price for a symbol can be looked up.
pub trait PriceSource: Send + Sync {
    fn price_for(&self, symbol: &str) -> Result<Dollar, PriceError>;
}

/// Quotes the same price for every symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPrice(pub Dollar);

impl Default for FixedPrice {
    fn default() -> Self {
        Self(DEFAULT_PRICE)
    }
}

impl PriceSource for FixedPrice {
    fn price_for(&self, _symbol: &str) -> Result<Dollar, PriceError> {
        Ok(self.0)
    }
}

enum Columns {
    Symbol = 0,
    Price = 1,
}

/// Static symbol to price lookup, usually read from a `Symbol,Price` csv.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    prices: HashMap<String, Dollar>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, price: Dollar) -> Option<Dollar> {
        self.prices.insert(symbol.into(), price)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open price file {path:?}"))?;
        Self::from_reader(file).with_context(|| format!("Failed to parse price file {path:?}"))
    }

    pub fn from_reader(reader: impl Read) -> anyhow::Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?;
        if headers.get(Columns::Symbol as usize) != Some("Symbol")
            || headers.get(Columns::Price as usize) != Some("Price")
        {
            warn!(?headers, "Unexpected headers");
            bail!("Unexpected csv file format, expected 'Symbol,Price' headers");
        }
        let mut table = Self::new();
        for row in csv_reader.records() {
            let row = row?;
            debug!(?row, "parsed row");
            if row.iter().all(str::is_empty) {
                debug!(?row, "Skipping blank row");
                continue;
            }
            let symbol = row
                .get(Columns::Symbol as usize)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| anyhow!("Failed to get symbol for row {:?}", row.position()))?;
            let price = row
                .get(Columns::Price as usize)
                .and_then(|s| s.trim_start_matches('$').parse::<Dollar>().ok())
                .ok_or_else(|| anyhow!("Failed to get price for {symbol}"))?;
            if !price.is_finite() || price < 0.0 {
                bail!("Invalid price {price} for {symbol}");
            }
            if table.insert(symbol, price).is_some() {
                bail!("Duplicate price entry for {symbol}");
            }
        }
        Ok(table)
    }
}

impl PriceSource for PriceTable {
    fn price_for(&self, symbol: &str) -> Result<Dollar, PriceError> {
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| PriceError::UnknownSymbol(symbol.to_string()))
    }
}

impl<S: Into<String>> FromIterator<(S, Dollar)> for PriceTable {
    fn from_iter<I: IntoIterator<Item = (S, Dollar)>>(iter: I) -> Self {
        Self {
            prices: iter.into_iter().map(|(s, p)| (s.into(), p)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_price_defaults_to_one_hundred() {
        assert_eq!(FixedPrice::default().price_for("ANY"), Ok(100.0));
        assert_eq!(FixedPrice(12.5).price_for("META"), Ok(12.5));
    }

    #[test]
    fn parses_price_table() {
        let csv = "Symbol,Price\nMETA,$512.25\nAPPL, 190\n\n";
        let table = PriceTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.price_for("META"), Ok(512.25));
        assert_eq!(table.price_for("APPL"), Ok(190.0));
        assert_eq!(
            table.price_for("MSFT"),
            Err(PriceError::UnknownSymbol("MSFT".into()))
        );
    }

    #[test]
    fn rejects_bad_headers() {
        let csv = "Ticker,Last\nMETA,1\n";
        assert!(PriceTable::from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn rejects_bad_prices() {
        for csv in [
            "Symbol,Price\nMETA,abc\n",
            "Symbol,Price\nMETA,-1\n",
            "Symbol,Price\nMETA,NaN\n",
            "Symbol,Price\nMETA,1\nMETA,2\n",
        ] {
            assert!(PriceTable::from_reader(csv.as_bytes()).is_err(), "{csv}");
        }
    }
}
