use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{
    Dollar, Percent, Shares,
    movement::Movement,
    price::PriceError,
    stock::Stock,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub stock: Stock,
    pub shares: Shares,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub stock: Stock,
    /// Target share of the total portfolio value, 0 to 100
    pub percentage: Percent,
}

/// A named set of holdings and the allocation they should be brought to.
///
/// Both holdings and allocations are keyed by symbol and keep the order in
/// which symbols were first added. Replacing an entry keeps its place.
#[derive(Debug, Clone)]
pub struct Portfolio {
    name: String,
    holdings: Vec<Holding>,
    allocations: Vec<(String, Allocation)>,
}

impl Portfolio {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            holdings: Vec::new(),
            allocations: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn holding(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.stock.symbol() == symbol)
    }

    fn holding_mut(&mut self, symbol: &str) -> Option<&mut Holding> {
        self.holdings.iter_mut().find(|h| h.stock.symbol() == symbol)
    }

    fn allocation(&self, symbol: &str) -> Option<&Allocation> {
        self.allocations
            .iter()
            .find_map(|(sym, alloc)| (sym == symbol).then_some(alloc))
    }

    /// Insert or replace the holding for the stock's symbol.
    pub fn add_stock(&mut self, stock: Stock, shares: Shares) {
        match self.holding_mut(stock.symbol()) {
            Some(holding) => *holding = Holding { stock, shares },
            None => self.holdings.push(Holding { stock, shares }),
        }
    }

    /// Drop both the holding and the allocation for `symbol`.
    ///
    /// Returns whether a holding existed. Nothing is touched otherwise.
    pub fn remove_stock(&mut self, symbol: &str) -> bool {
        let Some(idx) = self.holdings.iter().position(|h| h.stock.symbol() == symbol) else {
            return false;
        };
        self.holdings.remove(idx);
        self.allocations.retain(|(sym, _)| sym != symbol);
        true
    }

    /// Update the share count of an existing holding. Unknown symbols are ignored.
    pub fn set_shares(&mut self, symbol: &str, shares: Shares) {
        if let Some(holding) = self.holding_mut(symbol) {
            holding.shares = shares;
        }
    }

    pub fn get_shares(&self, symbol: &str) -> Option<Shares> {
        self.holding(symbol).map(|h| h.shares)
    }

    pub fn get_stocks(&self) -> Vec<Stock> {
        self.holdings.iter().map(|h| h.stock.clone()).collect()
    }

    pub fn holdings(&self) -> impl Iterator<Item = &Holding> {
        self.holdings.iter()
    }

    /// Insert or replace the target allocation for `symbol`. The symbol does not
    /// need to be held.
    pub fn set_allocation(&mut self, symbol: impl Into<String>, stock: Stock, percentage: Percent) {
        let symbol = symbol.into();
        let allocation = Allocation { stock, percentage };
        match self.allocations.iter_mut().find(|(sym, _)| *sym == symbol) {
            Some((_, existing)) => *existing = allocation,
            None => self.allocations.push((symbol, allocation)),
        }
    }

    pub fn get_allocation(&self, symbol: &str) -> Option<Percent> {
        self.allocation(symbol).map(|a| a.percentage)
    }

    /// Owned snapshot of the allocations in insertion order.
    pub fn get_allocations(&self) -> Vec<(String, Allocation)> {
        self.allocations.clone()
    }

    pub fn allocations(&self) -> impl Iterator<Item = (&str, &Allocation)> {
        self.allocations.iter().map(|(sym, alloc)| (sym.as_str(), alloc))
    }

    /// Value of everything currently held.
    pub fn total_value(&self) -> Result<Dollar, PriceError> {
        self.total_value_with(&mut PriceCache::default())
    }

    fn total_value_with<'a>(&'a self, prices: &mut PriceCache<'a>) -> Result<Dollar, PriceError> {
        self.holdings
            .iter()
            .try_fold(0.0, |sum: Dollar, holding| -> Result<Dollar, PriceError> {
                Ok(sum + holding.shares as Dollar * prices.get(&holding.stock)?)
            })
    }

    /// Compute the trades that bring each allocated symbol to its target share
    /// of the current total value.
    ///
    /// Only symbols with an allocation are considered, in allocation order.
    /// Allocating to a symbol that is not held redistributes existing value; it
    /// never adds money. Target share counts are floored.
    pub fn rebalance(&self) -> Result<Vec<Movement>, PriceError> {
        let mut prices = PriceCache::default();
        let total_value = self.total_value_with(&mut prices)?;
        debug!(portfolio = %self.name, total_value, "rebalancing");

        let mut movements = Vec::new();
        for (symbol, allocation) in self.allocations.iter() {
            let price = prices.get(&allocation.stock)?;
            if !price.is_finite() || price <= 0.0 {
                warn!(%symbol, price, "Skipping allocation with unusable price");
                continue;
            }
            let holding = self.holding(symbol);
            let held = holding.map_or(0, |h| h.shares);
            let target_value = (allocation.percentage / 100.0) * total_value;
            let actual_value = held as Dollar * price;
            // Saturating cast; negative targets floor to zero shares.
            let target_shares = (target_value / price).floor() as Shares;
            debug!(%symbol, price, target_value, actual_value, target_shares, "evaluated allocation");

            if target_value < actual_value && holding.is_some() {
                let to_sell = held.saturating_sub(target_shares);
                if to_sell > 0 {
                    movements.push(Movement::sell(symbol.as_str(), to_sell));
                }
            } else if target_value > actual_value {
                let to_buy = target_shares.saturating_sub(held);
                if to_buy > 0 {
                    movements.push(Movement::buy(symbol.as_str(), to_buy));
                }
            }
        }
        debug!(?movements, "rebalanced");
        Ok(movements)
    }
}

/// Prices looked up during a single rebalance, so every symbol is quoted once.
#[derive(Default)]
struct PriceCache<'a> {
    prices: HashMap<&'a str, Dollar>,
}

impl<'a> PriceCache<'a> {
    fn get(&mut self, stock: &'a Stock) -> Result<Dollar, PriceError> {
        if let Some(&price) = self.prices.get(stock.symbol()) {
            return Ok(price);
        }
        let price = stock.current_price()?;
        self.prices.insert(stock.symbol(), price);
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Portfolio {
        let mut portfolio = Portfolio::new("Test");
        portfolio.add_stock(Stock::fixed("META"), 4);
        portfolio.add_stock(Stock::fixed("APPL"), 6);
        portfolio.set_allocation("META", Stock::fixed("META"), 40.0);
        portfolio.set_allocation("APPL", Stock::fixed("APPL"), 60.0);
        portfolio
    }

    #[test]
    fn add_stock_replaces_in_place() {
        let mut portfolio = sample();
        portfolio.add_stock(Stock::fixed("META"), 9);
        assert_eq!(portfolio.get_shares("META"), Some(9));
        let symbols: Vec<_> = portfolio
            .get_stocks()
            .iter()
            .map(|s| s.symbol().to_string())
            .collect();
        assert_eq!(symbols, ["META", "APPL"]);
    }

    #[test]
    fn set_shares_only_updates_existing_holdings() {
        let mut portfolio = sample();
        portfolio.set_shares("APPL", 2);
        portfolio.set_shares("MSFT", 5);
        assert_eq!(portfolio.get_shares("APPL"), Some(2));
        assert_eq!(portfolio.get_shares("MSFT"), None);
        assert_eq!(portfolio.get_stocks().len(), 2);
    }

    #[test]
    fn remove_stock_clears_holding_and_allocation() {
        let mut portfolio = sample();
        assert!(portfolio.remove_stock("META"));
        assert_eq!(portfolio.get_shares("META"), None);
        assert_eq!(portfolio.get_allocation("META"), None);
        assert_eq!(portfolio.get_allocation("APPL"), Some(60.0));
        assert!(!portfolio.remove_stock("META"));
    }

    #[test]
    fn remove_unheld_stock_keeps_allocation() {
        let mut portfolio = sample();
        portfolio.set_allocation("MSFT", Stock::fixed("MSFT"), 10.0);
        assert!(!portfolio.remove_stock("MSFT"));
        assert_eq!(portfolio.get_allocation("MSFT"), Some(10.0));
    }

    #[test]
    fn allocations_are_a_snapshot() {
        let portfolio = sample();
        let mut snapshot = portfolio.get_allocations();
        snapshot[0].1.percentage = 99.0;
        snapshot.clear();
        assert_eq!(portfolio.get_allocation("META"), Some(40.0));
        assert_eq!(portfolio.get_allocations().len(), 2);
    }

    #[test]
    fn set_allocation_replaces_in_place() {
        let mut portfolio = sample();
        portfolio.set_allocation("META", Stock::fixed("META"), 55.0);
        let order: Vec<_> = portfolio.allocations().map(|(sym, _)| sym).collect();
        assert_eq!(order, ["META", "APPL"]);
        assert_eq!(portfolio.get_allocation("META"), Some(55.0));
    }

    #[test]
    fn total_value_ignores_unheld_allocations() {
        let mut portfolio = sample();
        portfolio.set_allocation("MSFT", Stock::fixed("MSFT"), 50.0);
        assert_eq!(portfolio.total_value(), Ok(1000.0));
    }
}
