use std::{collections::HashSet, io::Read, path::Path, sync::Arc};

use anyhow::{Context, bail};
use serde::Deserialize;
use tracing::debug;

use crate::{Percent, Shares, portfolio::Portfolio, price::PriceSource, stock::Stock};

/// Allowed slack when checking that allocations add up to 100%.
const PERCENT_TOLERANCE: Percent = 0.01;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HoldingEntry {
    pub symbol: String,
    #[serde(default)]
    pub shares: Shares,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AllocationEntry {
    pub symbol: String,
    pub percent: Percent,
}

/// A validated portfolio description read from yaml.
#[derive(Debug)]
pub struct PortfolioFile {
    pub name: String,
    pub holdings: Vec<HoldingEntry>,
    pub allocations: Vec<AllocationEntry>,
}

impl PortfolioFile {
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open file {path:?}"))?;
        Self::from_reader(file).with_context(|| format!("Invalid portfolio file {path:?}"))
    }

    pub fn from_reader(reader: impl Read) -> anyhow::Result<Self> {
        let builder: PortfolioFileBuilder = serde_yaml::from_reader(reader)?;
        builder.build()
    }

    /// Build a portfolio whose stocks are all priced by `source`, keeping file order.
    pub fn into_portfolio(self, source: Arc<dyn PriceSource>) -> Portfolio {
        let mut portfolio = Portfolio::new(self.name);
        for entry in self.holdings {
            portfolio.add_stock(Stock::new(entry.symbol, source.clone()), entry.shares);
        }
        for entry in self.allocations {
            let stock = Stock::new(entry.symbol.clone(), source.clone());
            portfolio.set_allocation(entry.symbol, stock, entry.percent);
        }
        debug!(?portfolio, "built portfolio");
        portfolio
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PortfolioFileBuilder {
    pub name: String,
    #[serde(default)]
    pub holdings: Vec<HoldingEntry>,
    #[serde(default)]
    pub allocations: Vec<AllocationEntry>,
}

impl TryFrom<PortfolioFileBuilder> for PortfolioFile {
    type Error = anyhow::Error;

    fn try_from(builder: PortfolioFileBuilder) -> Result<Self, Self::Error> {
        builder.validate()?;
        Ok(PortfolioFile {
            name: builder.name,
            holdings: builder.holdings,
            allocations: builder.allocations,
        })
    }
}

impl PortfolioFileBuilder {
    fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for holding in self.holdings.iter() {
            if !seen.insert(holding.symbol.as_str()) {
                bail!("Holding '{}' is listed more than once", holding.symbol);
            }
        }
        let mut seen = HashSet::new();
        for allocation in self.allocations.iter() {
            if !seen.insert(allocation.symbol.as_str()) {
                bail!("Allocation '{}' is listed more than once", allocation.symbol);
            }
            anyhow::ensure!(
                (0.0..=100.0).contains(&allocation.percent),
                "Allocation for '{}' must be between 0% and 100%, got {}%",
                allocation.symbol,
                allocation.percent
            );
        }
        if !self.allocations.is_empty() {
            let total_percent: Percent = self.allocations.iter().map(|a| a.percent).sum();
            anyhow::ensure!(
                (total_percent - 100.0).abs() <= PERCENT_TOLERANCE,
                "Target allocations add up to {total_percent}%, not 100%"
            );
        }
        Ok(())
    }

    fn build(self) -> anyhow::Result<PortfolioFile> {
        self.try_into()
    }
}
