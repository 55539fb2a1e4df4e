use std::{io, sync::Arc};

use anyhow::Context;
use clap::{CommandFactory, Parser};
use directories::ProjectDirs;
use tabled::{Table, Tabled, settings::Style};
use tracing_subscriber::EnvFilter;

use rebalancer::{
    Dollar, Portfolio, Shares,
    file::PortfolioFile,
    price::{FixedPrice, PriceSource, PriceTable},
};

mod cli;

#[derive(Tabled)]
struct HoldingRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Shares")]
    shares: Shares,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Target")]
    target: String,
}

fn holding_rows(portfolio: &Portfolio) -> anyhow::Result<Vec<HoldingRow>> {
    let total = portfolio.total_value()?;
    let mut rows = Vec::new();
    for holding in portfolio.holdings() {
        let value = holding.shares as Dollar * holding.stock.current_price()?;
        let current = match total > 0.0 {
            true => format!("{:.1}%", value / total * 100.0),
            false => "-".to_string(),
        };
        let target = portfolio
            .get_allocation(holding.stock.symbol())
            .map_or_else(|| "-".to_string(), |pct| format!("{pct:.1}%"));
        rows.push(HoldingRow {
            symbol: holding.stock.symbol().to_string(),
            shares: holding.shares,
            value: format!("${value:.2}"),
            current,
            target,
        });
    }
    for (symbol, allocation) in portfolio.allocations() {
        if portfolio.get_shares(symbol).is_none() {
            rows.push(HoldingRow {
                symbol: symbol.to_string(),
                shares: 0,
                value: "-".to_string(),
                current: "-".to_string(),
                target: format!("{:.1}%", allocation.percentage),
            });
        }
    }
    Ok(rows)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let opts = cli::Cli::parse();

    if let Some(shell) = opts.completions {
        let mut cmd = cli::Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let Some(portfolio_path) = opts.portfolio.or(ProjectDirs::from("org", "quotidian", "rebalancer")
        .map(|pdirs| pdirs.config_dir().join("portfolio.yml")))
    else {
        anyhow::bail!("Failed to get portfolio path");
    };

    let source: Arc<dyn PriceSource> = match opts.prices {
        Some(path) => Arc::new(PriceTable::load_from_file(path)?),
        None => Arc::new(FixedPrice(opts.price)),
    };
    let portfolio = PortfolioFile::load_from_file(&portfolio_path)?.into_portfolio(source);

    let movements = portfolio
        .rebalance()
        .with_context(|| format!("Failed to rebalance portfolio '{}'", portfolio.name()))?;

    match opts.format {
        cli::Format::Yaml => {
            serde_yaml::to_writer(io::stdout(), &movements)?;
        }
        cli::Format::Table => {
            println!("Portfolio {}", portfolio.name());
            let mut holdings = Table::new(holding_rows(&portfolio)?);
            holdings.with(Style::rounded());
            println!("{holdings}");
            println!();
            if movements.is_empty() {
                println!("Holdings already match the target allocations.");
            } else {
                println!("In order to reach your target allocations, make the following trades.");
                let mut trades = Table::new(&movements);
                trades.with(Style::rounded());
                println!("{trades}");
            }
        }
    }
    Ok(())
}
