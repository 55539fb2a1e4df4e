use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_complete::Shell;

use rebalancer::{Dollar, price::DEFAULT_PRICE};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum Format {
    Table,
    Yaml,
}

#[derive(Parser, Debug)]
#[command(version, about = "Work out the trades that bring a portfolio back to its target allocation")]
pub(crate) struct Cli {
    #[arg(help = "Portfolio description (yaml); defaults to portfolio.yml in the config directory")]
    pub portfolio: Option<PathBuf>,
    #[arg(
        short = 'P',
        long,
        help = "CSV with Symbol,Price columns to price the portfolio with"
    )]
    pub prices: Option<PathBuf>,
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_PRICE,
        conflicts_with = "prices",
        help = "Price every symbol at this value"
    )]
    pub price: Dollar,
    #[arg(short, long, value_enum, default_value_t = Format::Table, help = "How to print movements")]
    pub format: Format,
    #[arg(long, value_enum, help = "Print a shell completion script and exit")]
    pub completions: Option<Shell>,
}
