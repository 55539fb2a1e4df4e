use rebalancer::{Portfolio, Stock};

fn main() {
    divan::main()
}

fn large_portfolio(symbols: usize) -> Portfolio {
    let mut portfolio = Portfolio::new("Bench");
    let percent = 100.0 / symbols as f64;
    for i in 0..symbols {
        let stock = Stock::fixed(format!("SYM{i}"));
        if i % 2 == 0 {
            portfolio.add_stock(stock.clone(), (i as u64 * 7) % 50);
        }
        portfolio.set_allocation(stock.symbol().to_string(), stock, percent);
    }
    portfolio
}

#[divan::bench(args = [10, 100, 1000])]
fn rebalance(bencher: divan::Bencher, symbols: usize) {
    let portfolio = large_portfolio(symbols);
    bencher.bench(|| portfolio.rebalance().expect("Failed to rebalance"));
}
