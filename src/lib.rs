pub mod file;
pub mod movement;
pub mod portfolio;
pub mod price;
pub mod stock;

pub type Dollar = f64;
pub type Percent = f64;
pub type Shares = u64;

pub use movement::{Movement, MovementKind};
pub use portfolio::{Allocation, Holding, Portfolio};
pub use price::{FixedPrice, PriceError, PriceSource, PriceTable};
pub use stock::Stock;
