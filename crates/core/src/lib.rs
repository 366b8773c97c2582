pub mod config;
pub mod error;
pub mod order;
pub mod traits;

pub use config::{Credentials, PollConfig};
pub use error::{ConfigError, ExchangeError};
pub use order::{Order, OrderRequest, OrderStatus, OrderType, Side, TimeInForce};
pub use traits::ExchangeClient;
