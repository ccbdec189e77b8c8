pub mod curve;
pub mod orderbook;
pub mod pair;

pub use curve::{CurvePoint, Side};
pub use orderbook::{MidPriceDescriptor, Orderbook, Pool, Token, TradeRecord};
pub use pair::{PairTag, is_valid_address};
