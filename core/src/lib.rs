pub mod error;
pub mod models;

pub use error::OrderbookError;
pub use models::*;
