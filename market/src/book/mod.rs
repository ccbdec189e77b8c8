//! Pure shaping of raw simulation records into a two-sided book.
//!
//! raw trades → [`normalizer`] → [`curve`] → sorted bid/ask curves
//!
//! [`attribution`] runs lazily on a single point when it is inspected.

pub mod attribution;
pub mod curve;
pub mod normalizer;

pub use attribution::{Attribution, attribute, decode_fee_bps};
pub use curve::{Curves, build_asks, build_bids};
pub use normalizer::dedup_by_input;
