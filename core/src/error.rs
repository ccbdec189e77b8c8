use thiserror::Error;

/// Contract violations raised by the orderbook shaping functions.
///
/// These indicate a programming error upstream of the caller (payloads are
/// validated at the fetch boundary), not a runtime condition to retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderbookError {
    #[error("distribution has {got} entries but the orderbook lists {expected} pools")]
    LengthMismatch { expected: usize, got: usize },
}
