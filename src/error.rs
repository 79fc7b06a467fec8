use thiserror::Error;

/// Reasons a division problem is refused before any step is generated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("divisor must be positive (got {0})")]
    DivisorNotPositive(i128),
    #[error("dividend must be non-negative (got {0})")]
    NegativeDividend(i128),
    #[error("{field} must be one or more ASCII digits (got {input:?})")]
    MalformedDigits { field: &'static str, input: String },
    #[error("divisor {0} is too large (maximum is {max})", max = u64::MAX)]
    DivisorTooLarge(String),
    #[error("dividend has {digits} digits (maximum is {max})")]
    DividendTooLong { digits: usize, max: usize },
}
