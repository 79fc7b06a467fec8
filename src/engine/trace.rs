use serde::{Deserialize, Serialize};

/// What happened at one dividend digit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionTrace {
    pub position: usize,
    pub digit: u8,
    /// `carry * 10 + digit`.
    pub working: u128,
    pub quotient_digit: u8,
    pub product: u128,
    /// `working - product`; carried into the next position.
    pub remainder: u128,
    /// False for leading zero quotient digits, which are never written.
    pub emitted: bool,
}

impl PositionTrace {
    /// An emitted zero: the working value was too small, "write 0".
    pub fn is_zero_step(&self) -> bool {
        self.emitted && self.quotient_digit == 0
    }

    /// A full divide / multiply / subtract group.
    pub fn is_divide_step(&self) -> bool {
        self.emitted && self.quotient_digit > 0
    }
}

/// Numeric result of a long division, one entry per dividend digit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    pub divisor: u64,
    pub positions: Vec<PositionTrace>,
    pub quotient: String,
    pub remainder: u128,
}

impl Trace {
    /// True when every quotient digit was a suppressed leading zero.
    pub fn quotient_is_empty(&self) -> bool {
        !self.positions.iter().any(|p| p.emitted)
    }
}
