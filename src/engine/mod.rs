//! Numeric long-division engine.
//!
//! Classic schoolbook procedure: exactly one dividend digit is brought down
//! per position. Quotient digits that are zero before the first non-zero
//! digit are suppressed; once the quotient has started, zeros are written.

mod trace;

pub use trace::{PositionTrace, Trace};

use crate::model::Problem;

pub struct DivisionEngine<'a> {
    problem: &'a Problem,
}

impl<'a> DivisionEngine<'a> {
    pub fn new(problem: &'a Problem) -> Self {
        Self { problem }
    }

    pub fn run(&self) -> Trace {
        let divisor = u128::from(self.problem.divisor());
        let mut positions = Vec::with_capacity(self.problem.dividend_len());
        let mut quotient = String::new();
        let mut carry: u128 = 0;

        for (position, digit) in self.problem.dividend_digits().enumerate() {
            // carry < divisor, so working < 10 * divisor and the digit is 0..=9.
            let working = carry * 10 + u128::from(digit);
            let quotient_digit = (working / divisor) as u8;
            let product = u128::from(quotient_digit) * divisor;
            let remainder = working - product;
            let emitted = quotient_digit > 0 || !quotient.is_empty();
            if emitted {
                quotient.push(char::from(b'0' + quotient_digit));
            }
            positions.push(PositionTrace {
                position,
                digit,
                working,
                quotient_digit,
                product,
                remainder,
                emitted,
            });
            carry = remainder;
        }

        if quotient.is_empty() {
            quotient.push('0');
        }

        Trace {
            divisor: self.problem.divisor(),
            positions,
            quotient,
            remainder: carry,
        }
    }
}

/// Run the engine for a problem.
pub fn divide(problem: &Problem) -> Trace {
    DivisionEngine::new(problem).run()
}
