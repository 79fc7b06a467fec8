use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Longest dividend accepted. Every step snapshots the whole grid, so the
/// walkthrough grows with the square of the digit count.
pub const MAX_DIVIDEND_DIGITS: usize = 64;

/// A validated division problem.
///
/// The dividend is kept as a normalized decimal digit string so that
/// dividends wider than any machine integer can be walked through; only the
/// divisor has to fit a `u64`. Deserialization goes through the same
/// validation as [`Problem::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProblem")]
pub struct Problem {
    dividend: String,
    divisor: u64,
}

/// Unchecked wire form of [`Problem`].
#[derive(Deserialize)]
struct RawProblem {
    dividend: String,
    divisor: u64,
}

impl TryFrom<RawProblem> for Problem {
    type Error = ValidationError;

    fn try_from(raw: RawProblem) -> Result<Self, Self::Error> {
        Problem::parse(&raw.dividend, &raw.divisor.to_string())
    }
}

impl Problem {
    /// Build a problem from integer operands.
    pub fn new(dividend: i128, divisor: i128) -> Result<Self, ValidationError> {
        if divisor <= 0 {
            return Err(ValidationError::DivisorNotPositive(divisor));
        }
        if dividend < 0 {
            return Err(ValidationError::NegativeDividend(dividend));
        }
        let divisor = u64::try_from(divisor)
            .map_err(|_| ValidationError::DivisorTooLarge(divisor.to_string()))?;
        let dividend = dividend.to_string();
        check_dividend_len(&dividend)?;
        Ok(Self { dividend, divisor })
    }

    /// Build a problem from decimal digit strings.
    ///
    /// Each operand must be one or more ASCII digits once surrounding
    /// whitespace is trimmed. Leading zeros are dropped.
    pub fn parse(dividend: &str, divisor: &str) -> Result<Self, ValidationError> {
        let dividend = normalize_digits("dividend", dividend)?;
        check_dividend_len(&dividend)?;
        let divisor_digits = normalize_digits("divisor", divisor)?;
        let divisor: u64 = divisor_digits
            .parse()
            .map_err(|_| ValidationError::DivisorTooLarge(divisor_digits.clone()))?;
        if divisor == 0 {
            return Err(ValidationError::DivisorNotPositive(0));
        }
        Ok(Self { dividend, divisor })
    }

    pub fn dividend(&self) -> &str {
        &self.dividend
    }

    pub fn divisor(&self) -> u64 {
        self.divisor
    }

    /// Dividend digits as numeric values, most significant first.
    pub fn dividend_digits(&self) -> impl Iterator<Item = u8> + '_ {
        self.dividend.bytes().map(|b| b - b'0')
    }

    pub fn dividend_len(&self) -> usize {
        self.dividend.len()
    }

    pub fn divisor_len(&self) -> usize {
        self.divisor.to_string().len()
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ÷ {}", self.dividend, self.divisor)
    }
}

fn check_dividend_len(dividend: &str) -> Result<(), ValidationError> {
    if dividend.len() > MAX_DIVIDEND_DIGITS {
        return Err(ValidationError::DividendTooLong {
            digits: dividend.len(),
            max: MAX_DIVIDEND_DIGITS,
        });
    }
    Ok(())
}

fn normalize_digits(field: &'static str, input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::MalformedDigits {
            field,
            input: input.to_string(),
        });
    }
    let significant = trimmed.trim_start_matches('0');
    if significant.is_empty() {
        Ok("0".to_string())
    } else {
        Ok(significant.to_string())
    }
}

/// Semantic role of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellRole {
    Divisor,
    DividendDigit,
    QuotientDigit,
    Vinculum,
    BroughtDown,
    Product,
    SubtractionResult,
    Operator,
    Blank,
}

/// Per-step presentation flags. Recomputed for every step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellFlags {
    #[serde(default)]
    pub operand: bool,
    #[serde(default)]
    pub minuend: bool,
    #[serde(default)]
    pub subtrahend: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub fade_in: bool,
    #[serde(default)]
    pub animate_in: bool,
}

impl CellFlags {
    pub fn is_highlighted(&self) -> bool {
        self.operand || self.minuend || self.subtrahend
    }

    pub fn is_animating(&self) -> bool {
        self.fade_in || self.animate_in
    }
}

/// The atomic renderable unit. `id` is stable across every step of a walkthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub id: String,
    pub content: String,
    pub row: usize,
    pub column: usize,
    pub role: CellRole,
    #[serde(default)]
    pub flags: CellFlags,
    /// Dividend position a brought-down digit was copied from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brought_down_from: Option<usize>,
}

impl GridCell {
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        row: usize,
        column: usize,
        role: CellRole,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            row,
            column,
            role,
            flags: CellFlags::default(),
            brought_down_from: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        !self.flags.hidden
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDimensions {
    pub columns: usize,
    pub rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Intro,
    BringDown,
    WriteZero,
    Divide,
    MultiplyQuestion,
    MultiplyAnswer,
    SubtractQuestion,
    SubtractAnswer,
    Complete,
}

impl StepKind {
    /// Whether this step writes a digit into the quotient row.
    pub fn writes_quotient_digit(self) -> bool {
        matches!(self, StepKind::Divide | StepKind::WriteZero)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Multiplication,
    Subtraction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub kind: StepKind,
    pub explanation: String,
    /// Every cell introduced so far, with this step's flags applied.
    pub cells: Vec<GridCell>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionKind>,
    #[serde(default)]
    pub show_subtraction_lines: bool,
}

impl Step {
    pub fn is_question(&self) -> bool {
        self.question.is_some()
    }

    pub fn cell(&self, id: &str) -> Option<&GridCell> {
        self.cells.iter().find(|c| c.id == id)
    }

    pub fn visible_cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter().filter(|c| c.is_visible())
    }
}

/// The full, immutable output of one division run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Walkthrough {
    pub problem: Problem,
    pub quotient: String,
    pub remainder: u128,
    pub dimensions: GridDimensions,
    pub steps: Vec<Step>,
}

impl Walkthrough {
    pub fn last_step(&self) -> Option<&Step> {
        self.steps.last()
    }
}

/// Notifications emitted by the playback controller for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    Begun { steps: usize },
    Advanced { step: usize },
    Revealed { step: usize },
    Settled { step: usize },
    Completed { quotient: String, remainder: u128 },
    Reset,
    Rejected(String),
}

/// Host-side timing for staged reveals and paced playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(with = "humantime_serde")]
    pub reveal_delay: Duration,
    #[serde(with = "humantime_serde")]
    pub animation_duration: Duration,
    #[serde(with = "humantime_serde")]
    pub step_delay: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            reveal_delay: Duration::from_millis(50),
            animation_duration: Duration::from_millis(400),
            step_delay: Duration::ZERO,
        }
    }
}
