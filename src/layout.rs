//! Grid layout planner.
//!
//! Assigns every symbol of the written division a stable (row, column) on an
//! abstract integer grid. Rows only ever grow downward; a row never holds two
//! cells in the same column.

use crate::engine::{PositionTrace, Trace};
use crate::model::{CellRole, GridCell, GridDimensions, Problem};

pub const QUOTIENT_ROW: usize = 1;
pub const VINCULUM_ROW: usize = 2;
pub const DIVISOR_ROW: usize = 3;
pub const DIVIDEND_ROW: usize = 3;
pub const FIRST_CALC_ROW: usize = 4;
pub const MIN_COLUMNS: usize = 20;
pub const MIN_ROWS: usize = 20;

pub const BAR_SYMBOL: &str = "|";
pub const VINCULUM_SYMBOL: &str = "─";
pub const MULTIPLY_SYMBOL: &str = "×";
pub const MINUS_SYMBOL: &str = "−";

/// Cells of one divide / multiply / subtract group.
#[derive(Debug, Clone)]
pub struct DivideLayout {
    pub product: Vec<GridCell>,
    /// Sits in the bar column on the product row; starts out as `×`.
    pub operator: GridCell,
    pub difference: Vec<GridCell>,
}

/// Placement for one dividend digit position.
#[derive(Debug, Clone)]
pub struct PositionLayout {
    pub position: usize,
    pub working_row: usize,
    pub brought_down: GridCell,
    /// Ids of the cells that together display the working value, left to right.
    pub working_cells: Vec<String>,
    pub quotient: Option<GridCell>,
    pub divide: Option<DivideLayout>,
}

#[derive(Debug, Clone)]
pub struct GridLayout {
    /// Divisor, bar, vinculum and dividend; present from the first step.
    pub base: Vec<GridCell>,
    pub divisor_cells: Vec<String>,
    pub positions: Vec<PositionLayout>,
    /// `0` written above the last dividend digit when no quotient digit was.
    pub empty_quotient: Option<GridCell>,
    pub dimensions: GridDimensions,
}

pub struct GridPlanner<'a> {
    problem: &'a Problem,
    trace: &'a Trace,
}

impl<'a> GridPlanner<'a> {
    pub fn new(problem: &'a Problem, trace: &'a Trace) -> Self {
        Self { problem, trace }
    }

    pub fn bar_column(&self) -> usize {
        self.problem.divisor_len() + 1
    }

    pub fn dividend_column(&self, position: usize) -> usize {
        self.problem.divisor_len() + 2 + position
    }

    pub fn plan(&self) -> GridLayout {
        let base = self.base_cells();
        let divisor_cells = base
            .iter()
            .filter(|c| c.role == CellRole::Divisor)
            .map(|c| c.id.clone())
            .collect();

        let mut positions = Vec::with_capacity(self.trace.positions.len());
        let mut working_row = FIRST_CALC_ROW;
        let mut working_cells: Vec<String> = Vec::new();
        let mut max_row = DIVIDEND_ROW;

        for pos in &self.trace.positions {
            let column = self.dividend_column(pos.position);
            let mut brought_down = GridCell::new(
                format!("broughtdown-{}", pos.position),
                pos.digit.to_string(),
                working_row,
                column,
                CellRole::BroughtDown,
            );
            brought_down.brought_down_from = Some(pos.position);
            working_cells.push(brought_down.id.clone());
            max_row = max_row.max(working_row);

            let quotient = pos.emitted.then(|| {
                GridCell::new(
                    format!("quotient-{}", pos.position),
                    pos.quotient_digit.to_string(),
                    QUOTIENT_ROW,
                    column,
                    CellRole::QuotientDigit,
                )
            });

            let divide = pos
                .is_divide_step()
                .then(|| self.divide_cells(pos, working_row, column));

            positions.push(PositionLayout {
                position: pos.position,
                working_row,
                brought_down,
                working_cells: working_cells.clone(),
                quotient,
                divide: divide.clone(),
            });

            if let Some(divide) = divide {
                let result_row = working_row + 2;
                max_row = max_row.max(result_row);
                if pos.remainder > 0 {
                    // The next digit is brought down beside the remainder.
                    working_row = result_row;
                    working_cells = divide.difference.iter().map(|c| c.id.clone()).collect();
                } else {
                    working_row = result_row + 1;
                    working_cells.clear();
                }
            }
        }

        let empty_quotient = if self.trace.quotient_is_empty() {
            let last = self.problem.dividend_len().saturating_sub(1);
            Some(GridCell::new(
                format!("quotient-{last}"),
                "0",
                QUOTIENT_ROW,
                self.dividend_column(last),
                CellRole::QuotientDigit,
            ))
        } else {
            None
        };

        let dimensions = GridDimensions {
            columns: (self.problem.divisor_len() + 2 + self.problem.dividend_len())
                .max(MIN_COLUMNS),
            rows: (max_row + 1).max(MIN_ROWS),
        };

        GridLayout {
            base,
            divisor_cells,
            positions,
            empty_quotient,
            dimensions,
        }
    }

    fn base_cells(&self) -> Vec<GridCell> {
        let divisor = self.problem.divisor().to_string();
        let mut cells = Vec::with_capacity(divisor.len() + 1 + 2 * self.problem.dividend_len());

        for (i, ch) in divisor.chars().enumerate() {
            cells.push(GridCell::new(
                format!("divisor-{i}"),
                ch.to_string(),
                DIVISOR_ROW,
                i + 1,
                CellRole::Divisor,
            ));
        }

        cells.push(GridCell::new(
            "vinculum-bar",
            BAR_SYMBOL,
            DIVISOR_ROW,
            self.bar_column(),
            CellRole::Vinculum,
        ));

        for i in 0..self.problem.dividend_len() {
            cells.push(GridCell::new(
                format!("vinculum-{i}"),
                VINCULUM_SYMBOL,
                VINCULUM_ROW,
                self.dividend_column(i),
                CellRole::Vinculum,
            ));
        }

        for (i, digit) in self.problem.dividend_digits().enumerate() {
            cells.push(GridCell::new(
                format!("dividend-{i}"),
                digit.to_string(),
                DIVIDEND_ROW,
                self.dividend_column(i),
                CellRole::DividendDigit,
            ));
        }

        cells
    }

    fn divide_cells(&self, pos: &PositionTrace, working_row: usize, end_column: usize) -> DivideLayout {
        let product_row = working_row + 1;
        let result_row = working_row + 2;
        DivideLayout {
            product: right_aligned(
                &format!("product-{}", pos.position),
                pos.product,
                product_row,
                end_column,
                CellRole::Product,
            ),
            operator: GridCell::new(
                format!("operator-{}", pos.position),
                MULTIPLY_SYMBOL,
                product_row,
                self.bar_column(),
                CellRole::Operator,
            ),
            difference: right_aligned(
                &format!("difference-{}", pos.position),
                pos.remainder,
                result_row,
                end_column,
                CellRole::SubtractionResult,
            ),
        }
    }
}

/// Lay out the digits of `value` so the last one lands on `end_column`.
fn right_aligned(
    prefix: &str,
    value: u128,
    row: usize,
    end_column: usize,
    role: CellRole,
) -> Vec<GridCell> {
    let digits = value.to_string();
    let start = end_column + 1 - digits.len();
    digits
        .chars()
        .enumerate()
        .map(|(k, ch)| GridCell::new(format!("{prefix}-{k}"), ch.to_string(), row, start + k, role))
        .collect()
}

/// Plan the grid for a problem and its trace.
pub fn plan(problem: &Problem, trace: &Trace) -> GridLayout {
    GridPlanner::new(problem, trace).plan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::divide;
    use std::collections::HashSet;

    fn layout(dividend: &str, divisor: &str) -> GridLayout {
        let problem = Problem::parse(dividend, divisor).unwrap();
        let trace = divide(&problem);
        plan(&problem, &trace)
    }

    fn all_cells(layout: &GridLayout) -> Vec<GridCell> {
        let mut cells = layout.base.clone();
        for p in &layout.positions {
            cells.push(p.brought_down.clone());
            cells.extend(p.quotient.clone());
            if let Some(d) = &p.divide {
                cells.extend(d.product.clone());
                cells.push(d.operator.clone());
                cells.extend(d.difference.clone());
            }
        }
        cells.extend(layout.empty_quotient.clone());
        cells
    }

    #[test]
    fn base_cells_follow_divisor_width() {
        let l = layout("84", "3");
        let find = |id: &str| l.base.iter().find(|c| c.id == id).unwrap().clone();
        assert_eq!((find("divisor-0").row, find("divisor-0").column), (DIVISOR_ROW, 1));
        assert_eq!(find("vinculum-bar").column, 2);
        assert_eq!(find("dividend-0").column, 3);
        assert_eq!(find("dividend-1").column, 4);
        assert_eq!(find("vinculum-1").row, VINCULUM_ROW);

        let wide = layout("1234", "125");
        let find = |id: &str| wide.base.iter().find(|c| c.id == id).unwrap().clone();
        assert_eq!(find("divisor-2").column, 3);
        assert_eq!(find("vinculum-bar").column, 4);
        assert_eq!(find("dividend-0").column, 5);
    }

    #[test]
    fn remainder_row_hosts_next_bring_down() {
        // 84 / 3: 8 - 6 = 2, then 4 is brought down next to the 2.
        let l = layout("84", "3");
        let first = &l.positions[0];
        let second = &l.positions[1];
        let d = first.divide.as_ref().unwrap();
        assert_eq!(d.product[0].row, FIRST_CALC_ROW + 1);
        assert_eq!(d.difference[0].row, FIRST_CALC_ROW + 2);
        assert_eq!(d.difference[0].column, 3);
        assert_eq!(second.working_row, FIRST_CALC_ROW + 2);
        assert_eq!(second.brought_down.column, 4);
        assert_eq!(
            second.working_cells,
            vec!["difference-0-0".to_string(), "broughtdown-1".to_string()]
        );
        let product: Vec<_> = second
            .divide
            .as_ref()
            .unwrap()
            .product
            .iter()
            .map(|c| (c.content.as_str(), c.column))
            .collect();
        assert_eq!(product, vec![("2", 3), ("4", 4)]);
    }

    #[test]
    fn zero_remainder_starts_fresh_row() {
        let l = layout("100", "5");
        let second = &l.positions[1];
        let third = &l.positions[2];
        assert_eq!(second.working_row, FIRST_CALC_ROW);
        assert_eq!(third.working_row, FIRST_CALC_ROW + 3);
        assert_eq!(third.working_cells, vec!["broughtdown-2".to_string()]);
        assert!(third.divide.is_none());
        assert_eq!(third.quotient.as_ref().unwrap().content, "0");
    }

    #[test]
    fn suppressed_positions_extend_the_working_portion() {
        let l = layout("12", "5");
        assert!(l.positions[0].quotient.is_none());
        assert_eq!(l.positions[1].working_row, FIRST_CALC_ROW);
        assert_eq!(l.positions[1].working_cells.len(), 2);
    }

    #[test]
    fn empty_quotient_gets_a_zero_cell() {
        let l = layout("7", "9");
        let zero = l.empty_quotient.as_ref().unwrap();
        assert_eq!((zero.row, zero.column), (QUOTIENT_ROW, 3));
        assert!(layout("84", "3").empty_quotient.is_none());
    }

    #[test]
    fn no_cell_shares_a_coordinate() {
        for (dividend, divisor) in [("84", "3"), ("100", "5"), ("987654321", "12"), ("1005", "5")] {
            let l = layout(dividend, divisor);
            let mut seen = HashSet::new();
            for c in all_cells(&l) {
                assert!(
                    seen.insert((c.row, c.column)),
                    "{dividend}/{divisor}: {} collides at ({}, {})",
                    c.id,
                    c.row,
                    c.column
                );
            }
        }
    }

    #[test]
    fn dimensions_respect_minimums() {
        let l = layout("84", "3");
        assert_eq!(l.dimensions.columns, MIN_COLUMNS);
        assert_eq!(l.dimensions.rows, MIN_ROWS);
        let long = layout("123456789012345678901234", "7");
        assert_eq!(long.dimensions.columns, 1 + 2 + 24);
        assert!(long.dimensions.rows > MIN_ROWS);
    }
}
