//! Step sequencer.
//!
//! Turns the numeric trace and the planned grid into the ordered list of
//! teaching steps. Cell sets are cumulative; highlight and visibility flags
//! are derived from scratch for every step.

use crate::engine::{self, PositionTrace};
use crate::layout::{self, DivideLayout, PositionLayout, MINUS_SYMBOL};
use crate::model::{CellRole, GridCell, Problem, QuestionKind, Step, StepKind, Walkthrough};
use std::collections::HashSet;

/// Which cells to emphasize in a single step.
#[derive(Default)]
struct Emphasis<'a> {
    /// Cells that become visible in this step.
    fresh: Vec<&'a str>,
    operands: Vec<&'a str>,
    minuends: Vec<&'a str>,
    subtrahends: Vec<&'a str>,
    hidden: Vec<&'a str>,
    question: Option<QuestionKind>,
    show_subtraction_lines: bool,
}

struct StepBuilder {
    cells: Vec<GridCell>,
    steps: Vec<Step>,
}

impl StepBuilder {
    fn new(base: &[GridCell]) -> Self {
        Self {
            cells: base.to_vec(),
            steps: Vec::new(),
        }
    }

    fn introduce(&mut self, cell: &GridCell) {
        self.cells.push(cell.clone());
    }

    fn set_content(&mut self, id: &str, content: &str) {
        if let Some(cell) = self.cells.iter_mut().find(|c| c.id == id) {
            cell.content = content.to_string();
        }
    }

    fn push(&mut self, kind: StepKind, explanation: String, emphasis: Emphasis<'_>) {
        let fresh: HashSet<&str> = emphasis.fresh.iter().copied().collect();
        let operands: HashSet<&str> = emphasis.operands.iter().copied().collect();
        let minuends: HashSet<&str> = emphasis.minuends.iter().copied().collect();
        let subtrahends: HashSet<&str> = emphasis.subtrahends.iter().copied().collect();
        let hidden: HashSet<&str> = emphasis.hidden.iter().copied().collect();

        let cells = self
            .cells
            .iter()
            .map(|cell| {
                let mut cell = cell.clone();
                let id = cell.id.as_str();
                let is_hidden = hidden.contains(id);
                let is_fresh = fresh.contains(id) && !is_hidden;
                cell.flags.hidden = is_hidden;
                cell.flags.fade_in = is_fresh;
                cell.flags.animate_in = is_fresh && cell.role == CellRole::BroughtDown;
                cell.flags.operand = !is_hidden && operands.contains(id);
                cell.flags.minuend = !is_hidden && minuends.contains(id);
                cell.flags.subtrahend = !is_hidden && subtrahends.contains(id);
                cell
            })
            .collect();

        self.steps.push(Step {
            kind,
            explanation,
            cells,
            question: emphasis.question,
            show_subtraction_lines: emphasis.show_subtraction_lines,
        });
    }
}

fn ids(cells: &[GridCell]) -> Vec<&str> {
    cells.iter().map(|c| c.id.as_str()).collect()
}

/// Run engine, planner and sequencer for a problem.
pub fn build(problem: &Problem) -> Walkthrough {
    let trace = engine::divide(problem);
    let grid = layout::plan(problem, &trace);
    let divisor = problem.divisor();
    let divisor_ids: Vec<&str> = grid.divisor_cells.iter().map(String::as_str).collect();

    let mut builder = StepBuilder::new(&grid.base);
    builder.push(
        StepKind::Intro,
        format!("We want to divide {} by {}", problem.dividend(), divisor),
        Emphasis {
            fresh: ids(&grid.base),
            ..Default::default()
        },
    );

    for (pos, placed) in trace.positions.iter().zip(&grid.positions) {
        push_position(&mut builder, pos, placed, &divisor_ids, divisor);
    }

    let mut explanation = format!(
        "The division is complete. {} ÷ {} = {}",
        problem.dividend(),
        divisor,
        trace.quotient
    );
    if trace.remainder > 0 {
        explanation.push_str(&format!(" with remainder {}", trace.remainder));
    }
    let mut fresh = Vec::new();
    if let Some(zero) = &grid.empty_quotient {
        builder.introduce(zero);
        fresh.push(zero.id.as_str());
    }
    builder.push(
        StepKind::Complete,
        explanation,
        Emphasis {
            fresh,
            ..Default::default()
        },
    );

    tracing::debug!(
        problem = %problem,
        steps = builder.steps.len(),
        quotient = %trace.quotient,
        remainder = %trace.remainder,
        "built walkthrough"
    );

    Walkthrough {
        problem: problem.clone(),
        quotient: trace.quotient,
        remainder: trace.remainder,
        dimensions: grid.dimensions,
        steps: builder.steps,
    }
}

fn push_position(
    builder: &mut StepBuilder,
    pos: &PositionTrace,
    placed: &PositionLayout,
    divisor_ids: &[&str],
    divisor: u64,
) {
    let working_ids: Vec<&str> = placed.working_cells.iter().map(String::as_str).collect();

    builder.introduce(&placed.brought_down);
    builder.push(
        StepKind::BringDown,
        format!(
            "Bring down {}. Our working number is now {}",
            pos.digit, pos.working
        ),
        Emphasis {
            fresh: vec![placed.brought_down.id.as_str()],
            ..Default::default()
        },
    );

    let Some(quotient) = &placed.quotient else {
        // Leading zero quotient digit: keep bringing digits down.
        return;
    };
    builder.introduce(quotient);

    let Some(divide) = &placed.divide else {
        builder.push(
            StepKind::WriteZero,
            format!(
                "{} is less than {}, so we write 0 in the quotient",
                pos.working, divisor
            ),
            Emphasis {
                fresh: vec![quotient.id.as_str()],
                operands: working_ids,
                ..Default::default()
            },
        );
        return;
    };

    let mut divide_operands = working_ids.clone();
    divide_operands.extend_from_slice(divisor_ids);
    builder.push(
        StepKind::Divide,
        format!(
            "{} goes into {} {} times",
            divisor, pos.working, pos.quotient_digit
        ),
        Emphasis {
            fresh: vec![quotient.id.as_str()],
            operands: divide_operands,
            ..Default::default()
        },
    );

    push_multiplication(builder, pos, divide, quotient, divisor_ids, divisor);
    push_subtraction(builder, pos, divide, &working_ids);
}

fn push_multiplication(
    builder: &mut StepBuilder,
    pos: &PositionTrace,
    divide: &DivideLayout,
    quotient: &GridCell,
    divisor_ids: &[&str],
    divisor: u64,
) {
    let product_ids = ids(&divide.product);
    for cell in &divide.product {
        builder.introduce(cell);
    }
    builder.introduce(&divide.operator);

    let mut operands = vec![quotient.id.as_str()];
    operands.extend_from_slice(divisor_ids);
    builder.push(
        StepKind::MultiplyQuestion,
        format!("What is {} × {}?", pos.quotient_digit, divisor),
        Emphasis {
            fresh: vec![divide.operator.id.as_str()],
            operands,
            hidden: product_ids.clone(),
            question: Some(QuestionKind::Multiplication),
            ..Default::default()
        },
    );

    builder.push(
        StepKind::MultiplyAnswer,
        format!("{} × {} = {}", pos.quotient_digit, divisor, pos.product),
        Emphasis {
            fresh: product_ids,
            ..Default::default()
        },
    );
}

fn push_subtraction(
    builder: &mut StepBuilder,
    pos: &PositionTrace,
    divide: &DivideLayout,
    working_ids: &[&str],
) {
    let product_ids = ids(&divide.product);
    let difference_ids = ids(&divide.difference);
    for cell in &divide.difference {
        builder.introduce(cell);
    }
    builder.set_content(&divide.operator.id, MINUS_SYMBOL);

    let mut operands = working_ids.to_vec();
    operands.extend_from_slice(&product_ids);
    builder.push(
        StepKind::SubtractQuestion,
        format!("What is {} − {}?", pos.working, pos.product),
        Emphasis {
            fresh: vec![divide.operator.id.as_str()],
            operands,
            minuends: working_ids.to_vec(),
            subtrahends: product_ids,
            hidden: difference_ids.clone(),
            question: Some(QuestionKind::Subtraction),
            ..Default::default()
        },
    );

    builder.push(
        StepKind::SubtractAnswer,
        format!("{} − {} = {}", pos.working, pos.product, pos.remainder),
        Emphasis {
            fresh: difference_ids,
            show_subtraction_lines: true,
            ..Default::default()
        },
    );
}
