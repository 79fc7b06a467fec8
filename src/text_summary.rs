//! Text rendering of walkthroughs for CLI output.
//!
//! Turns grid cells into plain text rows and formats human-readable lines for
//! text mode.

use crate::layout::{QUOTIENT_ROW, VINCULUM_SYMBOL};
use crate::model::{CellRole, GridCell, GridDimensions, Step, Walkthrough};
use std::collections::HashSet;

/// Pre-formatted lines for text output.
pub struct TextSummary {
    pub lines: Vec<String>,
}

/// Expand sparse cells into a full row-major matrix, filling gaps with blanks.
pub fn dense_rows(cells: &[GridCell], dimensions: GridDimensions) -> Vec<Vec<GridCell>> {
    let rows = cells
        .iter()
        .map(|c| c.row + 1)
        .max()
        .unwrap_or(0)
        .max(dimensions.rows);
    let columns = cells
        .iter()
        .map(|c| c.column + 1)
        .max()
        .unwrap_or(0)
        .max(dimensions.columns);

    let mut grid: Vec<Vec<GridCell>> = (0..rows)
        .map(|r| {
            (0..columns)
                .map(|c| GridCell::new(format!("blank-{r}-{c}"), " ", r, c, CellRole::Blank))
                .collect()
        })
        .collect();
    for cell in cells {
        grid[cell.row][cell.column] = cell.clone();
    }
    grid
}

fn glyph(cell: &GridCell) -> &str {
    if cell.flags.hidden {
        "?"
    } else {
        &cell.content
    }
}

/// Render cells as text rows, from the quotient row down to the last used row.
///
/// Hidden answer cells show as `?`. A rule is drawn under every product whose
/// subtraction result is already visible.
pub fn render_grid(cells: &[GridCell], dimensions: GridDimensions) -> Vec<String> {
    let Some(last_row) = cells.iter().map(|c| c.row).max() else {
        return Vec::new();
    };
    let grid = dense_rows(cells, dimensions);
    let result_rows: HashSet<usize> = cells
        .iter()
        .filter(|c| c.role == CellRole::SubtractionResult && c.is_visible())
        .map(|c| c.row)
        .collect();

    let mut lines = Vec::new();
    for (r, row) in grid.iter().enumerate().take(last_row + 1).skip(QUOTIENT_ROW) {
        let line: String = row.iter().map(glyph).collect();
        lines.push(line.trim_end().to_string());

        let product_columns: Vec<usize> = row
            .iter()
            .filter(|c| c.role == CellRole::Product && c.is_visible())
            .map(|c| c.column)
            .collect();
        if let (Some(&lo), Some(&hi)) = (product_columns.iter().min(), product_columns.iter().max()) {
            if result_rows.contains(&(r + 1)) {
                let rule: String = (0..=hi)
                    .map(|c| if c >= lo { VINCULUM_SYMBOL } else { " " })
                    .collect();
                lines.push(rule);
            }
        }
    }
    lines
}

/// Render one step: its number, explanation and optionally its grid.
pub fn format_step(index: usize, step: &Step, dimensions: GridDimensions, with_grid: bool) -> Vec<String> {
    let marker = if step.is_question() { "?" } else { "." };
    let mut lines = vec![format!("{:>3}{marker} {}", index + 1, step.explanation)];
    if with_grid {
        lines.extend(render_grid(&step.cells, dimensions).into_iter().map(|l| format!("      {l}")));
        lines.push(String::new());
    }
    lines
}

/// Build a text summary: every step explanation, then the finished grid.
pub fn build_text_summary(walkthrough: &Walkthrough) -> TextSummary {
    let mut lines = vec![format!("Long division: {}", walkthrough.problem)];

    for (i, step) in walkthrough.steps.iter().enumerate() {
        lines.extend(format_step(i, step, walkthrough.dimensions, false));
    }

    lines.extend(closing_lines(walkthrough, true));
    TextSummary { lines }
}

/// Lines printed after the steps: optionally the finished grid, then the result.
pub fn closing_lines(walkthrough: &Walkthrough, with_grid: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if with_grid {
        if let Some(last) = walkthrough.last_step() {
            lines.push(String::new());
            lines.extend(render_grid(&last.cells, walkthrough.dimensions));
        }
    }
    lines.push(String::new());
    lines.push(format!(
        "Quotient: {}  Remainder: {}",
        walkthrough.quotient, walkthrough.remainder
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Problem;
    use crate::sequencer;

    fn walk(dividend: &str, divisor: &str) -> Walkthrough {
        sequencer::build(&Problem::parse(dividend, divisor).unwrap())
    }

    #[test]
    fn renders_finished_grid() {
        let w = walk("84", "3");
        let lines = render_grid(&w.last_step().unwrap().cells, w.dimensions);
        assert_eq!(
            lines,
            vec![
                "   28", "   ──", " 3|84", "   8", "  −6", "   ─", "   24", "  −24", "   ──",
                "    0",
            ]
        );
    }

    #[test]
    fn hidden_cells_render_as_question_marks() {
        let w = walk("84", "3");
        let question = &w.steps[3];
        let lines = render_grid(&question.cells, w.dimensions);
        assert!(lines.contains(&"  ×?".to_string()), "{lines:?}");
    }

    #[test]
    fn dense_rows_fill_gaps_with_blanks() {
        let w = walk("7", "3");
        let rows = dense_rows(&w.steps[0].cells, w.dimensions);
        assert_eq!(rows.len(), w.dimensions.rows);
        assert!(rows.iter().all(|r| r.len() == w.dimensions.columns));
        assert_eq!(rows[0][0].role, CellRole::Blank);
        assert_eq!(rows[3][1].content, "3");
    }

    #[test]
    fn summary_ends_with_result() {
        let w = walk("7", "3");
        let summary = build_text_summary(&w);
        assert_eq!(summary.lines[0], "Long division: 7 ÷ 3");
        assert_eq!(
            summary.lines.last().map(String::as_str),
            Some("Quotient: 2  Remainder: 1")
        );
        assert!(summary
            .lines
            .iter()
            .any(|l| l.ends_with("What is 2 × 3?") && l.contains('?')));
    }

    #[test]
    fn closing_lines_always_end_with_result() {
        let w = walk("84", "3");
        let bare = closing_lines(&w, false);
        assert_eq!(bare, vec!["".to_string(), "Quotient: 28  Remainder: 0".into()]);

        let full = closing_lines(&w, true);
        assert_eq!(full.last(), bare.last());
        assert!(full.contains(&" 3|84".to_string()));
        assert!(build_text_summary(&w).lines.ends_with(&full));
    }

    #[test]
    fn empty_cells_render_nothing() {
        assert!(render_grid(&[], GridDimensions { columns: 0, rows: 0 }).is_empty());
    }
}
