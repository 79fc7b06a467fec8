mod help;
mod state;

use crate::cli::{build_config, handle_exports, Cli};
use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use long_division::layout::{QUOTIENT_ROW, VINCULUM_SYMBOL};
use long_division::model::{CellRole, GridCell, Problem, QuestionKind};
use long_division::text_summary::dense_rows;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Terminal,
};
use state::UiState;
use std::collections::HashSet;
use std::{io, time::Duration, time::Instant};

pub async fn run(args: Cli, problem: Problem) -> Result<()> {
    let cfg = build_config(&args);
    if args.export_json.is_some() {
        handle_exports(&args, &cfg, &long_division::sequencer::build(&problem))?;
    }
    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    tokio::task::spawn_blocking(move || run_threaded(UiState::new(problem, cfg)))
        .await
        .context("TUI thread panicked")?
}

/// Run the TUI loop on a blocking thread.
fn run_threaded(mut state: UiState) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let res = event_loop(&mut terminal, &mut state);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen, Show).ok();
    res
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut UiState,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    state.restart(Instant::now());

    loop {
        state.tick(Instant::now());
        state.drain_events();
        terminal.draw(|f| draw(f.area(), f, state)).ok();

        // Poll input until the next reveal timer is due so transitions stay on time.
        let timeout = state.next_deadline(Instant::now(), tick_rate);
        if !event::poll(timeout).unwrap_or(false) {
            continue;
        }
        let Ok(Event::Key(k)) = event::read() else {
            continue;
        };
        if k.kind != KeyEventKind::Press {
            continue;
        }
        let now = Instant::now();
        match (k.modifiers, k.code) {
            (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                return Ok(());
            }
            (_, KeyCode::Char(' '))
            | (_, KeyCode::Enter)
            | (_, KeyCode::Right)
            | (_, KeyCode::Char('n')) => {
                if state.show_help {
                    state.show_help = false;
                } else {
                    state.advance(now);
                }
            }
            (_, KeyCode::Char('r')) => state.restart(now),
            (_, KeyCode::Char('x')) => state.reset(),
            (_, KeyCode::Char('?')) => state.show_help = !state.show_help,
            (_, KeyCode::Esc) => state.show_help = false,
            _ => {}
        }
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(6),
                Constraint::Length(4),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    draw_grid(chunks[0], f, state);
    draw_explanation(chunks[1], f, state);
    draw_status(chunks[2], f, state);

    if state.show_help {
        let help_area = centered(area, 60, 18);
        help::draw_help(help_area, f);
    }
}

fn cell_style(cell: &GridCell, animating: bool) -> Style {
    let base = match cell.role {
        CellRole::QuotientDigit => Style::default().add_modifier(Modifier::BOLD),
        CellRole::Vinculum | CellRole::Operator => Style::default().fg(Color::Gray),
        _ => Style::default(),
    };
    if cell.flags.hidden {
        return Style::default().fg(Color::DarkGray);
    }
    if cell.flags.minuend {
        return base.fg(Color::Cyan).add_modifier(Modifier::BOLD);
    }
    if cell.flags.subtrahend {
        return base.fg(Color::Magenta).add_modifier(Modifier::BOLD);
    }
    if cell.flags.operand {
        return base.fg(Color::Yellow).add_modifier(Modifier::BOLD);
    }
    if animating && cell.flags.is_animating() {
        return base.fg(Color::Green).add_modifier(Modifier::BOLD);
    }
    base
}

fn draw_grid(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let cells = state.playback.cells();
    let title = state
        .playback
        .problem()
        .map(|p| format!("long-division: {p}"))
        .unwrap_or_else(|| "long-division".into());
    let block = Block::default().borders(Borders::ALL).title(title);

    let Some(last_row) = cells.iter().map(|c| c.row).max() else {
        f.render_widget(
            Paragraph::new("No problem loaded. Press r to start.").block(block),
            area,
        );
        return;
    };

    let animating = cells.iter().any(|c| c.flags.is_animating());
    let rule_style = if state.playback.show_subtraction_lines() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    let result_rows: HashSet<usize> = cells
        .iter()
        .filter(|c| c.role == CellRole::SubtractionResult && c.is_visible())
        .map(|c| c.row)
        .collect();

    let mut lines: Vec<Line<'static>> = Vec::new();
    let rows = dense_rows(&cells, state.playback.dimensions());
    for (r, row) in rows.iter().enumerate().take(last_row + 1).skip(QUOTIENT_ROW) {
        let spans: Vec<Span<'static>> = row
            .iter()
            .map(|cell| {
                let text = if cell.flags.hidden {
                    "?".to_string()
                } else {
                    cell.content.clone()
                };
                Span::styled(format!(" {text}"), cell_style(cell, animating))
            })
            .collect();
        lines.push(Line::from(spans));

        let product_columns: Vec<usize> = row
            .iter()
            .filter(|c| c.role == CellRole::Product && c.is_visible())
            .map(|c| c.column)
            .collect();
        if let (Some(&lo), Some(&hi)) = (product_columns.iter().min(), product_columns.iter().max()) {
            if result_rows.contains(&(r + 1)) {
                let rule: String = (0..=hi)
                    .map(|c| {
                        if c >= lo {
                            format!("{VINCULUM_SYMBOL}{VINCULUM_SYMBOL}")
                        } else {
                            "  ".to_string()
                        }
                    })
                    .collect();
                lines.push(Line::from(Span::styled(rule, rule_style)));
            }
        }
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_explanation(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let (title, style) = match state.playback.question_kind() {
        Some(QuestionKind::Multiplication) => ("Question: multiply", Style::default().fg(Color::Yellow)),
        Some(QuestionKind::Subtraction) => ("Question: subtract", Style::default().fg(Color::Yellow)),
        None if state.playback.is_complete() => ("Complete", Style::default().fg(Color::Green)),
        None => ("Explanation", Style::default()),
    };
    let p = Paragraph::new(Line::from(Span::styled(
        state.playback.explanation().to_string(),
        style.add_modifier(Modifier::BOLD),
    )))
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, area);
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let progress = match state.playback.active_step() {
        Some(i) => format!("Step {}/{}", i + 1, state.playback.step_count()),
        None => "No steps".to_string(),
    };
    let hint = if state.playback.is_question() {
        "space: show answer"
    } else if state.playback.can_advance() {
        "space: next"
    } else {
        "r: restart"
    };
    let line = Line::from(vec![
        Span::styled(progress, Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(hint, Style::default().fg(Color::Magenta)),
        Span::raw("  ?: help  q: quit  "),
        Span::styled(state.info.clone(), Style::default().fg(Color::Gray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
