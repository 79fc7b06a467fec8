use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: &'static str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(pad),
        Span::raw(action),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        key_line("space", "       ", "Next step (also Enter, →, n)"),
        key_line("r", "           ", "Restart from the first step"),
        key_line("x", "           ", "Clear the problem"),
        key_line("?", "           ", "Show / hide this help"),
        Line::from(""),
        Line::from("Colors:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("operand", Style::default().fg(Color::Yellow)),
            Span::raw("  "),
            Span::styled("minuend", Style::default().fg(Color::Cyan)),
            Span::raw("  "),
            Span::styled("subtrahend", Style::default().fg(Color::Magenta)),
            Span::raw("  "),
            Span::styled("new", Style::default().fg(Color::Green)),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("?", Style::default().fg(Color::DarkGray)),
            Span::raw(" marks the answer to the current question"),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}
