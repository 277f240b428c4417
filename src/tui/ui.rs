use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::app::{App, View};
use crate::client::StatsTransport;
use crate::display::{Content, ErrorKind, Visibility, LOADING_MESSAGE};
use crate::export;
use crate::models::{FragmentItem, PageFragment};

const ACCENT: Color = Color::Cyan;
const DIM: Color = Color::DarkGray;
const COMPLETE_COLOR: Color = Color::Green;
const ERROR_COLOR: Color = Color::Red;
const PROGRESS_COLOR: Color = Color::Yellow;

pub fn render<T: StatsTransport>(frame: &mut Frame, app: &App<T>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Report page
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_content(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);

    match app.view {
        View::About => render_about_overlay(frame),
        View::Export => render_export_overlay(frame, app),
        View::Main => {}
    }
}

fn render_header<T: StatsTransport>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let trigger = &app.controller.display().trigger;
    let trigger_color = if trigger.is_enabled() {
        COMPLETE_COLOR
    } else {
        PROGRESS_COLOR
    };

    let text = vec![Line::from(vec![
        Span::styled("File: ", Style::default().fg(DIM)),
        Span::styled(
            app.upload.filename.as_str(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Server: ", Style::default().fg(DIM)),
        Span::styled(app.server_url.as_str(), Style::default().fg(DIM)),
        Span::raw("  "),
        Span::styled(format!("[{}]", trigger.label()), Style::default().fg(trigger_color)),
    ])];

    let block = Block::default()
        .title(Span::styled(
            " Wrapped ",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));

    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_content<T: StatsTransport>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let display = app.controller.display();
    let background = display
        .background
        .as_deref()
        .and_then(|name| name.parse::<Color>().ok())
        .unwrap_or(Color::Reset);
    let text_color = match display.visibility {
        Visibility::Visible => Color::White,
        Visibility::FadingOut | Visibility::FadingIn => DIM,
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .style(Style::default().bg(background));

    let lines: Vec<Line> = match &display.content {
        Content::Empty => vec![Line::from(Span::styled(
            "Press [s] to submit your library export.",
            Style::default().fg(DIM),
        ))],
        Content::Loading => vec![Line::from(Span::styled(
            LOADING_MESSAGE,
            Style::default().fg(PROGRESS_COLOR),
        ))],
        Content::Error {
            kind,
            title,
            message,
        } => {
            block = block.title(Span::styled(
                format!(" {} ", title),
                Style::default().fg(ERROR_COLOR).add_modifier(Modifier::BOLD),
            ));
            let hint = match kind {
                ErrorKind::Network | ErrorKind::Application => "Press [s] to try again.",
                ErrorKind::Render => "Press [s] to resubmit.",
            };
            vec![
                Line::from(Span::styled(message.as_str(), Style::default().fg(ERROR_COLOR))),
                Line::from(""),
                Line::from(Span::styled(hint, Style::default().fg(DIM))),
            ]
        }
        Content::Report { page, index, count } => {
            if *count > 1 {
                block = block.title(Span::styled(
                    format!(" Page {}/{} ", index + 1, count),
                    Style::default().fg(DIM),
                ));
            }
            page.iter()
                .flat_map(|fragment| fragment_lines(fragment, text_color))
                .collect()
        }
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn fragment_lines(fragment: &PageFragment, text_color: Color) -> Vec<Line<'_>> {
    let mut lines = vec![Line::from(Span::styled(
        fragment.heading.as_str(),
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    ))];
    if let Some(ref subtitle) = fragment.subtitle {
        lines.push(Line::from(Span::styled(subtitle.as_str(), Style::default().fg(DIM))));
    }
    lines.push(Line::from(""));

    for item in &fragment.items {
        lines.push(match item {
            FragmentItem::Stat { label, value } => Line::from(vec![
                Span::styled(format!("{}: ", label), Style::default().fg(DIM)),
                Span::styled(
                    value.as_str(),
                    Style::default().fg(text_color).add_modifier(Modifier::BOLD),
                ),
            ]),
            FragmentItem::Row { rank, text } => Line::from(vec![
                Span::styled(format!("{:>3}) ", rank), Style::default().fg(ACCENT)),
                Span::styled(text.as_str(), Style::default().fg(text_color)),
            ]),
        });
    }
    lines.push(Line::from(""));
    lines
}

fn render_footer<T: StatsTransport>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let display = app.controller.display();
    let keys = match app.view {
        View::Main => {
            let mut keys = vec!["[s]ubmit"];
            if display.advance_armed() {
                keys.push("[n]ext");
            }
            if !display.trigger.is_enabled() {
                keys.push("[c]ancel");
            }
            if app.controller.report().is_some() {
                keys.push("[e]xport");
            }
            keys.push("[a]bout");
            keys.push("[q]uit");
            keys.join("  ")
        }
        View::About | View::Export => "[Esc] close".to_string(),
    };
    let footer = Paragraph::new(keys)
        .style(Style::default().fg(DIM))
        .alignment(Alignment::Center);
    frame.render_widget(footer, area);
}

fn render_about_overlay(frame: &mut Frame) {
    let area = centered_rect(44, 9, frame.area());
    frame.render_widget(Clear, area);

    let text = vec![
        Line::from(Span::styled(
            "Wrapped",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Version {}", env!("CARGO_PKG_VERSION"))),
        Line::from(""),
        Line::from("Listening statistics for your library."),
        Line::from(""),
        Line::from(Span::styled("[Esc] close", Style::default().fg(DIM))),
    ];

    let block = Block::default()
        .title(" About ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, area);
}

fn render_export_overlay<T: StatsTransport>(frame: &mut Frame, app: &App<T>) {
    let area = centered_rect(56, 10, frame.area());
    frame.render_widget(Clear, area);

    let output_path = export::report_path(&app.path, app.export_format);

    let mut text = vec![
        Line::from(Span::styled(
            "Export Report",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Format: ", Style::default().fg(DIM)),
            Span::styled(app.export_format.name(), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::styled("Output: ", Style::default().fg(DIM)),
            Span::styled(
                output_path.display().to_string(),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "[Tab] cycle format  [Enter] save  [Esc] cancel",
            Style::default().fg(DIM),
        )),
    ];

    if let Some(ref msg) = app.export_message {
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(
            msg.as_str(),
            Style::default().fg(COMPLETE_COLOR),
        )));
    }

    let block = Block::default()
        .title(" Export ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
