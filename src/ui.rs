use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use mmdpad_core::{DiagramType, system_templates};
use mmdpad_export::ExportFormat;

use crate::app::{App, Dialog, Pane, View};

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(1),    // View body
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    match app.view {
        View::Editor => render_editor(frame, app, chunks[1]),
        View::Dashboard => render_dashboard(frame, app, chunks[1]),
        View::Templates => render_templates(frame, app, chunks[1]),
    }
    render_status_bar(frame, app, chunks[2]);
    render_help_bar(frame, app, chunks[3]);

    if let Some(dialog) = &app.dialog {
        render_dialog(frame, app, dialog, chunks[1]);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let tab = |label: &'static str, view: View| {
        if app.view == view {
            Span::styled(
                format!(" {label} "),
                Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(format!(" {label} "), Style::default().fg(Color::Gray))
        }
    };
    let line = Line::from(vec![
        Span::styled(" mmdpad ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        tab("Editor", View::Editor),
        tab("Dashboard", View::Dashboard),
        tab("Templates", View::Templates),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let color = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

fn render_editor(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(rows[1]);

    // Title field
    let title_focused = app.pane == Pane::Title && app.dialog.is_none();
    let title = Paragraph::new(app.title.as_str()).block(pane_block(" Title ".into(), title_focused));
    frame.render_widget(title, rows[0]);
    if title_focused {
        let x = rows[0].x + 1 + app.title.chars().count() as u16;
        frame.set_cursor_position(Position::new(x.min(rows[0].right().saturating_sub(2)), rows[0].y + 1));
    }

    render_code(frame, app, columns[0]);
    render_preview(frame, app, columns[1]);
}

fn render_code(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.pane == Pane::Code && app.dialog.is_none();
    let block = pane_block(" Code ".into(), focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let content = app.content();
    let total = content.split('\n').count();
    let gutter = total.to_string().len().max(2);
    let height = inner.height as usize;
    let scroll = (app.cursor.line + 1).saturating_sub(height);

    let lines: Vec<Line> = content
        .split('\n')
        .enumerate()
        .skip(scroll)
        .take(height)
        .map(|(i, text)| {
            let number_style = if i == app.cursor.line {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::from(vec![
                Span::styled(format!("{:>gutter$} ", i + 1), number_style),
                Span::raw(text.to_string()),
            ])
        })
        .collect();

    if content.is_empty() && !focused {
        let hint = Paragraph::new("Start typing a Mermaid diagram, or press Ctrl+T for templates")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hint, inner);
    } else {
        frame.render_widget(Paragraph::new(lines), inner);
    }

    if focused {
        let x = inner.x + (gutter + 1 + app.cursor.col) as u16;
        let y = inner.y + (app.cursor.line - scroll) as u16;
        if x < inner.right() && y < inner.bottom() {
            frame.set_cursor_position(Position::new(x, y));
        }
    }
}

fn render_preview(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.pane == Pane::Preview && app.dialog.is_none();
    let block = pane_block(" Preview ".into(), focused);

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Type     ", label),
            Span::styled(
                app.preview.diagram_type.name(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![Span::styled("Lines    ", label), Span::raw(app.preview.lines.to_string())]),
        Line::from(vec![Span::styled("Chars    ", label), Span::raw(app.preview.chars.to_string())]),
    ];

    if let Some(diagram) = &app.diagram {
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled("Updated  ", label),
            Span::raw(diagram.updated_at.format("%Y-%m-%d %H:%M").to_string()),
        ]));
        let sharing = if diagram.is_public { "public" } else { "private" };
        lines.push(Line::from(vec![Span::styled("Sharing  ", label), Span::raw(sharing)]));
        lines.push(Line::from(vec![
            Span::styled("Views    ", label),
            Span::raw(diagram.view_count.to_string()),
        ]));
    }

    if app.content().trim().is_empty() {
        lines.push(Line::default());
        lines.push(Line::styled("Nothing to preview yet", label));
    } else if app.preview.diagram_type == DiagramType::Flowchart
        && !app.content().trim_start().to_lowercase().starts_with("flowchart")
        && !app.content().trim_start().to_lowercase().starts_with("graph")
    {
        lines.push(Line::default());
        lines.push(Line::styled(
            "No diagram keyword found, treating as flowchart",
            Style::default().fg(Color::Yellow),
        ));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn selected_style(selected: bool) -> Style {
    if selected {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    }
}

fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let mut title = format!(" My Diagrams ({}) ", app.diagrams.len());
    if !app.recent_files.is_empty() {
        let recent: Vec<&str> = app.recent_files.iter().take(3).map(|r| r.title.as_str()).collect();
        title.push_str(&format!("- recent ({}): {} ", app.recent_files.len(), recent.join(", ")));
    }
    let block = pane_block(title, true);

    if app.diagrams.is_empty() {
        let empty = Paragraph::new("No diagrams yet. Press [n] for a new one or [t] for templates.")
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<Line> = app
        .diagrams
        .iter()
        .enumerate()
        .map(|(i, diagram)| {
            let shared = if diagram.is_public { " [shared]" } else { "" };
            let marker = if app.recent_files.contains(diagram.id) { "*" } else { " " };
            Line::styled(
                format!(
                    "{}{:<32} {:<18} {}{} ",
                    marker,
                    diagram.title,
                    diagram.diagram_type.name(),
                    diagram.updated_at.format("%Y-%m-%d %H:%M"),
                    shared
                ),
                selected_style(i == app.selected),
            )
        })
        .collect();

    frame.render_widget(Paragraph::new(items).block(block), area);
}

fn render_templates(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let templates = system_templates();
    let items: Vec<Line> = templates
        .iter()
        .enumerate()
        .map(|(i, template)| {
            Line::styled(
                format!(" {:<24} {} ", template.title, template.category.name()),
                selected_style(i == app.selected),
            )
        })
        .collect();
    frame.render_widget(
        Paragraph::new(items).block(pane_block(" Templates ".into(), true)),
        columns[0],
    );

    if let Some(template) = templates.get(app.selected) {
        let mut lines = vec![
            Line::styled(template.description, Style::default().fg(Color::Gray)),
            Line::default(),
        ];
        lines.extend(template.content.lines().map(|l| Line::raw(l.to_string())));
        let preview = Paragraph::new(lines)
            .block(pane_block(format!(" {} ", template.diagram_type.name()), false));
        frame.render_widget(preview, columns[1]);
    }
}

/// Status bar with view indicator, document state and history
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (view_name, view_bg) = match (&app.dialog, app.view) {
        (Some(_), _) => ("MENU", Color::Magenta),
        (None, View::Editor) => match app.pane {
            Pane::Title | Pane::Code => ("INS", Color::Green),
            Pane::Preview => ("NOR", Color::Blue),
        },
        (None, View::Dashboard) => ("LIST", Color::Cyan),
        (None, View::Templates) => ("TMPL", Color::Yellow),
    };

    let view_style = Style::default()
        .fg(Color::Black)
        .bg(view_bg)
        .add_modifier(Modifier::BOLD);

    let dirty_marker = if app.is_modified() { " *" } else { "" };
    let saved = if app.diagram.is_some() { "" } else { " [unsaved]" };

    let history = format!(
        " undo:{} redo:{} {}/{}",
        if app.history.can_undo() { "yes" } else { "no" },
        if app.history.can_redo() { "yes" } else { "no" },
        app.history.history_size(),
        app.history.max_history().saturating_add(1),
    );

    let status_text = app
        .status_message
        .as_ref()
        .map(|m| format!(" | {}", m))
        .unwrap_or_default();

    let spans = vec![
        Span::styled(format!(" {} ", view_name), view_style),
        Span::raw(format!(
            " {}{}{}{}{}",
            app.title, dirty_marker, saved, history, status_text
        )),
    ];

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}

fn render_help_bar(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = match (&app.dialog, app.view) {
        (Some(Dialog::Export { .. }), _) => "[j/k] choose [1-3] pick [Enter] export [Esc] cancel",
        (Some(Dialog::Share), _) => "[Enter] toggle public link [Esc] close",
        (Some(Dialog::ConfirmNew | Dialog::ConfirmDelete { .. }), _) => "[y] confirm [n] cancel",
        (Some(Dialog::Help), _) => "[Enter] or [Esc] close",
        (None, View::Editor) => match app.pane {
            Pane::Title | Pane::Code => {
                "^S save ^E export ^P share | [Tab] next pane [Esc] preview | ^Q quit"
            }
            Pane::Preview => "^Z undo ^Y redo ^N new ^O dashboard ^T templates [?] help | [Enter] edit",
        },
        (None, View::Dashboard) => "[j/k] navigate [Enter] open [d]elete [n]ew [t]emplates [?] help [q]uit",
        (None, View::Templates) => "[j/k] navigate [Enter] use [n] blank [Esc] dashboard [q]uit",
    };

    let paragraph = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

/// Centered popup area, cleared to the background colour
fn popup(frame: &mut Frame, area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height);
    let x = (area.width.saturating_sub(width)) / 2 + area.x;
    let y = (area.height.saturating_sub(height)) / 2 + area.y;
    let popup_area = Rect::new(x, y, width, height);

    for py in popup_area.y..popup_area.bottom() {
        for px in popup_area.x..popup_area.right() {
            frame.buffer_mut()[(px, py)]
                .set_char(' ')
                .set_style(Style::default().bg(Color::Black));
        }
    }
    popup_area
}

fn render_dialog(frame: &mut Frame, app: &App, dialog: &Dialog, area: Rect) {
    let (title, lines): (&str, Vec<Line>) = match dialog {
        Dialog::Help => {
            let lines = app
                .shortcut_rows()
                .into_iter()
                .map(|(chord, description)| {
                    Line::from(vec![
                        Span::styled(format!(" {:<16}", chord), Style::default().fg(Color::Cyan)),
                        Span::raw(description),
                    ])
                })
                .collect();
            (" Keyboard Shortcuts ", lines)
        }
        Dialog::Export { selected } => {
            let lines = ExportFormat::ALL
                .iter()
                .enumerate()
                .map(|(i, format)| {
                    Line::styled(
                        format!(" {}. {} (.{}) ", i + 1, format.label(), format.extension()),
                        selected_style(i == *selected),
                    )
                })
                .collect();
            (" Export Diagram ", lines)
        }
        Dialog::Share => {
            let mut lines = Vec::new();
            if let Some(diagram) = &app.diagram {
                if diagram.is_public {
                    lines.push(Line::styled(" Anyone with the token can view:", Style::default().fg(Color::Green)));
                    lines.push(Line::raw(format!(" {}", diagram.share_token.as_deref().unwrap_or_default())));
                    lines.push(Line::default());
                    lines.push(Line::raw(format!(" mmdpad view <token>   ({} views)", diagram.view_count)));
                } else {
                    lines.push(Line::raw(" This diagram is private."));
                    lines.push(Line::raw(" Press Enter to create a public link."));
                }
            }
            (" Share Diagram ", lines)
        }
        Dialog::ConfirmNew => (
            " New Diagram ",
            vec![
                Line::raw(" Start a new diagram?"),
                Line::styled(" Unsaved changes will be lost.", Style::default().fg(Color::Yellow)),
            ],
        ),
        Dialog::ConfirmDelete { title, .. } => (
            " Delete Diagram ",
            vec![
                Line::raw(format!(" Delete \"{}\"?", title)),
                Line::styled(" This cannot be undone.", Style::default().fg(Color::Red)),
            ],
        ),
    };

    let width = lines.iter().map(|l| l.width() as u16).max().unwrap_or(0).max(title.len() as u16) + 4;
    let popup_area = popup(frame, area, width.max(40), lines.len() as u16 + 2);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};

    use mmdpad_core::DiagramStore;

    use super::*;
    use crate::config::Config;
    use crate::recent_files::RecentFiles;

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn dashboard_lists_recent_diagrams() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiagramStore::open(dir.path()).unwrap();
        let recent = RecentFiles::load_from(dir.path().join("recent.json"));
        let mut app = App::new(Config::default(), store, recent);
        app.history.set("pie".to_string());
        app.save();
        app.show_dashboard();

        let screen = draw(&app);
        assert!(screen.contains("recent (1): Untitled Diagram"));
        assert!(screen.contains("*Untitled Diagram"));
    }

    #[test]
    fn status_bar_survives_unbounded_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiagramStore::open(dir.path()).unwrap();
        let config = Config {
            max_history: usize::MAX,
            ..Config::default()
        };
        let app = App::new(config, store, RecentFiles::load_from(dir.path().join("recent.json")));

        let screen = draw(&app);
        assert!(screen.contains(&format!("1/{}", usize::MAX)));
    }
}
