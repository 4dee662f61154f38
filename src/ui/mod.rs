use std::sync::OnceLock;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect, Alignment},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::{App, Popup, Section};
use crate::list::Item;
use crate::theme::Theme;

// Theme is set once at startup from config
static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the theme used for drawing. Only the first call has an effect.
pub fn init_theme(theme: Theme) {
    let _ = THEME.set(theme);
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn inactive() -> Color { theme().inactive }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }
fn category() -> Color { theme().category }

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    // Checked box only exists once something is checked
    let checked_height = if !app.list.has_checked_items() {
        Constraint::Length(0)
    } else if app.hide_checked {
        Constraint::Length(3)
    } else {
        Constraint::Min(4)
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1),   // Info line
            Constraint::Length(3),   // Entry box
            Constraint::Min(4),      // Unchecked items
            checked_height,          // Checked items
            Constraint::Length(1),   // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_entry_box(f, app, chunks[1]);
    draw_unchecked_box(f, app, chunks[2]);
    if app.list.has_checked_items() {
        draw_checked_box(f, app, chunks[3]);
    }
    draw_footer(f, app, chunks[4]);

    // Draw popups on top
    match app.popup {
        Popup::None => {}
        Popup::Category => draw_category_popup(f, app),
        Popup::Help => draw_help_popup(f),
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    // Priority: warning > status message > counts
    let line = if let Some(ref warn) = app.warning {
        Line::from(vec![
            Span::styled("{ ", Style::default().fg(danger())),
            Span::styled(warn, Style::default().fg(danger()).add_modifier(Modifier::ITALIC)),
            Span::styled(" }", Style::default().fg(danger())),
        ])
    } else if let Some(ref status) = app.status_message {
        Line::from(vec![
            Span::styled(status, Style::default().fg(warning())),
        ])
    } else {
        let to_buy = app.list.unchecked().count();
        let done = app.list.checked().count();
        Line::from(vec![
            Span::styled(format!("{} to buy", to_buy), Style::default().fg(text_dim())),
            Span::styled(" │ ", Style::default().fg(inactive())),
            Span::styled(format!("{} checked", done), Style::default().fg(text_dim())),
        ])
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_entry_box(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::Entry && app.popup == Popup::None;
    let border_color = if is_active { accent() } else { inactive() };
    let cursor = if is_active { "_" } else { "" };

    let input = Paragraph::new(format!("{}{}", app.input_buffer, cursor))
        .style(Style::default().fg(text()))
        .block(
            Block::default()
                .title(Span::styled(" Add ", Style::default().fg(border_color)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        );
    f.render_widget(input, area);
}

fn item_row<'a>(item: &'a Item, selected: bool) -> Row<'a> {
    let (icon, name_style) = if item.checked {
        (
            "󰄲",
            Style::default().fg(text_dim()).add_modifier(Modifier::CROSSED_OUT),
        )
    } else {
        ("󰄱", Style::default().fg(text()))
    };

    let tag = item
        .category
        .as_deref()
        .map(|c| Span::styled(format!("[{}]", c), Style::default().fg(category())))
        .unwrap_or_else(|| Span::raw(""));

    let row_style = if selected {
        Style::default().bg(bg_selected()).fg(text())
    } else {
        Style::default()
    };

    Row::new(vec![
        Span::styled(icon, Style::default().fg(if item.checked { accent() } else { text_dim() })),
        Span::styled(item.text.as_str(), name_style),
        tag,
    ])
    .style(row_style)
}

fn item_widths() -> [Constraint; 3] {
    [
        Constraint::Length(3),
        Constraint::Percentage(65),
        Constraint::Percentage(35),
    ]
}

fn draw_unchecked_box(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::List;
    let border_color = if is_active { accent() } else { inactive() };
    let title_style = if is_active {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(inactive())
    };

    let count = app.list.unchecked().count();
    let block = Block::default()
        .title(Span::styled(format!(" To buy ({}) ", count), title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let rows: Vec<Row> = if count == 0 {
        vec![Row::new(vec![
            Span::raw(""),
            Span::styled("Nothing to buy", Style::default().fg(text_dim())),
        ])]
    } else {
        app.list
            .unchecked()
            .enumerate()
            .map(|(i, item)| item_row(item, is_active && i == app.selected))
            .collect()
    };

    let selected = (is_active && app.selected < count).then_some(app.selected);
    render_item_table(f, rows, block, selected, area);
}

/// Draw item rows, scrolled so the selected row stays inside the box
fn render_item_table<'a>(
    f: &mut Frame,
    rows: Vec<Row<'a>>,
    block: Block<'a>,
    selected: Option<usize>,
    area: Rect,
) {
    let mut state = TableState::default().with_selected(selected);
    let table = Table::new(rows, item_widths()).block(block);
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_checked_box(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::List;
    let count = app.list.checked().count();
    let (arrow, hint) = if app.hide_checked {
        ("▸", "H show")
    } else {
        ("▾", "H hide")
    };

    let block = Block::default()
        .title(Span::styled(
            format!(" {} Checked ({}) · {} ", arrow, count, hint),
            Style::default().fg(text_dim()),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(inactive()));

    if app.hide_checked {
        let hidden = Paragraph::new(Span::styled(
            format!("  {} checked item{} hidden", count, if count == 1 { "" } else { "s" }),
            Style::default().fg(text_dim()),
        ))
        .block(block);
        f.render_widget(hidden, area);
        return;
    }

    // Checked rows follow the unchecked ones in the selection order
    let offset = app.list.unchecked().count();
    let rows: Vec<Row> = app
        .list
        .checked()
        .enumerate()
        .map(|(i, item)| item_row(item, is_active && offset + i == app.selected))
        .collect();

    let selected = app
        .selected
        .checked_sub(offset)
        .filter(|i| is_active && *i < count);
    render_item_table(f, rows, block, selected, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints: Vec<(&str, &str)> = match app.section {
        Section::Entry => vec![("Enter", "add"), ("Tab", "list"), ("Ctrl-C", "quit")],
        Section::List => vec![
            ("Space", "check"),
            ("d", "delete"),
            ("c", "category"),
            ("x", "clear category"),
            ("H", "hide checked"),
            ("a", "add"),
            ("?", "help"),
            ("q", "quit"),
        ],
    };

    let mut spans = Vec::new();
    for (i, (key, label)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(inactive())));
        }
        spans.push(Span::styled(*key, Style::default().fg(accent())));
        spans.push(Span::styled(format!(" {}", label), Style::default().fg(text_dim())));
    }

    let footer = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_category_popup(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, popup_area);

    let target = app.category_target.as_deref().unwrap_or("?");
    let current = app
        .list
        .get(target)
        .and_then(|item| item.category.as_deref())
        .unwrap_or("none");

    let content = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Current: ", Style::default().fg(text_dim())),
            Span::styled(current, Style::default().fg(category())),
        ]),
        Line::from(""),
        Line::from(Span::styled(format!("{}_", app.category_buffer), Style::default().fg(text()))),
        Line::from(""),
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(accent()).add_modifier(Modifier::BOLD)),
            Span::styled(" save   ", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(danger())),
            Span::styled(" cancel", Style::default().fg(text_dim())),
        ]),
    ])
    .wrap(Wrap { trim: false })
    .block(
        Block::default()
            .title(Span::styled(
                format!(" Category for {} ", target),
                Style::default().fg(accent()),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent())),
    );

    f.render_widget(content, popup_area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area
    );

    f.render_widget(Clear, popup_area);

    let key_line = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", key), Style::default().fg(accent())),
            Span::raw(desc),
        ])
    };
    let heading = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(danger()).add_modifier(Modifier::BOLD)))
    };

    let help_text = vec![
        heading("═══ Adding ═══"),
        key_line("Enter", "Add the typed item (sorted into the list)"),
        key_line("Tab/Esc", "Move to the list"),
        Line::from(Span::styled(
            "            Adding a checked item unchecks it",
            Style::default().fg(text_dim()),
        )),
        Line::from(""),
        heading("═══ List ═══"),
        key_line("↑/↓ j/k", "Move up/down"),
        key_line("Space", "Check/uncheck selected item"),
        key_line("d", "Delete selected item"),
        key_line("c", "Set category"),
        key_line("x", "Clear category"),
        key_line("H", "Hide/show checked items"),
        key_line("a/i/Tab", "Back to the add field"),
        Line::from(""),
        heading("═══ Quick Start ═══"),
        key_line("shoplist --add milk --add eggs", ""),
        key_line("shoplist --dump", ""),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("?", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" 󰋖 shoplist Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
