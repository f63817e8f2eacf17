use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::grid::{Grid, STRING_COUNT, STRING_NAMES};

use super::app::{App, Focus, InputMode};
use super::form;

pub fn draw(frame: &mut Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title bar
            Constraint::Length(3), // song title input
            Constraint::Length(STRING_COUNT as u16 + 2), // grid
            Constraint::Length(3), // search input
            Constraint::Min(0),    // saved tabs
            Constraint::Length(1), // status / toasts
        ])
        .split(frame.area());

    draw_title_bar(frame, app, outer[0]);
    draw_title_input(frame, app, outer[1]);
    draw_grid(frame, app, outer[2]);
    draw_search_input(frame, app, outer[3]);
    draw_saved(frame, app, outer[4]);
    draw_status(frame, app, outer[5]);

    match app.input_mode {
        InputMode::RestorePath => draw_restore_path(frame, app),
        InputMode::ConfirmRestore => draw_confirm_restore(frame, app),
        InputMode::Normal => {}
    }
}

fn draw_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let line = Line::from(vec![
        Span::styled(
            " fretpad ",
            Style::default()
                .fg(theme.text_accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "  ^S save  ^E export  ^R restore  ^Y share  ^D theme  ^Q quit",
            Style::default().fg(theme.text_secondary),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_title_input(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let focused = app.focus == Focus::Title;
    let block = Block::default()
        .title(" Song Title ")
        .borders(Borders::ALL)
        .border_style(theme.panel_border(focused));

    let paragraph = if focused {
        Paragraph::new(form::format_with_cursor(&app.title_buffer, app.title_cursor))
            .style(Style::default().fg(theme.text_primary))
    } else if app.title_buffer.is_empty() {
        Paragraph::new("Enter song title...").style(Style::default().fg(theme.text_secondary))
    } else {
        Paragraph::new(app.title_buffer.as_str()).style(Style::default().fg(theme.text_primary))
    };
    frame.render_widget(paragraph.block(block), area);
}

fn draw_grid(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let focused = app.focus == Focus::Grid;
    let block = Block::default()
        .title(format!(" Tab ({} columns) ", app.grid.columns()))
        .borders(Borders::ALL)
        .border_style(theme.panel_border(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < STRING_COUNT as u16 || inner.width < 4 {
        return;
    }

    let (cursor_row, cursor_col) = app.grid.cursor();
    let widths = column_widths(&app.grid);
    // Two columns of the inner width go to the "e|" label.
    let avail = inner.width.saturating_sub(2) as usize;
    let start = first_visible_column(&widths, cursor_col, avail);

    let lines: Vec<Line> = STRING_NAMES
        .iter()
        .enumerate()
        .map(|(row, name)| {
            let mut spans = vec![Span::styled(format!("{name}|"), theme.string_label_style())];
            let mut used = 0usize;
            for (col, &width) in widths.iter().enumerate().skip(start) {
                if used + width + 1 > avail {
                    break;
                }
                used += width + 1;
                let cell = app.grid.cell(row, col);
                let at_cursor = focused && row == cursor_row && col == cursor_col;
                spans.push(Span::styled(
                    format!("{cell:-<width$}"),
                    theme.cell_style(cell.is_empty(), at_cursor),
                ));
                spans.push(Span::styled("-", Style::default().fg(theme.cell_empty)));
            }
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let focused = app.focus == Focus::Search;
    let block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(theme.panel_border(focused));

    let paragraph = if focused {
        Paragraph::new(form::format_with_cursor(
            &app.search_buffer,
            app.search_cursor,
        ))
        .style(Style::default().fg(theme.text_primary))
    } else if app.search_buffer.is_empty() {
        Paragraph::new("Search your tabs...").style(Style::default().fg(theme.text_secondary))
    } else {
        Paragraph::new(app.search_buffer.as_str()).style(Style::default().fg(theme.text_primary))
    };
    frame.render_widget(paragraph.block(block), area);
}

fn draw_saved(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let focused = app.focus == Focus::Saved;
    let records = app.visible_records();

    let block = Block::default()
        .title(format!(" Saved Tabs ({}) ", records.len()))
        .borders(Borders::ALL)
        .border_style(theme.panel_border(focused));

    if records.is_empty() {
        let message = if app.search_buffer.is_empty() {
            "Your first masterpiece awaits!"
        } else {
            "No tabs found"
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(theme.text_secondary))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(inner);

    let items: Vec<ListItem> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let selected = i == app.saved_index;
            let indicator = if selected { "\u{25b8} " } else { "  " };
            let style = if selected {
                Style::default()
                    .fg(theme.selection_indicator)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text_primary)
            };
            ListItem::new(Line::from(vec![
                Span::styled(indicator, style),
                Span::styled(record.title.clone(), style),
                Span::styled(
                    format!("  {}", record.date),
                    Style::default().fg(theme.text_secondary),
                ),
            ]))
        })
        .collect();
    frame.render_widget(List::new(items), panes[0]);

    if let Some(record) = records.get(app.saved_index) {
        let mut lines = vec![Line::from(Span::styled(
            record.title.clone(),
            Style::default()
                .fg(theme.text_accent)
                .add_modifier(Modifier::BOLD),
        ))];
        lines.extend(
            record
                .tab
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(theme.cell_text)))),
        );
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), panes[1]);
    }
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    if let Some(toast) = &app.toast {
        let line = Line::from(Span::styled(
            format!(" {}", toast.message),
            theme.toast_style(toast.style),
        ));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let key_style = Style::default().fg(theme.hint_key);
    let desc_style = Style::default().fg(theme.hint_desc);
    let hints: &[(&str, &str)] = match app.focus {
        Focus::Grid => &[
            ("arrows/Tab", ":move  "),
            ("Enter", ":next string  "),
            ("type", ":edit cell  "),
            ("^N", ":title  "),
            ("^F", ":search  "),
            ("^L", ":saved"),
        ],
        Focus::Title | Focus::Search => &[("Esc", ":back to grid  "), ("Enter", ":done")],
        Focus::Saved => &[
            ("j/k", ":select  "),
            ("d", ":delete  "),
            ("/", ":search  "),
            ("Esc", ":back to grid"),
        ],
    };
    form::render_hints(frame, area, hints, key_style, desc_style);
}

fn draw_restore_path(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let inner = form::render_modal(
        frame,
        " Restore from backup ",
        Style::default().fg(theme.modal_border),
        60,
        5,
    );
    if inner.height < 3 {
        return;
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new("Path to a .json backup:")
            .style(Style::default().fg(theme.text_primary)),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(form::format_with_cursor(&app.path_buffer, app.path_cursor))
            .style(Style::default().fg(theme.text_accent)),
        rows[1],
    );
    frame.render_widget(
        Paragraph::new("Enter: load   Esc: cancel")
            .style(Style::default().fg(theme.text_secondary)),
        rows[2],
    );
}

fn draw_confirm_restore(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let inner = form::render_modal(
        frame,
        " Confirm restore ",
        Style::default().fg(theme.modal_border),
        46,
        5,
    );
    if inner.height < 3 {
        return;
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(format!("Restore {} tabs?", app.pending_restore.len()))
            .style(Style::default().fg(theme.text_primary)),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new("This replaces the current collection.")
            .style(Style::default().fg(theme.text_secondary)),
        rows[1],
    );
    frame.render_widget(
        Paragraph::new("y: restore   n/Esc: cancel")
            .style(Style::default().fg(theme.text_secondary)),
        rows[2],
    );
}

/// Display width of each column: the widest cell in that column across
/// all six strings, at least one character.
fn column_widths(grid: &Grid) -> Vec<usize> {
    (0..grid.columns())
        .map(|col| {
            (0..STRING_COUNT)
                .map(|row| grid.cell(row, col).len())
                .max()
                .unwrap_or(0)
                .max(1)
        })
        .collect()
}

/// First column to render so the cursor column fits in `avail` cells of
/// width (each column takes its width plus one separator).
fn first_visible_column(widths: &[usize], cursor_col: usize, avail: usize) -> usize {
    let mut start = 0;
    while start < cursor_col {
        let needed: usize = widths[start..=cursor_col].iter().map(|w| w + 1).sum();
        if needed <= avail {
            break;
        }
        start += 1;
    }
    start
}
