use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

// ── Text editing helpers ──────────────────────────────────────────────

/// Byte offset of the start of the word before `pos` (for Ctrl+W).
fn word_start_before(s: &str, pos: usize) -> usize {
    let trimmed = s[..pos].trim_end();
    if trimmed.is_empty() {
        return 0;
    }
    match trimmed.rfind(|c: char| c.is_whitespace()) {
        Some(idx) => {
            let ch = trimmed[idx..].chars().next().expect("non-empty slice");
            idx + ch.len_utf8()
        }
        None => 0,
    }
}

/// Apply line-editing keys to a string buffer with cursor tracking:
/// character insertion, Backspace/Delete, arrow/Home/End movement,
/// Ctrl+W (delete word) and Ctrl+U (delete to line start).
/// Returns `true` if the key event was consumed.
pub fn apply_text_edit(
    buf: &mut String,
    cursor: &mut usize,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> bool {
    *cursor = (*cursor).min(buf.len());

    match code {
        KeyCode::Left => {
            if let Some(ch) = buf[..*cursor].chars().next_back() {
                *cursor -= ch.len_utf8();
            }
            true
        }
        KeyCode::Right => {
            if let Some(ch) = buf[*cursor..].chars().next() {
                *cursor += ch.len_utf8();
            }
            true
        }
        KeyCode::Home => {
            *cursor = 0;
            true
        }
        KeyCode::End => {
            *cursor = buf.len();
            true
        }

        KeyCode::Char('w') if modifiers.contains(KeyModifiers::CONTROL) => {
            let new_pos = word_start_before(buf, *cursor);
            buf.drain(new_pos..*cursor);
            *cursor = new_pos;
            true
        }
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
            buf.drain(..*cursor);
            *cursor = 0;
            true
        }
        KeyCode::Backspace => {
            if let Some(ch) = buf[..*cursor].chars().next_back() {
                let new_pos = *cursor - ch.len_utf8();
                buf.drain(new_pos..*cursor);
                *cursor = new_pos;
            }
            true
        }
        KeyCode::Delete => {
            if let Some(ch) = buf[*cursor..].chars().next() {
                buf.drain(*cursor..(*cursor + ch.len_utf8()));
            }
            true
        }

        KeyCode::Char(c) if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            buf.insert(*cursor, c);
            *cursor += c.len_utf8();
            true
        }
        _ => false,
    }
}

/// Format a text buffer with a visible block cursor at the given position.
pub fn format_with_cursor(buf: &str, cursor: usize) -> String {
    let pos = cursor.min(buf.len());
    let (before, after) = buf.split_at(pos);
    format!("{before}\u{2588}{after}")
}

// ── Rendering helpers ─────────────────────────────────────────────────

/// Render a centered modal overlay: `Clear` background, bordered block,
/// returns the usable inner `Rect` (inside borders), clamped to the
/// available space.
pub fn render_modal(
    frame: &mut Frame,
    title: &str,
    border_style: Style,
    width: u16,
    height: u16,
) -> Rect {
    let area = frame.area();
    let w = width.min(area.width.saturating_sub(4));
    let h = height.min(area.height.saturating_sub(4));
    let x = (area.width.saturating_sub(w)) / 2;
    let y = (area.height.saturating_sub(h)) / 2;
    let panel = Rect::new(x, y, w, h);

    frame.render_widget(Clear, panel);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    inner
}

/// Render a horizontal hint bar: alternating key/description spans.
pub fn render_hints(
    frame: &mut Frame,
    area: Rect,
    hints: &[(&str, &str)],
    key_style: Style,
    desc_style: Style,
) {
    let spans: Vec<Span<'_>> = hints
        .iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(*key, key_style),
                Span::styled(*desc, desc_style),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ── Tests ─────────────────────────────────────────────────────────────
