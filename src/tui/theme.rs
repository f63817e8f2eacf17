use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

use crate::store::ThemeMode;

/// Semantic colour theme for the entire TUI.
///
/// Two built-in palettes (dark and light) are selected by the persisted
/// [`ThemeMode`]; any individual colour can then be overridden via
/// `[theme]` in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    // ── Borders ───────────────────────────────────────────────
    pub border_focused: Color,
    pub border_unfocused: Color,

    // ── Text ──────────────────────────────────────────────────
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_accent: Color,

    // ── Grid ──────────────────────────────────────────────────
    pub string_label: Color,
    pub cell_text: Color,
    pub cell_empty: Color,
    pub cursor: Color,

    // ── Toast ─────────────────────────────────────────────────
    pub toast_info: Color,
    pub toast_success: Color,
    pub toast_error: Color,

    // ── Misc ──────────────────────────────────────────────────
    pub selection_indicator: Color,
    pub modal_border: Color,
    pub hint_key: Color,
    pub hint_desc: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            border_focused: Color::Cyan,
            border_unfocused: Color::DarkGray,

            text_primary: Color::White,
            text_secondary: Color::DarkGray,
            text_accent: Color::Cyan,

            string_label: Color::Green,
            cell_text: Color::White,
            cell_empty: Color::DarkGray,
            cursor: Color::Cyan,

            toast_info: Color::Cyan,
            toast_success: Color::Green,
            toast_error: Color::Red,

            selection_indicator: Color::Cyan,
            modal_border: Color::Yellow,
            hint_key: Color::Cyan,
            hint_desc: Color::DarkGray,
        }
    }

    pub fn light() -> Self {
        Self {
            border_focused: Color::Blue,
            border_unfocused: Color::Gray,

            text_primary: Color::Black,
            text_secondary: Color::Gray,
            text_accent: Color::Blue,

            string_label: Color::Green,
            cell_text: Color::Black,
            cell_empty: Color::Gray,
            cursor: Color::Blue,

            toast_info: Color::Blue,
            toast_success: Color::Green,
            toast_error: Color::Red,

            selection_indicator: Color::Blue,
            modal_border: Color::Magenta,
            hint_key: Color::Blue,
            hint_desc: Color::Gray,
        }
    }

    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Theme::dark(),
            ThemeMode::Light => Theme::light(),
        }
    }

    /// Style for a focused panel border.
    pub fn focused_border(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    /// Style for an unfocused panel border.
    pub fn unfocused_border(&self) -> Style {
        Style::default().fg(self.border_unfocused)
    }

    pub fn panel_border(&self, focused: bool) -> Style {
        if focused {
            self.focused_border()
        } else {
            self.unfocused_border()
        }
    }

    /// Style for the string labels down the left edge of the grid.
    pub fn string_label_style(&self) -> Style {
        Style::default()
            .fg(self.string_label)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for one grid cell; the cursor cell is rendered inverted.
    pub fn cell_style(&self, empty: bool, at_cursor: bool) -> Style {
        if at_cursor {
            Style::default()
                .fg(self.cursor)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else if empty {
            Style::default().fg(self.cell_empty)
        } else {
            Style::default().fg(self.cell_text)
        }
    }

    /// Style for a toast notification.
    pub fn toast_style(&self, style: super::app::ToastStyle) -> Style {
        let color = match style {
            super::app::ToastStyle::Info => self.toast_info,
            super::app::ToastStyle::Success => self.toast_success,
            super::app::ToastStyle::Error => self.toast_error,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}

// ── Config deserialization ────────────────────────────────────────────

/// All-optional mirror of [`Theme`] for `config.toml` `[theme]` section.
///
/// Only `Some` fields override the palette; everything else keeps the
/// mode's built-in colour.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct ThemeConfig {
    pub border_focused: Option<String>,
    pub border_unfocused: Option<String>,

    pub text_primary: Option<String>,
    pub text_secondary: Option<String>,
    pub text_accent: Option<String>,

    pub string_label: Option<String>,
    pub cell_text: Option<String>,
    pub cell_empty: Option<String>,
    pub cursor: Option<String>,

    pub toast_info: Option<String>,
    pub toast_success: Option<String>,
    pub toast_error: Option<String>,

    pub selection_indicator: Option<String>,
    pub modal_border: Option<String>,
    pub hint_key: Option<String>,
    pub hint_desc: Option<String>,
}

/// Parse a colour string into a ratatui `Color`.
///
/// Supports named colours (`"cyan"`, `"red"`, `"dark_gray"`, etc.) and
/// `"rgb(R,G,B)"` syntax.
fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(inner) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
        let parts: Vec<&str> = inner.split(',').collect();
        if parts.len() == 3 {
            let r = parts[0].trim().parse::<u8>().ok()?;
            let g = parts[1].trim().parse::<u8>().ok()?;
            let b = parts[2].trim().parse::<u8>().ok()?;
            return Some(Color::Rgb(r, g, b));
        }
        return None;
    }

    let lower = s.to_lowercase().replace('-', "_");
    match lower.as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "dark_grey" | "darkgray" | "darkgrey" => Some(Color::DarkGray),
        "light_red" | "lightred" => Some(Color::LightRed),
        "light_green" | "lightgreen" => Some(Color::LightGreen),
        "light_yellow" | "lightyellow" => Some(Color::LightYellow),
        "light_blue" | "lightblue" => Some(Color::LightBlue),
        "light_magenta" | "lightmagenta" => Some(Color::LightMagenta),
        "light_cyan" | "lightcyan" => Some(Color::LightCyan),
        "white" => Some(Color::White),
        _ => None,
    }
}

/// Apply an optional config field: if the string parses to a valid colour,
/// overwrite `target`.
fn apply(target: &mut Color, source: Option<&String>) {
    if let Some(s) = source
        && let Some(color) = parse_color(s)
    {
        *target = color;
    }
}

impl ThemeConfig {
    /// Build a `Theme` from the mode's palette, overriding any fields
    /// that were set in the config file.
    pub fn build(&self, mode: ThemeMode) -> Theme {
        let mut t = Theme::for_mode(mode);

        apply(&mut t.border_focused, self.border_focused.as_ref());
        apply(&mut t.border_unfocused, self.border_unfocused.as_ref());
        apply(&mut t.text_primary, self.text_primary.as_ref());
        apply(&mut t.text_secondary, self.text_secondary.as_ref());
        apply(&mut t.text_accent, self.text_accent.as_ref());
        apply(&mut t.string_label, self.string_label.as_ref());
        apply(&mut t.cell_text, self.cell_text.as_ref());
        apply(&mut t.cell_empty, self.cell_empty.as_ref());
        apply(&mut t.cursor, self.cursor.as_ref());
        apply(&mut t.toast_info, self.toast_info.as_ref());
        apply(&mut t.toast_success, self.toast_success.as_ref());
        apply(&mut t.toast_error, self.toast_error.as_ref());
        apply(
            &mut t.selection_indicator,
            self.selection_indicator.as_ref(),
        );
        apply(&mut t.modal_border, self.modal_border.as_ref());
        apply(&mut t.hint_key, self.hint_key.as_ref());
        apply(&mut t.hint_desc, self.hint_desc.as_ref());

        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_and_light_palettes_differ() {
        assert_ne!(Theme::dark(), Theme::light());
        assert_eq!(Theme::dark().text_primary, Color::White);
        assert_eq!(Theme::light().text_primary, Color::Black);
    }

    #[test]
    fn for_mode_selects_palette() {
        assert_eq!(Theme::for_mode(ThemeMode::Dark), Theme::dark());
        assert_eq!(Theme::for_mode(ThemeMode::Light), Theme::light());
    }

    #[test]
    fn parse_named_colors() {
        assert_eq!(parse_color("cyan"), Some(Color::Cyan));
        assert_eq!(parse_color("dark_gray"), Some(Color::DarkGray));
        assert_eq!(parse_color("DarkGray"), Some(Color::DarkGray));
        assert_eq!(parse_color("light_red"), Some(Color::LightRed));
        assert_eq!(parse_color("nope"), None);
    }

    #[test]
    fn parse_rgb_color() {
        assert_eq!(
            parse_color("rgb(255, 165, 0)"),
            Some(Color::Rgb(255, 165, 0))
        );
        assert_eq!(parse_color("rgb(256,0,0)"), None); // overflow
        assert_eq!(parse_color("rgb(1,2)"), None); // too few
    }

    #[test]
    fn theme_config_overrides() {
        let cfg = ThemeConfig {
            cursor: Some("red".into()),
            string_label: Some("rgb(100,200,50)".into()),
            ..Default::default()
        };
        let t = cfg.build(ThemeMode::Dark);
        assert_eq!(t.cursor, Color::Red);
        assert_eq!(t.string_label, Color::Rgb(100, 200, 50));
        // Non-overridden field keeps the palette default
        assert_eq!(t.text_primary, Color::White);
    }

    #[test]
    fn theme_config_invalid_color_is_ignored() {
        let cfg = ThemeConfig {
            cursor: Some("ultraviolet".into()),
            ..Default::default()
        };
        assert_eq!(cfg.build(ThemeMode::Dark), Theme::dark());
    }

    #[test]
    fn panel_border_tracks_focus() {
        let t = Theme::dark();
        assert_eq!(t.panel_border(true), t.focused_border());
        assert_eq!(t.panel_border(false), t.unfocused_border());
    }

    #[test]
    fn cursor_cell_style_is_inverted() {
        let t = Theme::dark();
        let style = t.cell_style(true, true);
        assert!(style.add_modifier.contains(Modifier::REVERSED));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn empty_and_filled_cells_use_distinct_colors() {
        let t = Theme::dark();
        assert_eq!(t.cell_style(true, false).fg, Some(t.cell_empty));
        assert_eq!(t.cell_style(false, false).fg, Some(t.cell_text));
    }

    #[test]
    fn toast_styles() {
        use crate::tui::app::ToastStyle;
        let t = Theme::dark();

        let info = t.toast_style(ToastStyle::Info);
        assert_eq!(info.fg, Some(t.toast_info));
        assert!(info.add_modifier.contains(Modifier::BOLD));

        assert_eq!(t.toast_style(ToastStyle::Success).fg, Some(t.toast_success));
        assert_eq!(t.toast_style(ToastStyle::Error).fg, Some(t.toast_error));
    }
}
