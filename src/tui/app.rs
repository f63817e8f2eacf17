use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::DefaultTerminal;

use crate::config::Config;
use crate::grid::{Grid, NavKey};
use crate::share;
use crate::store::{SaveError, Store, TabBook, TabRecord, ThemeMode, parse_backup};

use super::event::{self, AppEvent};
use super::form;
use super::theme::Theme;
use super::ui;

/// Which pane receives plain keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Grid,
    Title,
    Search,
    Saved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    RestorePath,
    ConfirmRestore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStyle {
    Info,
    Success,
    Error,
}

/// Transient status-line message.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub style: ToastStyle,
    expires_at: Instant,
}

const TOAST_TTL: Duration = Duration::from_millis(2_500);

pub struct App {
    pub store: Store,
    pub config: Config,
    pub theme: Theme,
    pub theme_mode: ThemeMode,
    pub should_quit: bool,
    pub focus: Focus,
    pub input_mode: InputMode,

    // Editor state
    pub grid: Grid,
    pub book: TabBook,

    // Text inputs
    pub title_buffer: String,
    pub title_cursor: usize,
    pub search_buffer: String,
    pub search_cursor: usize,

    // Saved-list selection (index into the filtered view)
    pub saved_index: usize,

    // Restore flow
    pub path_buffer: String,
    pub path_cursor: usize,
    pub pending_restore: Vec<TabRecord>,

    pub toast: Option<Toast>,
}

impl App {
    pub fn new(store: Store, config: Config) -> Result<Self> {
        let book = store.load_tabs()?;
        let theme_mode = store.theme_mode();
        let theme = config.theme.build(theme_mode);
        let grid = Grid::new(config.editor.columns);

        Ok(App {
            store,
            config,
            theme,
            theme_mode,
            should_quit: false,
            focus: Focus::Grid,
            input_mode: InputMode::Normal,
            grid,
            book,
            title_buffer: String::new(),
            title_cursor: 0,
            search_buffer: String::new(),
            search_cursor: 0,
            saved_index: 0,
            path_buffer: String::new(),
            path_cursor: 0,
            pending_restore: vec![],
            toast: None,
        })
    }

    /// Saved records matching the current search, newest first.
    pub fn visible_records(&self) -> Vec<&TabRecord> {
        self.book.search(&self.search_buffer).collect()
    }

    pub fn show_toast(&mut self, style: ToastStyle, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            style,
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let tick_rate = Duration::from_millis(250);

        loop {
            terminal.draw(|frame| ui::draw(frame, self))?;

            match event::poll(tick_rate)? {
                AppEvent::Key(key) => match self.input_mode {
                    InputMode::Normal => self.handle_normal_key(key),
                    InputMode::RestorePath => self.handle_restore_path_key(key),
                    InputMode::ConfirmRestore => self.handle_confirm_restore_key(key.code),
                },
                AppEvent::Tick => {}
            }

            if let Some(toast) = &self.toast
                && toast.expires_at <= Instant::now()
            {
                self.toast = None;
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        // Global chords first; they work from every pane.
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('s') => {
                    self.save_current();
                    return;
                }
                KeyCode::Char('e') => {
                    self.export_current();
                    return;
                }
                KeyCode::Char('r') => {
                    self.path_buffer.clear();
                    self.path_cursor = 0;
                    self.input_mode = InputMode::RestorePath;
                    return;
                }
                KeyCode::Char('y') => {
                    self.share_current();
                    return;
                }
                KeyCode::Char('d') => {
                    self.toggle_theme();
                    return;
                }
                KeyCode::Char('n') => {
                    self.focus = Focus::Title;
                    return;
                }
                KeyCode::Char('f') => {
                    self.focus = Focus::Search;
                    return;
                }
                KeyCode::Char('l') => {
                    self.focus = Focus::Saved;
                    return;
                }
                KeyCode::Char('g') => {
                    self.focus = Focus::Grid;
                    return;
                }
                _ => {}
            }
        }

        match self.focus {
            Focus::Grid => self.handle_grid_key(key),
            Focus::Title => self.handle_title_key(key),
            Focus::Search => self.handle_search_key(key),
            Focus::Saved => self.handle_saved_key(key),
        }
    }

    /// Grid pane: arrows/Tab/Enter navigate, printable characters edit
    /// the cursor cell. Navigation on the last column grows the grid
    /// before the cursor moves, so the target cell always exists.
    fn handle_grid_key(&mut self, key: KeyEvent) {
        let nav = match key.code {
            KeyCode::Right => Some(NavKey::Right),
            KeyCode::Left => Some(NavKey::Left),
            KeyCode::Up => Some(NavKey::Up),
            KeyCode::Down => Some(NavKey::Down),
            KeyCode::Tab => Some(NavKey::Tab),
            KeyCode::BackTab => Some(NavKey::BackTab),
            KeyCode::Enter => Some(NavKey::Enter),
            _ => None,
        };
        if let Some(nav) = nav {
            self.grid.navigate(nav);
            return;
        }

        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.grid.push_char(c);
            }
            KeyCode::Backspace => self.grid.pop_char(),
            KeyCode::Delete => self.grid.clear_cell(),
            _ => {}
        }
    }

    fn handle_title_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.focus = Focus::Grid,
            code => {
                form::apply_text_edit(
                    &mut self.title_buffer,
                    &mut self.title_cursor,
                    code,
                    key.modifiers,
                );
            }
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.focus = Focus::Grid,
            KeyCode::Enter => self.focus = Focus::Saved,
            code => {
                if form::apply_text_edit(
                    &mut self.search_buffer,
                    &mut self.search_cursor,
                    code,
                    key.modifiers,
                ) {
                    self.saved_index = 0;
                }
            }
        }
    }

    fn handle_saved_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.focus = Focus::Grid,
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => {
                let count = self.visible_records().len();
                if count > 0 {
                    self.saved_index = (self.saved_index + 1).min(count - 1);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.saved_index = self.saved_index.saturating_sub(1);
            }
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('/') => self.focus = Focus::Search,
            _ => {}
        }
    }

    fn handle_restore_path_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                let path = self.path_buffer.trim().to_string();
                self.input_mode = InputMode::Normal;
                if path.is_empty() {
                    return;
                }
                self.load_backup(&path);
            }
            code => {
                form::apply_text_edit(
                    &mut self.path_buffer,
                    &mut self.path_cursor,
                    code,
                    key.modifiers,
                );
            }
        }
    }

    fn handle_confirm_restore_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let records = std::mem::take(&mut self.pending_restore);
                let count = records.len();
                self.book.replace_all(records);
                self.persist();
                self.saved_index = 0;
                self.input_mode = InputMode::Normal;
                self.show_toast(ToastStyle::Success, format!("Restored {count} tabs"));
            }
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.pending_restore.clear();
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    fn load_backup(&mut self, path: &str) {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                self.show_toast(ToastStyle::Error, format!("Could not read {path}: {e}"));
                return;
            }
        };
        match parse_backup(&text) {
            Ok(records) => {
                self.pending_restore = records;
                self.input_mode = InputMode::ConfirmRestore;
            }
            Err(e) => {
                tracing::warn!("rejected backup {path}: {e}");
                self.show_toast(ToastStyle::Error, "Invalid backup file");
            }
        }
    }

    fn save_current(&mut self) {
        match self.book.save(&self.title_buffer, &self.grid, Local::now()) {
            Ok(record) => {
                tracing::info!("saved tab '{}'", record.title);
                self.persist();
                self.grid.reset(self.config.editor.columns);
                self.title_buffer.clear();
                self.title_cursor = 0;
                self.show_toast(ToastStyle::Success, "Tab saved!");
            }
            Err(SaveError::EmptyTitle) => {
                self.show_toast(ToastStyle::Error, "Enter a song title!");
            }
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.visible_records().get(self.saved_index).map(|r| r.id) else {
            return;
        };
        self.book.delete(id);
        self.persist();
        let count = self.visible_records().len();
        if self.saved_index >= count && count > 0 {
            self.saved_index = count - 1;
        } else if count == 0 {
            self.saved_index = 0;
        }
        self.show_toast(ToastStyle::Info, "Tab deleted");
    }

    fn export_current(&mut self) {
        let path = crate::store::export_filename(Local::now());
        let json = match self.book.export_json() {
            Ok(json) => json,
            Err(e) => {
                self.show_toast(ToastStyle::Error, format!("Export failed: {e}"));
                return;
            }
        };
        match std::fs::write(&path, json) {
            Ok(()) => self.show_toast(ToastStyle::Success, format!("Exported to {path}")),
            Err(e) => self.show_toast(ToastStyle::Error, format!("Export failed: {e}")),
        }
    }

    fn share_current(&mut self) {
        let text = share::summary(&self.book);
        match share::copy_to_clipboard(&text) {
            Ok(()) => self.show_toast(ToastStyle::Success, "Share text copied to clipboard"),
            Err(e) => {
                tracing::warn!("clipboard unavailable: {e}");
                self.show_toast(ToastStyle::Error, "Clipboard unavailable");
            }
        }
    }

    fn toggle_theme(&mut self) {
        self.theme_mode = self.theme_mode.toggled();
        self.theme = self.config.theme.build(self.theme_mode);
        if let Err(e) = self.store.set_theme_mode(self.theme_mode) {
            tracing::warn!("failed to persist theme mode: {e}");
        }
        let label = match self.theme_mode {
            ThemeMode::Dark => "Dark theme",
            ThemeMode::Light => "Light theme",
        };
        self.show_toast(ToastStyle::Info, label);
    }

    /// Write the full collection back to the store. Persistence is
    /// fire-and-forget per mutation; a failure is surfaced but does not
    /// roll back the in-memory state.
    fn persist(&mut self) {
        if let Err(e) = self.store.persist_tabs(&self.book) {
            tracing::warn!("failed to persist tabs: {e}");
            self.show_toast(ToastStyle::Error, "Failed to write tab store");
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;

    use super::*;

    fn app() -> App {
        let store = Store::open_in_memory().unwrap();
        store.migrate().unwrap();
        App::new(store, Config::default()).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn type_title(app: &mut App, title: &str) {
        app.focus = Focus::Title;
        for c in title.chars() {
            app.handle_normal_key(key(KeyCode::Char(c)));
        }
        app.handle_normal_key(key(KeyCode::Esc));
    }

    #[test]
    fn starts_on_grid_with_configured_columns() {
        let a = app();
        assert_eq!(a.focus, Focus::Grid);
        assert_eq!(a.grid.columns(), 25);
    }

    #[test]
    fn grid_typing_edits_cursor_cell() {
        let mut a = app();
        a.handle_normal_key(key(KeyCode::Char('3')));
        a.handle_normal_key(key(KeyCode::Char('x'))); // filtered
        assert_eq!(a.grid.cell(0, 0), "3");
        a.handle_normal_key(key(KeyCode::Backspace));
        assert_eq!(a.grid.cell(0, 0), "");
    }

    #[test]
    fn grid_arrows_move_cursor_without_editing() {
        let mut a = app();
        a.handle_normal_key(key(KeyCode::Right));
        a.handle_normal_key(key(KeyCode::Down));
        assert_eq!(a.grid.cursor(), (1, 1));
        assert!(a.grid.is_empty());
    }

    #[test]
    fn save_with_empty_title_errors_and_keeps_grid() {
        let mut a = app();
        a.handle_normal_key(key(KeyCode::Char('3')));
        a.handle_normal_key(ctrl('s'));
        assert_eq!(a.book.len(), 0);
        assert_eq!(a.grid.cell(0, 0), "3");
        assert_eq!(a.toast.as_ref().unwrap().style, ToastStyle::Error);
    }

    #[test]
    fn save_stores_record_and_resets_grid() {
        let mut a = app();
        a.handle_normal_key(key(KeyCode::Char('3')));
        type_title(&mut a, "  Riff  ");
        a.handle_normal_key(ctrl('s'));
        assert_eq!(a.book.len(), 1);
        assert_eq!(a.book.records()[0].title, "Riff");
        assert!(a.grid.is_empty());
        assert_eq!(a.grid.columns(), 25);
        assert!(a.title_buffer.is_empty());
        // persisted through the store as well
        assert_eq!(a.store.load_tabs().unwrap().len(), 1);
    }

    #[test]
    fn search_narrows_visible_records() {
        let mut a = app();
        for title in ["Stairway", "Blackbird"] {
            type_title(&mut a, title);
            a.handle_normal_key(ctrl('s'));
        }
        a.focus = Focus::Search;
        a.handle_normal_key(key(KeyCode::Char('z')));
        assert!(a.visible_records().is_empty());
        a.handle_normal_key(key(KeyCode::Backspace));
        assert_eq!(a.visible_records().len(), 2);
        a.handle_normal_key(key(KeyCode::Char('b')));
        let titles: Vec<&str> = a.visible_records().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Blackbird"]);
    }

    #[test]
    fn delete_removes_selected_record() {
        let mut a = app();
        for title in ["One", "Two"] {
            type_title(&mut a, title);
            a.handle_normal_key(ctrl('s'));
        }
        a.focus = Focus::Saved;
        a.handle_normal_key(key(KeyCode::Char('d')));
        assert_eq!(a.book.len(), 1);
        assert_eq!(a.book.records()[0].title, "One");
        // deleting with nothing selected is a no-op
        a.handle_normal_key(key(KeyCode::Char('d')));
        a.handle_normal_key(key(KeyCode::Char('d')));
        assert_eq!(a.book.len(), 0);
    }

    #[test]
    fn confirm_restore_replaces_collection() {
        let mut a = app();
        type_title(&mut a, "Old");
        a.handle_normal_key(ctrl('s'));
        a.pending_restore = vec![];
        a.input_mode = InputMode::ConfirmRestore;
        a.handle_confirm_restore_key(KeyCode::Char('y'));
        assert!(a.book.is_empty());
        assert_eq!(a.input_mode, InputMode::Normal);
        assert!(a.store.load_tabs().unwrap().is_empty());
    }

    #[test]
    fn declined_restore_keeps_collection() {
        let mut a = app();
        type_title(&mut a, "Keep");
        a.handle_normal_key(ctrl('s'));
        a.pending_restore = vec![];
        a.input_mode = InputMode::ConfirmRestore;
        a.handle_confirm_restore_key(KeyCode::Esc);
        assert_eq!(a.book.len(), 1);
        assert_eq!(a.input_mode, InputMode::Normal);
    }

    #[test]
    fn invalid_backup_surfaces_error_toast() {
        let mut a = app();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        std::fs::write(&path, "{not valid json").unwrap();
        a.load_backup(path.to_str().unwrap());
        assert_eq!(a.input_mode, InputMode::Normal);
        assert_eq!(a.toast.as_ref().unwrap().style, ToastStyle::Error);
    }

    #[test]
    fn valid_backup_opens_confirmation() {
        let mut a = app();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        std::fs::write(&path, "[]").unwrap();
        a.load_backup(path.to_str().unwrap());
        assert_eq!(a.input_mode, InputMode::ConfirmRestore);
        assert!(a.pending_restore.is_empty());
    }

    #[test]
    fn unreadable_backup_path_surfaces_error_toast() {
        let mut a = app();
        a.load_backup("/nonexistent/backup.json");
        assert_eq!(a.input_mode, InputMode::Normal);
        assert_eq!(a.toast.as_ref().unwrap().style, ToastStyle::Error);
    }

    #[test]
    fn theme_toggle_persists_mode() {
        let mut a = app();
        assert_eq!(a.theme_mode, ThemeMode::Dark);
        a.handle_normal_key(ctrl('d'));
        assert_eq!(a.theme_mode, ThemeMode::Light);
        assert_eq!(a.store.theme_mode(), ThemeMode::Light);
        assert_eq!(a.theme, a.config.theme.build(ThemeMode::Light));
    }

    #[test]
    fn focus_chords_switch_panes() {
        let mut a = app();
        a.handle_normal_key(ctrl('f'));
        assert_eq!(a.focus, Focus::Search);
        a.handle_normal_key(ctrl('l'));
        assert_eq!(a.focus, Focus::Saved);
        a.handle_normal_key(ctrl('n'));
        assert_eq!(a.focus, Focus::Title);
        a.handle_normal_key(ctrl('g'));
        assert_eq!(a.focus, Focus::Grid);
    }

    #[test]
    fn ctrl_q_quits() {
        let mut a = app();
        a.handle_normal_key(ctrl('q'));
        assert!(a.should_quit);
    }
}
