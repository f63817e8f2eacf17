//! The tab grid: six strings by a growable number of time columns.
//!
//! Each cell holds a short run of tab notation (`"3"`, `"7h9"`, `"12b"`).
//! The grid owns the cursor and the navigation policy over it; rendering
//! and persistence live elsewhere.

/// Number of strings on a standard-tuned guitar.
pub const STRING_COUNT: usize = 6;

/// String labels in display order, high e down to low E.
pub const STRING_NAMES: [&str; STRING_COUNT] = ["e", "B", "G", "D", "A", "E"];

/// Longest run of notation a single cell can hold (e.g. `"12b14"`).
pub const MAX_CELL_LEN: usize = 5;

/// Starting column count when no configuration overrides it.
pub const DEFAULT_COLUMNS: usize = 25;

/// Navigation keys the grid responds to. Anything else is cell input
/// and must not move the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Left,
    Right,
    Up,
    Down,
    Tab,
    BackTab,
    Enter,
}

/// Returns true for characters admitted into a cell: fret numbers plus
/// the notation symbols h p b r ~ \ / . | (hammer-on, pull-off, bend,
/// release, vibrato, slides, rest, barline).
pub fn is_allowed(c: char) -> bool {
    c.is_ascii_digit() || matches!(c.to_ascii_lowercase(), 'h' | 'p' | 'b' | 'r' | '~' | '\\' | '/' | '.' | '|')
}

/// Strip everything outside the tab alphabet and cap the result at
/// [`MAX_CELL_LEN`]. Letter symbols are matched case-insensitively but
/// kept as typed. Invalid characters are dropped silently.
pub fn sanitize(raw: &str) -> String {
    raw.chars().filter(|&c| is_allowed(c)).take(MAX_CELL_LEN).collect()
}

/// A 6xN matrix of notation cells plus the cursor position.
///
/// Invariant: every row holds exactly `columns` cells at all times.
/// Columns only ever grow; [`Grid::grow`] appends one empty cell to every
/// row atomically.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<Vec<String>>,
    columns: usize,
    cursor: (usize, usize),
}

impl Grid {
    /// Fresh empty grid with the given column count (at least 1).
    pub fn new(columns: usize) -> Self {
        let columns = columns.max(1);
        Grid {
            cells: vec![vec![String::new(); columns]; STRING_COUNT],
            columns,
            cursor: (0, 0),
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    /// Cell contents at (row, col); empty string for out-of-range.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .map_or("", String::as_str)
    }

    /// True when no cell holds any notation.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|row| row.iter().all(String::is_empty))
    }

    /// Sanitize `raw` and store it at (row, col). Out-of-range positions
    /// are ignored. Never moves the cursor.
    pub fn set_cell(&mut self, row: usize, col: usize, raw: &str) {
        if row < STRING_COUNT && col < self.columns {
            self.cells[row][col] = sanitize(raw);
        }
    }

    /// Append one character to the cursor cell. Rejected characters and
    /// full cells are silent no-ops.
    pub fn push_char(&mut self, c: char) {
        let (row, col) = self.cursor;
        let cell = &mut self.cells[row][col];
        if is_allowed(c) && cell.chars().count() < MAX_CELL_LEN {
            cell.push(c);
        }
    }

    /// Remove the last character of the cursor cell, if any.
    pub fn pop_char(&mut self) {
        let (row, col) = self.cursor;
        self.cells[row][col].pop();
    }

    /// Clear the cursor cell entirely.
    pub fn clear_cell(&mut self) {
        let (row, col) = self.cursor;
        self.cells[row][col].clear();
    }

    /// Append one empty cell to every row. Always grows by exactly one.
    pub fn grow(&mut self) {
        for row in &mut self.cells {
            row.push(String::new());
        }
        self.columns += 1;
    }

    /// Move the cursor for a navigation key and return the new position.
    ///
    /// Right/Tab on the last column grows the grid first, then steps into
    /// the new column, so the target cell exists before the cursor lands
    /// on it. Every other direction clamps at the edges; rows never wrap.
    pub fn navigate(&mut self, key: NavKey) -> (usize, usize) {
        let (row, col) = self.cursor;
        self.cursor = match key {
            NavKey::Right | NavKey::Tab => {
                if col + 1 >= self.columns {
                    self.grow();
                }
                (row, col + 1)
            }
            NavKey::Left | NavKey::BackTab => (row, col.saturating_sub(1)),
            NavKey::Down | NavKey::Enter => ((row + 1).min(STRING_COUNT - 1), col),
            NavKey::Up => (row.saturating_sub(1), col),
        };
        self.cursor
    }

    /// Render the grid as the six-line tab text: one line per string,
    /// `"<name>|"` prefix, cells joined with `-`, empty cells as `-`.
    pub fn serialize(&self) -> String {
        STRING_NAMES
            .iter()
            .zip(&self.cells)
            .map(|(name, row)| {
                let line = row
                    .iter()
                    .map(|cell| if cell.is_empty() { "-" } else { cell.as_str() })
                    .collect::<Vec<_>>()
                    .join("-");
                format!("{name}|{line}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace the matrix with a fresh empty grid and home the cursor.
    pub fn reset(&mut self, columns: usize) {
        *self = Grid::new(columns);
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::new(DEFAULT_COLUMNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Inverse of one serialized row line: strip the `"<name>|"` prefix
    /// and split the payload back into cells. An empty cell renders as a
    /// literal `-` which the split turns into a pair of adjacent empty
    /// fragments, so empties are consumed two at a time.
    fn parse_line(line: &str) -> Vec<String> {
        let payload = line.split_once('|').expect("string prefix").1;
        let mut cells = Vec::new();
        let mut fragments = payload.split('-').peekable();
        while let Some(frag) = fragments.next() {
            if frag.is_empty() {
                assert_eq!(fragments.next(), Some(""), "unpaired empty fragment");
                cells.push(String::new());
            } else {
                cells.push(frag.to_string());
            }
        }
        cells
    }

    #[test]
    fn sanitize_drops_disallowed_characters() {
        assert_eq!(sanitize("3x!5"), "35");
        assert_eq!(sanitize("hello"), "h");
        assert_eq!(sanitize("qwerty"), "r");
        assert_eq!(sanitize(" 7 "), "7");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn sanitize_keeps_notation_symbols() {
        assert_eq!(sanitize("7h9"), "7h9");
        assert_eq!(sanitize("5p3"), "5p3");
        assert_eq!(sanitize("12b"), "12b");
        assert_eq!(sanitize("~\\/.|"), "~\\/.|");
    }

    #[test]
    fn sanitize_is_case_insensitive_but_preserves_case() {
        assert_eq!(sanitize("7H9"), "7H9");
        assert_eq!(sanitize("5P3B"), "5P3B");
    }

    #[test]
    fn sanitize_truncates_to_max_len() {
        assert_eq!(sanitize("1234567"), "12345");
        assert_eq!(sanitize("12x34x56x7"), "12345");
    }

    #[test]
    fn new_grid_has_requested_shape() {
        let g = Grid::new(20);
        assert_eq!(g.columns(), 20);
        assert_eq!(g.cursor(), (0, 0));
        assert!(g.is_empty());
        for row in 0..STRING_COUNT {
            for col in 0..20 {
                assert_eq!(g.cell(row, col), "");
            }
        }
    }

    #[test]
    fn new_grid_clamps_zero_columns() {
        assert_eq!(Grid::new(0).columns(), 1);
    }

    #[test]
    fn set_cell_sanitizes_and_stores() {
        let mut g = Grid::new(5);
        g.set_cell(2, 3, "7h9x!");
        assert_eq!(g.cell(2, 3), "7h9");
        assert_eq!(g.cursor(), (0, 0));
    }

    #[test]
    fn set_cell_out_of_range_is_ignored() {
        let mut g = Grid::new(5);
        g.set_cell(6, 0, "3");
        g.set_cell(0, 5, "3");
        assert!(g.is_empty());
    }

    #[test]
    fn push_char_filters_and_caps() {
        let mut g = Grid::new(5);
        for c in "1x2y3z4!5?6".chars() {
            g.push_char(c);
        }
        assert_eq!(g.cell(0, 0), "12345");
    }

    #[test]
    fn pop_and_clear_cell() {
        let mut g = Grid::new(5);
        g.set_cell(0, 0, "7h9");
        g.pop_char();
        assert_eq!(g.cell(0, 0), "7h");
        g.clear_cell();
        assert_eq!(g.cell(0, 0), "");
        g.pop_char(); // empty cell: no-op
        assert_eq!(g.cell(0, 0), "");
    }

    #[test]
    fn grow_adds_one_empty_cell_per_row() {
        let mut g = Grid::new(3);
        g.set_cell(1, 2, "5");
        g.grow();
        assert_eq!(g.columns(), 4);
        assert_eq!(g.cell(1, 2), "5");
        for row in 0..STRING_COUNT {
            assert_eq!(g.cell(row, 3), "");
        }
    }

    #[test]
    fn navigate_right_moves_one_column() {
        let mut g = Grid::new(5);
        assert_eq!(g.navigate(NavKey::Right), (0, 1));
        assert_eq!(g.navigate(NavKey::Tab), (0, 2));
        assert_eq!(g.columns(), 5);
    }

    #[test]
    fn navigate_right_at_last_column_grows_first() {
        let mut g = Grid::new(3);
        g.navigate(NavKey::Right);
        g.navigate(NavKey::Right);
        assert_eq!(g.cursor(), (0, 2));
        assert_eq!(g.columns(), 3);

        let pos = g.navigate(NavKey::Right);
        assert_eq!(pos, (0, 3));
        assert_eq!(g.columns(), 4);
        // The grown cell exists before the cursor lands on it.
        assert_eq!(g.cell(0, 3), "");
    }

    #[test]
    fn navigate_tab_at_last_column_grows_too() {
        let mut g = Grid::new(1);
        assert_eq!(g.navigate(NavKey::Tab), (0, 1));
        assert_eq!(g.columns(), 2);
    }

    #[test]
    fn navigate_left_clamps_at_zero() {
        let mut g = Grid::new(5);
        assert_eq!(g.navigate(NavKey::Left), (0, 0));
        g.navigate(NavKey::Right);
        assert_eq!(g.navigate(NavKey::BackTab), (0, 0));
    }

    #[test]
    fn navigate_down_clamps_at_last_string() {
        let mut g = Grid::new(5);
        for _ in 0..10 {
            g.navigate(NavKey::Down);
        }
        assert_eq!(g.cursor(), (5, 0));
        assert_eq!(g.navigate(NavKey::Enter), (5, 0));
        assert_eq!(g.columns(), 5); // down never wraps or grows
    }

    #[test]
    fn navigate_up_clamps_at_first_string() {
        let mut g = Grid::new(5);
        assert_eq!(g.navigate(NavKey::Up), (0, 0));
        g.navigate(NavKey::Down);
        g.navigate(NavKey::Down);
        g.navigate(NavKey::Up);
        assert_eq!(g.cursor(), (1, 0));
    }

    #[test]
    fn navigate_stays_in_bounds() {
        let mut g = Grid::new(2);
        for key in [
            NavKey::Right,
            NavKey::Right,
            NavKey::Down,
            NavKey::Tab,
            NavKey::Up,
            NavKey::Left,
            NavKey::BackTab,
            NavKey::Enter,
        ] {
            let (row, col) = g.navigate(key);
            assert!(row < STRING_COUNT);
            assert!(col < g.columns());
        }
    }

    #[test]
    fn serialize_empty_grid() {
        let g = Grid::new(3);
        let text = g.serialize();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "e|-----");
        assert_eq!(lines[5], "E|-----");
    }

    #[test]
    fn serialize_orders_strings_high_to_low() {
        let g = Grid::new(1);
        let prefixes: Vec<String> = g
            .serialize()
            .lines()
            .map(|l| l.split_once('|').unwrap().0.to_string())
            .collect();
        assert_eq!(prefixes, ["e", "B", "G", "D", "A", "E"]);
    }

    #[test]
    fn serialize_joins_cells_with_dashes() {
        let mut g = Grid::new(4);
        g.set_cell(0, 0, "3");
        g.set_cell(0, 2, "5h7");
        let first = g.serialize().lines().next().unwrap().to_string();
        assert_eq!(first, "e|3---5h7--");
    }

    #[test]
    fn serialize_round_trips_cell_values() {
        let mut g = Grid::new(6);
        g.set_cell(0, 0, "3");
        g.set_cell(0, 5, "12b14");
        g.set_cell(2, 1, "7h9");
        g.set_cell(3, 3, "|");
        g.set_cell(5, 2, "0");
        let text = g.serialize();
        for (row, line) in text.lines().enumerate() {
            let cells = parse_line(line);
            assert_eq!(cells.len(), g.columns(), "row {row}");
            for (col, cell) in cells.iter().enumerate() {
                assert_eq!(cell, g.cell(row, col), "row {row} col {col}");
            }
        }
    }

    #[test]
    fn reset_restores_default_shape_and_cursor() {
        let mut g = Grid::new(3);
        g.set_cell(0, 0, "3");
        g.navigate(NavKey::Right);
        g.navigate(NavKey::Down);
        g.reset(25);
        assert_eq!(g.columns(), 25);
        assert_eq!(g.cursor(), (0, 0));
        assert!(g.is_empty());
    }
}
