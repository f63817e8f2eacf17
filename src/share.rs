//! Best-effort share action: a plain-text summary of the saved tabs,
//! handed to the system clipboard. Callers fall back to printing or a
//! toast when no clipboard is available.

use anyhow::Result;

use crate::store::TabBook;

const SHARE_LINK: &str = "https://github.com/fretpad/fretpad";

/// Text summary of the collection: tab titles plus a project link, or a
/// plain invitation when nothing is saved yet.
pub fn summary(book: &TabBook) -> String {
    if book.is_empty() {
        return format!("Check out this free guitar tab editor!\n{SHARE_LINK}");
    }
    let titles: Vec<&str> = book.records().iter().map(|r| r.title.as_str()).collect();
    format!(
        "Check out my guitar tabs!\n\n{}\n\nMade with fretpad: {SHARE_LINK}",
        titles.join(", ")
    )
}

pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::*;
    use crate::grid::Grid;

    #[test]
    fn empty_book_gets_plain_invitation() {
        let text = summary(&TabBook::new());
        assert!(text.starts_with("Check out this free guitar tab editor!"));
        assert!(text.contains(SHARE_LINK));
    }

    #[test]
    fn summary_lists_titles_in_collection_order() {
        let grid = Grid::new(4);
        let mut book = TabBook::new();
        let t0 = Local.timestamp_millis_opt(1_000).unwrap();
        let t1 = Local.timestamp_millis_opt(2_000).unwrap();
        book.save("First", &grid, t0).unwrap();
        book.save("Second", &grid, t1).unwrap();
        let text = summary(&book);
        assert!(text.contains("Second, First"));
        assert!(text.contains(SHARE_LINK));
    }
}
