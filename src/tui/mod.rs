pub mod app;
mod event;
mod form;
pub mod theme;
mod ui;

use anyhow::Result;

use crate::config::Config;
use crate::store::Store;

pub fn run(store: Store, config: Config) -> Result<()> {
    let mut terminal = ratatui::init();
    let mut app = app::App::new(store, config)?;
    let result = app.run(&mut terminal);
    ratatui::restore();
    result
}
