//! `pagegrab menu`: interactive text menu on stdin/stdout.

use anyhow::Result;

use crate::cli::menu::Menu;
use crate::cli::session::Session;

pub fn run_menu(session: &mut Session) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    Menu::new(session, stdin.lock(), stdout.lock()).run()
}
