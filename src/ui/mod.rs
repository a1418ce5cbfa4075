//! Terminal front-end helpers.
//!
//! Raw-mode list selection (menu.rs) and line editing with Tab
//! completion (input.rs), plus the screen/header plumbing they share.
//! Every interaction can be cancelled with Esc or Ctrl-C, which unwinds
//! to the enclosing menu without committing anything.

pub mod input;
pub mod menu;

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};

pub use input::prompt_line;
pub use menu::select;

/// Clear the terminal and print the application header, with an
/// optional screen title below it.
pub fn clear_and_header(screen: Option<&str>) -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    writeln!(stdout, "---- Image Tag Editor ----")?;
    if let Some(screen) = screen {
        writeln!(stdout, "\n{screen}\n")?;
    }
    stdout.flush()
}

/// Block until the user presses Enter (or cancels; either way the
/// caller just moves on).
pub fn pause(message: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "\n{message}")?;
    stdout.flush()?;
    crossterm::terminal::enable_raw_mode()?;
    let result = loop {
        match read_key() {
            Ok(key) if matches!(key.code, KeyCode::Enter | KeyCode::Esc) => break Ok(()),
            Ok(key)
                if key.code == KeyCode::Char('c')
                    && key.modifiers.contains(event::KeyModifiers::CONTROL) =>
            {
                break Ok(())
            }
            Ok(_) => continue,
            Err(e) => break Err(e),
        }
    };
    crossterm::terminal::disable_raw_mode()?;
    result
}

/// Next key *press*. Release/repeat events (reported on some
/// platforms) and non-key events are skipped.
pub(crate) fn read_key() -> io::Result<KeyEvent> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(key);
            }
        }
    }
}
