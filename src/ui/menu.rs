//! Arrow-key list selection.

use std::io::{self, Write};

use crossterm::cursor::MoveUp;
use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::queue;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{self, Clear, ClearType};

use super::read_key;

/// Let the user pick one of `items` with the arrow keys.
///
/// Navigation wraps around (carousel). `default` preselects an entry,
/// which the editor uses to land on the previous choice. Returns `None`
/// when the user cancels with Esc or Ctrl-C.
pub fn select(prompt: &str, items: &[String], default: Option<usize>) -> io::Result<Option<usize>> {
    assert!(!items.is_empty());
    let mut selected = default.unwrap_or(0).min(items.len() - 1);

    let mut stdout = io::stdout();
    writeln!(stdout, "{prompt}")?;
    draw(&mut stdout, items, selected, false)?;

    terminal::enable_raw_mode()?;
    let choice = loop {
        let key = match read_key() {
            Ok(key) => key,
            Err(e) => {
                let _ = terminal::disable_raw_mode();
                return Err(e);
            }
        };
        match key.code {
            KeyCode::Up | KeyCode::Left => {
                selected = (selected + items.len() - 1) % items.len();
                draw(&mut stdout, items, selected, true)?;
            }
            KeyCode::Down | KeyCode::Right => {
                selected = (selected + 1) % items.len();
                draw(&mut stdout, items, selected, true)?;
            }
            KeyCode::Enter => break Some(selected),
            KeyCode::Esc => break None,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break None,
            _ => {}
        }
    };
    terminal::disable_raw_mode()?;

    writeln!(stdout)?;
    Ok(choice)
}

/// Render the list, moving back over the previous frame on redraws.
fn draw(stdout: &mut io::Stdout, items: &[String], selected: usize, redraw: bool) -> io::Result<()> {
    if redraw {
        queue!(stdout, MoveUp(items.len() as u16))?;
    }
    for (idx, item) in items.iter().enumerate() {
        queue!(stdout, Clear(ClearType::CurrentLine), Print("\r"))?;
        if idx == selected {
            queue!(
                stdout,
                SetAttribute(Attribute::Reverse),
                Print(format!("> {item}")),
                SetAttribute(Attribute::Reset)
            )?;
        } else {
            queue!(stdout, Print(format!("  {item}")))?;
        }
        queue!(stdout, Print("\r\n"))?;
    }
    stdout.flush()
}
