//! Line editing with Tab completion and inline validation.

use std::io::{self, Write};

use crossterm::cursor::{MoveDown, MoveToColumn, MoveUp};
use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};

use super::read_key;

/// Tab state: the prefix typed before the first Tab, the matches it
/// produced, and the next match to show. Any other key resets it so a
/// fresh prefix is picked up.
struct Cycle {
    matches: Vec<String>,
    next: usize,
}

/// Read a line of input.
///
/// `initial` pre-fills the buffer (used by the title editor). When
/// `complete` is given, Tab cycles through its matches for the prefix
/// typed so far. Enter accepts only if `validate` passes; otherwise the
/// message is shown below the line and editing continues. Esc or Ctrl-C
/// cancels and returns `None`.
pub fn prompt_line(
    label: &str,
    initial: &str,
    complete: Option<&dyn Fn(&str) -> Vec<String>>,
    validate: &dyn Fn(&str) -> Result<(), String>,
) -> io::Result<Option<String>> {
    let mut stdout = io::stdout();
    let mut buffer = initial.to_string();
    let mut cycle: Option<Cycle> = None;

    draw(&mut stdout, label, &buffer)?;
    terminal::enable_raw_mode()?;

    let entered = loop {
        let key = match read_key() {
            Ok(key) => key,
            Err(e) => {
                let _ = terminal::disable_raw_mode();
                return Err(e);
            }
        };
        match key.code {
            KeyCode::Enter => match validate(&buffer) {
                Ok(()) => break Some(buffer),
                Err(message) => {
                    show_error(&mut stdout, &message)?;
                    draw(&mut stdout, label, &buffer)?;
                }
            },
            KeyCode::Esc => break None,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break None,
            KeyCode::Tab => {
                if let Some(complete) = complete {
                    let cycle = cycle.get_or_insert_with(|| Cycle {
                        matches: complete(&buffer),
                        next: 0,
                    });
                    if !cycle.matches.is_empty() {
                        buffer = cycle.matches[cycle.next % cycle.matches.len()].clone();
                        cycle.next += 1;
                        draw(&mut stdout, label, &buffer)?;
                    }
                }
            }
            KeyCode::Backspace => {
                cycle = None;
                buffer.pop();
                draw(&mut stdout, label, &buffer)?;
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                cycle = None;
                buffer.push(c);
                draw(&mut stdout, label, &buffer)?;
            }
            _ => {}
        }
    };
    terminal::disable_raw_mode()?;

    // Step over the error line so later output never overwrites it
    queue!(stdout, Print("\r\n"), Clear(ClearType::CurrentLine))?;
    stdout.flush()?;
    Ok(entered)
}

/// Redraw the input line in place.
fn draw(stdout: &mut io::Stdout, label: &str, buffer: &str) -> io::Result<()> {
    queue!(
        stdout,
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(format!("{label}: {buffer}"))
    )?;
    stdout.flush()
}

/// Write a validation message on the line below the input.
fn show_error(stdout: &mut io::Stdout, message: &str) -> io::Result<()> {
    queue!(
        stdout,
        MoveDown(1),
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        SetForegroundColor(Color::Red),
        Print(message),
        ResetColor,
        MoveUp(1)
    )?;
    stdout.flush()
}
