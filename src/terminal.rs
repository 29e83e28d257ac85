use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Terminal abstraction for rendering
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    alternate_screen: bool,
}

/// A single cell in the terminal buffer
#[derive(Clone, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bold: false,
        }
    }
}

/// Input relevant to the animation loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    Key(KeyCode, KeyModifiers),
    /// Terminal gained (true) or lost (false) focus
    Focus(bool),
    Resize(u16, u16),
}

impl Terminal {
    /// Take over the terminal: raw mode, alternate screen, focus reporting
    pub fn new() -> io::Result<Self> {
        let (width, height) = size()?;

        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, Hide, EnableFocusChange)?;

        Ok(Self {
            width,
            height,
            buffer: vec![vec![Cell::default(); width as usize]; height as usize],
            alternate_screen: true,
        })
    }

    /// Off-screen buffer of a fixed size (print mode, tests)
    pub fn headless(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            buffer: vec![vec![Cell::default(); width as usize]; height as usize],
            alternate_screen: false,
        }
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = vec![vec![Cell::default(); width as usize]; height as usize];
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            row.fill(Cell::default());
        }
    }

    /// Clear the actual terminal
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    /// Set a character at position with optional color
    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize][x as usize] = Cell { ch, fg, bold };
        }
    }

    /// Set a string starting at position
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.buffer.get(y as usize)?.get(x as usize)
    }

    /// Render the entire buffer to screen
    pub fn present(&self) -> io::Result<()> {
        let mut out = stdout();

        for (y, row) in self.buffer.iter().enumerate() {
            queue!(out, MoveTo(0, y as u16))?;

            for cell in row {
                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Bold))?;
                }

                if let Some(color) = cell.fg {
                    queue!(out, SetForegroundColor(color), Print(cell.ch), ResetColor)?;
                } else {
                    queue!(out, Print(cell.ch))?;
                }

                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Reset))?;
                }
            }
        }

        out.flush()?;
        Ok(())
    }

    /// Next pending input, non-blocking
    pub fn poll_input(&self) -> io::Result<Option<Input>> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    return Ok(Some(Input::Key(key.code, key.modifiers)));
                }
                Event::FocusGained => return Ok(Some(Input::Focus(true))),
                Event::FocusLost => return Ok(Some(Input::Focus(false))),
                Event::Resize(w, h) => return Ok(Some(Input::Resize(w, h))),
                _ => {}
            }
        }
        Ok(None)
    }

    /// Sleep for specified duration
    pub fn sleep(&self, seconds: f32) {
        std::thread::sleep(Duration::from_secs_f32(seconds.max(0.0)));
    }

    /// Buffer as text with ANSI colors (print mode)
    pub fn to_ansi(&self, color: bool) -> String {
        let mut out = String::new();
        for row in &self.buffer {
            for cell in row {
                if !color || cell.ch == ' ' {
                    out.push(cell.ch);
                    continue;
                }

                if cell.bold {
                    out.push_str("\x1b[1m");
                }

                if let Some(fg) = cell.fg {
                    out.push_str(&ansi_fg(fg));
                }

                out.push(cell.ch);
                out.push_str("\x1b[0m");
            }
            out.push('\n');
        }
        out
    }

    /// Print buffer to stdout (print mode)
    pub fn print_to_stdout(&self, color: bool) -> io::Result<()> {
        let mut out = stdout().lock();
        out.write_all(self.to_ansi(color).as_bytes())?;
        out.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(stdout(), DisableFocusChange, Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}

fn ansi_fg(color: Color) -> String {
    match color {
        Color::Rgb { r, g, b } => format!("\x1b[38;2;{};{};{}m", r, g, b),
        Color::AnsiValue(v) => format!("\x1b[38;5;{}m", v),
        // Standard colors (0-7)
        Color::Black => "\x1b[30m".into(),
        Color::DarkRed => "\x1b[31m".into(),
        Color::DarkGreen => "\x1b[32m".into(),
        Color::DarkYellow => "\x1b[33m".into(),
        Color::DarkBlue => "\x1b[34m".into(),
        Color::DarkMagenta => "\x1b[35m".into(),
        Color::DarkCyan => "\x1b[36m".into(),
        Color::Grey => "\x1b[37m".into(),
        // Bright colors (8-15)
        Color::DarkGrey => "\x1b[90m".into(),
        Color::Red => "\x1b[91m".into(),
        Color::Green => "\x1b[92m".into(),
        Color::Yellow => "\x1b[93m".into(),
        Color::Blue => "\x1b[94m".into(),
        Color::Magenta => "\x1b[95m".into(),
        Color::Cyan => "\x1b[96m".into(),
        Color::White => "\x1b[97m".into(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_ignores_out_of_bounds() {
        let mut term = Terminal::headless(4, 2);
        term.set(-1, 0, 'x', None, false);
        term.set(4, 1, 'x', None, false);
        term.set(3, 1, 'y', None, false);
        assert_eq!(term.get(3, 1).map(|c| c.ch), Some('y'));
        assert_eq!(term.to_ansi(false), "    \n   y\n");
    }

    #[test]
    fn ansi_output_wraps_colored_cells() {
        let mut term = Terminal::headless(2, 1);
        term.set_str(0, 0, "ab", Some(Color::Cyan), true);
        let text = term.to_ansi(true);
        assert!(text.starts_with("\x1b[1m\x1b[96ma\x1b[0m"));
    }

    #[test]
    fn resize_resets_buffer() {
        let mut term = Terminal::headless(2, 2);
        term.set(0, 0, 'z', None, false);
        term.resize(3, 1);
        assert_eq!(term.size(), (3, 1));
        assert_eq!(term.to_ansi(false), "   \n");
    }
}
