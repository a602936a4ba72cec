//! Colored terminal output for packaging runs
//!
//! Status lines go to stdout, errors to stderr.

use std::io::{self, Write};
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    bufwtr: BufferWriter,
    quiet: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self::new(self.quiet)
    }
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(quiet: bool) -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
            quiet,
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> io::Result<()> {
        self.symbol_line(
            "✓",
            ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true),
            None,
            message,
        )
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> io::Result<()> {
        let mut text = ColorSpec::new();
        text.set_fg(Some(Color::Yellow));
        self.symbol_line(
            "⚠",
            ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true),
            Some(&text),
            message,
        )
    }

    /// Print a progress message
    pub fn progress(&self, message: &str) -> io::Result<()> {
        self.symbol_line("⋯", ColorSpec::new().set_fg(Some(Color::Magenta)), None, message)
    }

    /// Print an error message (always shown)
    pub fn error(&self, message: &str) {
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();
        let red = ColorSpec::new().set_fg(Some(Color::Red)).clone();
        let bold_red = red.clone().set_bold(true).clone();

        if write_symbol_line(&mut buffer, "✗", &bold_red, Some(&red), message).is_err()
            || bufwtr.print(&buffer).is_err()
        {
            // Stderr failed - fallback to stdout as last resort
            println!("[STDERR ERROR] ✗ {}", message);
        }
    }

    /// Print a section header
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        writeln!(&mut buffer)?;
        buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        writeln!(&mut buffer, "═══ {} ═══", title)?;
        buffer.reset()?;
        self.bufwtr.print(&buffer)
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) -> io::Result<()> {
        self.println(&format!("    {message}"))
    }

    /// Print a plain message (respects quiet mode)
    pub fn println(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        writeln!(&mut buffer, "{}", message)?;
        self.bufwtr.print(&buffer)
    }

    fn symbol_line(
        &self,
        symbol: &str,
        symbol_spec: &ColorSpec,
        text_spec: Option<&ColorSpec>,
        message: &str,
    ) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        write_symbol_line(&mut buffer, symbol, symbol_spec, text_spec, message)?;
        self.bufwtr.print(&buffer)
    }
}

fn write_symbol_line(
    buffer: &mut Buffer,
    symbol: &str,
    symbol_spec: &ColorSpec,
    text_spec: Option<&ColorSpec>,
    message: &str,
) -> io::Result<()> {
    buffer.set_color(symbol_spec)?;
    write!(buffer, "{symbol}")?;
    buffer.reset()?;
    if let Some(spec) = text_spec {
        buffer.set_color(spec)?;
    }
    writeln!(buffer, " {message}")?;
    buffer.reset()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_suppresses_status_lines() {
        let output = OutputManager::new(true);
        assert!(output.quiet);
        assert!(output.success("done").is_ok());
        assert!(output.println("hidden").is_ok());
        assert!(output.clone().quiet);
    }

    #[test]
    fn test_symbol_line_layout() {
        let mut buffer = Buffer::no_color();
        write_symbol_line(&mut buffer, "✓", &ColorSpec::new(), None, "packaged").unwrap();
        assert_eq!(String::from_utf8(buffer.into_inner()).unwrap(), "✓ packaged\n");
    }
}
