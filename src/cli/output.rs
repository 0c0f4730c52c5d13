//! Colored terminal output for release operations
//!
//! Provides consistent, colored CLI output with proper formatting. Write
//! failures on the terminal are ignored; the release itself must not fail
//! because stdout went away.

use std::io::Write;
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    bufwtr: BufferWriter,
    verbose: bool,
    quiet: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self::new(self.verbose, self.quiet)
    }
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
            verbose,
            quiet,
        }
    }

    /// Output manager that prints nothing but errors
    pub fn quiet() -> Self {
        Self::new(false, true)
    }

    fn emit(&self, marker: &str, marker_spec: &ColorSpec, text_spec: Option<&ColorSpec>, message: &str) {
        if self.quiet {
            return;
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = write_marked(&mut buffer, marker, marker_spec, text_spec, message);
        let _ = self.bufwtr.print(&buffer);
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        self.emit(
            "✓",
            &color_spec(Color::Green, true),
            None,
            message,
        );
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        self.emit(
            "⚠",
            &color_spec(Color::Yellow, true),
            Some(&color_spec(Color::Yellow, false)),
            message,
        );
    }

    /// Print an error message (always shown, on stderr)
    pub fn error(&self, message: &str) {
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();

        if write_marked(
            &mut buffer,
            "✗",
            &color_spec(Color::Red, true),
            Some(&color_spec(Color::Red, false)),
            message,
        )
        .is_err()
            || bufwtr.print(&buffer).is_err()
        {
            // Stderr failed - fallback to stdout as last resort
            println!("[STDERR ERROR] ✗ {}", message);
        }
    }

    /// Print a verbose/debug message (only in verbose mode)
    pub fn verbose(&self, message: &str) {
        if !self.verbose {
            return;
        }
        self.emit(
            "→",
            &color_spec(Color::Blue, false),
            Some(&color_spec(Color::White, false)),
            message,
        );
    }

    /// Print a progress message
    pub fn progress(&self, message: &str) {
        self.emit("⋯", &color_spec(Color::Magenta, false), None, message);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        if self.quiet {
            return;
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer);
        let _ = buffer.set_color(&color_spec(Color::Cyan, true));
        let _ = writeln!(&mut buffer, "═══ {} ═══", title);
        let _ = buffer.reset();
        let _ = self.bufwtr.print(&buffer);
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) {
        self.println(&format!("    {}", message));
    }

    /// Print a plain message (respects quiet mode)
    pub fn println(&self, message: &str) {
        if self.quiet {
            return;
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer, "{}", message);
        let _ = self.bufwtr.print(&buffer);
    }

    /// Print a plain message to stderr, even in quiet mode
    pub fn eprintln(&self, message: &str) {
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();
        let _ = writeln!(&mut buffer, "{}", message);
        let _ = bufwtr.print(&buffer);
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

fn color_spec(color: Color, bold: bool) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color)).set_bold(bold);
    spec
}

fn write_marked(
    buffer: &mut Buffer,
    marker: &str,
    marker_spec: &ColorSpec,
    text_spec: Option<&ColorSpec>,
    message: &str,
) -> std::io::Result<()> {
    buffer.set_color(marker_spec)?;
    write!(buffer, "{}", marker)?;
    buffer.reset()?;
    if let Some(spec) = text_spec {
        buffer.set_color(spec)?;
    }
    writeln!(buffer, " {}", message)?;
    buffer.reset()
}
