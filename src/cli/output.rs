//! Colored terminal output for the check transcript.
//!
//! Diagnostics are emitted incrementally as checks run so a long run gives
//! continuous feedback; the final summary is printed separately from the
//! recorded status map.

#![allow(dead_code)] // Public API - methods may be used by external consumers

use std::io::Write;
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    bufwtr: BufferWriter,
    verbose: bool,
    quiet: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
            verbose: self.verbose,
            quiet: self.quiet,
        }
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

    fn line(&self, marker: &str, color: Option<Color>, bold: bool, message: &str) {
        if self.quiet {
            return;
        }
        let mut buffer = self.bufwtr.buffer();
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        let _ = buffer.set_color(&spec);
        let _ = write!(&mut buffer, "  {marker}");
        let _ = buffer.reset();
        let _ = writeln!(&mut buffer, " {message}");
        let _ = self.bufwtr.print(&buffer);
    }

    /// A check that passed
    pub fn pass(&self, message: &str) {
        self.line("✓", Some(Color::Green), true, message);
    }

    /// A check that failed (transcript line, not a fatal error)
    pub fn fail(&self, message: &str) {
        self.line("✗", Some(Color::Red), true, message);
    }

    /// A repository skipped because a dependency is not ready
    pub fn skip(&self, message: &str) {
        self.line("●", Some(Color::Yellow), true, message);
    }

    /// An action being taken (remediation in progress)
    pub fn action(&self, message: &str) {
        self.line("→", Some(Color::Magenta), false, message);
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        self.line("⚠", Some(Color::Yellow), true, message);
    }

    /// Print a verbose/debug message (only in verbose mode)
    pub fn verbose(&self, message: &str) {
        if !self.verbose {
            return;
        }
        self.line("·", Some(Color::Blue), false, message);
    }

    /// Print an error message to stderr (always shown)
    pub fn error(&self, message: &str) {
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
        let _ = write!(&mut buffer, "✗");
        let _ = buffer.reset();
        let _ = writeln!(&mut buffer, " {message}");
        let _ = bufwtr.print(&buffer);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        if self.quiet {
            return;
        }
        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer);
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
        let _ = writeln!(&mut buffer, "{title}");
        let _ = buffer.reset();
        let _ = self.bufwtr.print(&buffer);
    }

    /// Print indented text (for sub-items under a check line)
    pub fn indent(&self, message: &str) {
        if self.quiet {
            return;
        }
        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer, "      {message}");
        let _ = self.bufwtr.print(&buffer);
    }

    /// Print a plain message (respects quiet mode)
    pub fn println(&self, message: &str) {
        if self.quiet {
            return;
        }
        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer, "{message}");
        let _ = self.bufwtr.print(&buffer);
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}
