//! Terminal UI.

use console::Term;
use std::io::Write;

use super::{should_use_colors, OutputMode, StrataTheme, UserInterface};

/// Writes status to stdout and errors to stderr.
pub struct TerminalUI {
    out: Term,
    err: Term,
    theme: StrataTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a terminal UI, styled unless `plain` or colors are unavailable.
    pub fn new(mode: OutputMode, plain: bool) -> Self {
        let theme = if !plain && should_use_colors() {
            StrataTheme::new()
        } else {
            StrataTheme::plain()
        };

        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            theme,
            mode,
        }
    }

    /// Theme in use.
    pub fn theme(&self) -> &StrataTheme {
        &self.theme
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.err, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_hint(hint)).ok();
        }
    }

    fn raw(&mut self, text: &str) {
        writeln!(self.out, "{}", text).ok();
    }
}

/// Create the UI for a CLI invocation.
pub fn create_ui(mode: OutputMode, no_color: bool) -> Box<dyn UserInterface> {
    Box::new(TerminalUI::new(mode, no_color))
}
