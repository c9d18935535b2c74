//! Process-wide REPL state and the output channel.

use std::fmt::Display;
use std::io::{self, Write};

use nu_ansi_term::{Color, Style};

use crate::columnize::columnize;

/// State shared by the driver and every command for the life of a session.
pub struct ReplState {
    /// Set by `quit`; checked by the driver after each command.
    pub should_exit: bool,
    /// Exit code reported once the loop stops.
    pub exit_code: i32,
    /// Column width used by list output.
    pub line_width: usize,
    /// Emphasise errors and headings with terminal codes.
    pub highlight: bool,
    /// The most recent input line, trimmed.
    pub current_line: String,
    out: Box<dyn Write>,
}

impl ReplState {
    /// State writing to standard output.
    pub fn new(line_width: usize, highlight: bool) -> Self {
        Self::with_sink(Box::new(io::stdout()), line_width, highlight)
    }

    /// State writing to an arbitrary sink.
    pub fn with_sink(out: Box<dyn Write>, line_width: usize, highlight: bool) -> Self {
        Self {
            should_exit: false,
            exit_code: 0,
            line_width,
            highlight,
            current_line: String::new(),
            out,
        }
    }

    /// Ask the driver to stop after the current line.
    pub fn request_exit(&mut self, code: i32) {
        self.should_exit = true;
        self.exit_code = code;
    }

    /// Print a line.
    pub fn msg(&mut self, text: impl Display) {
        let _ = writeln!(self.out, "{text}");
    }

    /// Print without a trailing newline.
    pub fn msg_no_cr(&mut self, text: impl Display) {
        let _ = write!(self.out, "{text}");
        let _ = self.out.flush();
    }

    /// Print an error, set apart from normal output.
    pub fn errmsg(&mut self, text: impl Display) {
        let line = if self.highlight {
            Color::Red.bold().paint(text.to_string()).to_string()
        } else {
            format!("** {text}")
        };
        let _ = writeln!(self.out, "{line}");
    }

    /// Print a section heading.
    pub fn section(&mut self, text: impl Display) {
        let line = if self.highlight {
            Style::new().bold().paint(text.to_string()).to_string()
        } else {
            text.to_string()
        };
        let _ = writeln!(self.out, "{line}");
    }

    /// Print `title:` followed by the names, sorted and in columns.
    pub fn print_sorted(&mut self, title: &str, names: &[String]) {
        self.section(format!("{title}:"));
        self.print_columns(names, "  ");
    }

    /// Print names sorted and in columns, without a heading.
    pub fn print_columns(&mut self, names: &[String], prefix: &str) {
        let mut names = names.to_vec();
        names.sort();
        let text = columnize(&names, self.line_width, prefix);
        if !text.is_empty() {
            self.msg(text);
        }
    }

    pub fn flush(&mut self) {
        let _ = self.out.flush();
    }
}
