//! Line editing and history through rustyline.

use std::path::{Path, PathBuf};

use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use shoal_terminal::{LineReader, ReadOutcome};
use shoal_types::error::{Result, ShoalError};

/// Where history is kept, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryFile {
    Enabled(PathBuf),
    /// History is off; the reason is shown to the user.
    Disabled(String),
}

impl HistoryFile {
    /// Decide whether `path` can hold history. A directory in the way
    /// disables it.
    pub fn at(path: Option<PathBuf>) -> Self {
        match path {
            None => Self::Disabled("HOME is not set; command history is disabled".to_string()),
            Some(path) if path.is_dir() => Self::Disabled(format!(
                "{} is a directory; command history is disabled",
                path.display()
            )),
            Some(path) => Self::Enabled(path),
        }
    }
}

/// Interactive reader with editing and a persistent history file.
pub struct RustylineReader {
    editor: DefaultEditor,
    history: Option<PathBuf>,
}

impl RustylineReader {
    pub fn new(history: Option<PathBuf>, max_history: usize) -> Result<Self> {
        let config = Config::builder()
            .max_history_size(max_history)
            .map_err(readline_error)?
            .auto_add_history(false)
            .build();
        let mut editor = DefaultEditor::with_config(config).map_err(readline_error)?;
        if let Some(path) = &history
            && path.exists()
        {
            match editor.load_history(path) {
                Ok(()) => log::info!("loaded history from {}", path.display()),
                Err(e) => log::warn!("could not read history {}: {e}", path.display()),
            }
        }
        Ok(Self { editor, history })
    }

    /// Write the history file, if one is in use.
    pub fn save_history(&mut self) {
        let Some(path) = &self.history else {
            return;
        };
        if let Err(e) = save(&mut self.editor, path) {
            log::warn!("could not save history to {}: {e}", path.display());
        }
    }
}

fn save(editor: &mut DefaultEditor, path: &Path) -> std::result::Result<(), ReadlineError> {
    editor.save_history(path)?;
    log::debug!("saved history to {}", path.display());
    Ok(())
}

fn readline_error(e: ReadlineError) -> ShoalError {
    ShoalError::Readline(e.to_string())
}

impl LineReader for RustylineReader {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor
                        .add_history_entry(line.as_str())
                        .map_err(readline_error)?;
                }
                Ok(ReadOutcome::Line(line))
            },
            // Ctrl-C drops the line being edited.
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Line(String::new())),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(e) => Err(readline_error(e)),
        }
    }
}
