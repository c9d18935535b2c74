//! The read-eval-print loop.
//!
//! Each iteration reads one line, offers it to the command processor, and
//! if no command claims it, runs it through the evaluator's
//! parse/check/eval pipeline and prints the outcome. Nothing runs
//! concurrently; the only blocking point is the line read.

use std::io::{BufRead, Write};

use shoal_types::error::Result;
use shoal_types::eval::{DynamicValue, Evaluator};

use crate::processor::{Disposition, process_line};
use crate::registry::{CommandRegistry, Shell};
use crate::state::ReplState;

/// Result of asking for the next line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// End of input; the loop stops gracefully.
    Eof,
}

/// Source of input lines.
pub trait LineReader {
    /// Show `prompt` and read one line. Errors other than end of input are
    /// fatal to the loop.
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;
}

/// Plain line reader over any buffered input, without editing or history.
pub struct StdinReader<R: BufRead> {
    input: R,
}

impl<R: BufRead> StdinReader<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> LineReader for StdinReader<R> {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(ReadOutcome::Eof);
        }
        let len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(len);
        Ok(ReadOutcome::Line(line))
    }
}

/// One kept result: a single value or a whole multi-value tuple.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultEntry<V> {
    Single(V),
    Multi(Vec<V>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Running,
    Stopped,
}

/// The REPL driver. Owns the registry, the shared state, the evaluator,
/// and the list of kept results.
pub struct Repl<E: Evaluator> {
    registry: CommandRegistry<E>,
    state: ReplState,
    eval: E,
    results: Vec<ResultEntry<E::Value>>,
    prompt: String,
    status: Status,
}

impl<E: Evaluator> Repl<E> {
    pub fn new(registry: CommandRegistry<E>, state: ReplState, eval: E) -> Self {
        Self {
            registry,
            state,
            eval,
            results: Vec::new(),
            prompt: "shoal> ".to_string(),
            status: Status::Running,
        }
    }

    /// Sets the prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn state(&self) -> &ReplState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ReplState {
        &mut self.state
    }

    pub fn evaluator(&self) -> &E {
        &self.eval
    }

    pub fn registry(&self) -> &CommandRegistry<E> {
        &self.registry
    }

    /// Results kept so far, in order.
    pub fn results(&self) -> &[ResultEntry<E::Value>] {
        &self.results
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    /// Run until `quit` or end of input. Returns the exit code.
    pub fn run(&mut self, reader: &mut dyn LineReader) -> Result<i32> {
        self.status = Status::Running;
        while self.status == Status::Running {
            match reader.read_line(&self.prompt) {
                Ok(ReadOutcome::Line(line)) => self.handle_line(&line),
                Ok(ReadOutcome::Eof) => {
                    log::info!("end of input");
                    self.status = Status::Stopped;
                },
                Err(e) => {
                    self.state.flush();
                    return Err(e);
                },
            }
        }
        self.state.flush();
        Ok(self.state.exit_code)
    }

    /// Handle one line of input: a command, or an expression to evaluate.
    pub fn handle_line(&mut self, line: &str) {
        let disposition = {
            let mut shell = Shell {
                registry: &self.registry,
                state: &mut self.state,
                eval: &mut self.eval,
            };
            process_line(line, &mut shell)
        };
        match disposition {
            Disposition::Consumed => {
                if self.state.should_exit {
                    log::info!("quit requested (exit code {})", self.state.exit_code);
                    self.status = Status::Stopped;
                }
            },
            Disposition::PassThrough => self.evaluate(line),
        }
    }

    fn evaluate(&mut self, line: &str) {
        let expr = match self.eval.parse(line) {
            Ok(expr) => expr,
            Err(e) => {
                let (source, caret) = e.indicator(line);
                self.state.msg(source);
                self.state.msg(caret);
                self.state.errmsg(format!("parse error: {e}"));
                return;
            },
        };
        let checked = match self.eval.check(&expr) {
            Ok(checked) => checked,
            Err(errors) => {
                for error in errors {
                    self.state.errmsg(error);
                }
                return;
            },
        };
        let values = match self.eval.eval(&checked) {
            Ok(values) => values,
            Err(e) => {
                self.state.errmsg(format!("eval error: {e}"));
                return;
            },
        };

        match values {
            None => self.state.msg("Kind=nil\nnil"),
            Some(values) if values.is_empty() => self.state.msg("Kind=Slice\nvoid"),
            Some(mut values) if values.len() == 1 => {
                let index = self.results.len();
                let Some(value) = values.pop() else {
                    return;
                };
                let kind = value.kind_name();
                let typ = value.type_name();
                if kind == typ {
                    self.state.msg(format!("Kind = Type = {kind}"));
                } else {
                    self.state.msg(format!("Kind = {kind}"));
                    self.state.msg(format!("Type = {typ}"));
                }
                self.state.msg(format!("results[{index}] = {}", value.render()));
                self.eval.record_result(index, std::slice::from_ref(&value));
                self.results.push(ResultEntry::Single(value));
            },
            Some(values) => {
                let index = self.results.len();
                self.state.msg("Kind = Multi-Value");
                let rendered: Vec<String> = values.iter().map(DynamicValue::render).collect();
                self.state.msg(rendered.join(", "));
                self.eval.record_result(index, &values);
                self.results.push(ResultEntry::Multi(values));
            },
        }
    }
}
