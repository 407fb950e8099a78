use crate::command::CommandResult;
use crate::directory::Directory;
use crate::parser::{CommandParser, ParsingError};
use crate::registry::Registry;
use crate::script::{TaskError, normalize_line, read_script};
use anyhow::Context;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// What happened to a single script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line is not a command; nothing was dispatched.
    Invalid(ParsingError),
    /// The line was parsed and dispatched.
    Executed(CommandResult),
}

/// How a task (one script) ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Every line succeeded, or `EXIT` was reached.
    Completed,
    /// An invalid or failed command stopped the task.
    Failed,
}

/// Runs task scripts against a [`Directory`].
///
/// The interpreter owns the directory and a [`Registry`] of command handlers.
/// Every task starts from an empty directory.
///
/// Example
/// ```
/// use dirtask::{Interpreter, TaskStatus};
/// let mut interp = Interpreter::default();
/// let mut report = Vec::new();
/// let status = interp
///     .run_lines("demo", ["CREATE USER alice", "GET USERS", "EXIT"], &mut report)
///     .unwrap();
/// assert_eq!(status, TaskStatus::Completed);
/// assert!(String::from_utf8(report).unwrap().contains("Users: alice"));
/// ```
pub struct Interpreter {
    directory: Directory,
    registry: Registry,
    parser: CommandParser,
}

impl Interpreter {
    /// Create an interpreter dispatching through a custom registry.
    pub fn new(registry: Registry) -> Self {
        Self {
            directory: Directory::new(),
            registry,
            parser: CommandParser::new(),
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Parse and dispatch one normalized line against the current directory.
    pub fn execute_line(&mut self, line: &str) -> LineOutcome {
        match self.parser.parse(line) {
            Ok(command) => {
                debug!(%line, kind = ?command.kind(), "executing");
                LineOutcome::Executed(self.registry.dispatch(&command, &mut self.directory))
            }
            Err(err) => {
                debug!(%line, error = %err, "invalid command");
                LineOutcome::Invalid(err)
            }
        }
    }

    /// Run already normalized lines as one task named `name`, writing the report to
    /// `out`.
    ///
    /// The directory is reset first. The task stops at the first invalid or failed
    /// line; `EXIT` ends it successfully and skips whatever follows.
    pub fn run_lines<I, S>(
        &mut self,
        name: &str,
        lines: I,
        out: &mut dyn Write,
    ) -> Result<TaskStatus, TaskError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.directory.reset();
        info!(task = %name, "processing task");
        writeln!(out, "[Processing task: {name}]")?;

        for line in lines {
            let line = line.as_ref();
            match self.execute_line(line) {
                LineOutcome::Invalid(_) => {
                    writeln!(out, "❌ Invalid command: {line}")?;
                    return finish(name, TaskStatus::Failed, out);
                }
                LineOutcome::Executed(result) => {
                    writeln!(out, "{}", result.message)?;
                    if result.should_exit {
                        break;
                    }
                    if !result.success {
                        return finish(name, TaskStatus::Failed, out);
                    }
                }
            }
        }

        finish(name, TaskStatus::Completed, out)
    }

    /// Read the script at `path` and run it as one task.
    ///
    /// Fails without writing anything when the file cannot be read.
    pub fn run_script(&mut self, path: &Path, out: &mut dyn Write) -> Result<TaskStatus, TaskError> {
        let lines = read_script(path)?;
        self.run_lines(&path.display().to_string(), &lines, out)
    }

    /// Run every script in order, each as an independent task.
    ///
    /// A script that cannot be opened does not prevent the following ones from
    /// running; its error is returned in its slot.
    pub fn run_scripts<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        out: &mut dyn Write,
    ) -> Vec<Result<TaskStatus, TaskError>> {
        paths
            .iter()
            .map(|path| {
                let result = self.run_script(path.as_ref(), out);
                if let Err(err) = &result {
                    debug!(script = %path.as_ref().display(), error = %err, "task not run");
                }
                result
            })
            .collect()
    }

    /// Interactive session on a fresh directory.
    ///
    /// Lines go through the same comment stripping as scripts. Failures are reported
    /// but do not end the session; `EXIT`, Ctrl-C or Ctrl-D do.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        let mut rl = DefaultEditor::new().context("cannot start line editor")?;
        let mut stdout = std::io::stdout();
        self.directory.reset();

        loop {
            match rl.readline("dirtask> ") {
                Ok(raw) => {
                    let Some(line) = normalize_line(&raw) else {
                        continue;
                    };
                    rl.add_history_entry(line)?;
                    match self.execute_line(line) {
                        LineOutcome::Invalid(err) => {
                            writeln!(stdout, "❌ Invalid command: {line} ({err})")?
                        }
                        LineOutcome::Executed(result) => {
                            writeln!(stdout, "{}", result.message)?;
                            if result.should_exit {
                                break;
                            }
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err).context("reading interactive input"),
            }
        }

        Ok(())
    }
}

fn finish(name: &str, status: TaskStatus, out: &mut dyn Write) -> Result<TaskStatus, TaskError> {
    match status {
        TaskStatus::Completed => {
            info!(task = %name, "task completed");
            writeln!(out, "[Task {name} completed successfully]\n")?;
        }
        TaskStatus::Failed => {
            warn!(task = %name, "task stopped");
            writeln!(out, "[Task {name} stopped due to failure]\n")?;
        }
    }
    Ok(status)
}

impl Default for Interpreter {
    /// Create an interpreter with the built-in handler for every command.
    fn default() -> Self {
        Self::new(Registry::default())
    }
}
