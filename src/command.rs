//! Text front end for the allocator
//!
//! Parses one command per line and drives a [`MemoryManager`]:
//!
//! | Command | Effect |
//! |---|---|
//! | `RQ <process> <size> <F\|B\|W>` | allocate with first, best or worst fit |
//! | `RL <process>` | release the process's block |
//! | `C` | compact |
//! | `STAT` | print the block list |
//! | `X` | exit |
//!
//! Verbs and strategy tags are case-insensitive. Every failure, whether a
//! malformed command or an allocator outcome, becomes a single `Error:` line;
//! nothing here panics on user input.

use crate::allocator::{MemoryManager, Strategy};
use crate::error::{AllocError, Result};
use std::io::{BufRead, Write};
use tracing::debug;

const VALID_COMMANDS: &str = "Unknown command. Valid commands are RQ, RL, C, STAT, X.";

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Request {
        process: String,
        size: u64,
        strategy: Strategy,
    },
    Release {
        process: String,
    },
    Compact,
    Status,
    Exit,
}

impl Command {
    /// Parse one input line; blank lines yield `None`
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(verb) = tokens.first() else {
            return Ok(None);
        };

        let command = match verb.to_ascii_uppercase().as_str() {
            "RQ" => Self::parse_request(&tokens)?,
            "RL" => {
                if tokens.len() != 2 {
                    return Err(invalid("RL command requires exactly 1 parameter."));
                }
                Command::Release {
                    process: tokens[1].to_string(),
                }
            }
            "C" => Command::Compact,
            "STAT" => Command::Status,
            "X" => Command::Exit,
            _ => return Err(invalid(VALID_COMMANDS)),
        };

        Ok(Some(command))
    }

    fn parse_request(tokens: &[&str]) -> Result<Command> {
        if tokens.len() != 4 {
            return Err(invalid("RQ command requires exactly 3 parameters."));
        }

        // Signed parse so "-5" reads as a non-positive size, not a non-integer
        let size: i64 = tokens[2]
            .parse()
            .map_err(|_| invalid("Size must be an integer."))?;
        if size <= 0 {
            return Err(invalid("Size must be positive."));
        }

        let mut tag = tokens[3].chars();
        let tag = match (tag.next(), tag.next()) {
            (Some(c), None) => c,
            _ => return Err(invalid("Strategy must be a single character (F, B, W).")),
        };
        let strategy = Strategy::from_tag(tag).map_err(|_| {
            invalid("Strategy must be F (first fit), B (best fit), or W (worst fit).")
        })?;

        Ok(Command::Request {
            process: tokens[1].to_string(),
            size: size as u64,
            strategy,
        })
    }
}

fn invalid(message: &str) -> AllocError {
    AllocError::InvalidCommand(message.to_string())
}

/// What the caller should do after a line has been handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print these lines and keep reading
    Continue(Vec<String>),
    /// Print these lines and stop
    Exit(Vec<String>),
}

impl Outcome {
    pub fn lines(&self) -> &[String] {
        match self {
            Outcome::Continue(lines) | Outcome::Exit(lines) => lines,
        }
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, Outcome::Exit(_))
    }
}

/// User-facing text for an error
pub fn error_message(err: &AllocError) -> String {
    let text = match err {
        AllocError::DuplicateProcess(p) => format!("Process {} already has memory allocated.", p),
        AllocError::UnknownStrategy(c) => format!("Unknown allocation strategy: {}", c),
        AllocError::InsufficientMemory { .. } => {
            "Not enough memory for allocation request.".to_string()
        }
        AllocError::ProcessNotFound(p) => format!("Process {} does not have memory allocated.", p),
        other => other.to_string(),
    };
    format!("Error: {}", text)
}

/// Executes parsed commands against an address space
pub struct Dispatcher<M: MemoryManager> {
    manager: M,
    json_status: bool,
}

impl<M: MemoryManager> Dispatcher<M> {
    pub fn new(manager: M) -> Self {
        Dispatcher {
            manager,
            json_status: false,
        }
    }

    /// Render STAT as JSON instead of status lines
    pub fn with_json_status(mut self, enabled: bool) -> Self {
        self.json_status = enabled;
        self
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    pub fn into_manager(self) -> M {
        self.manager
    }

    /// Run a parsed command; allocator and formatting failures come back as `Err`
    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        debug!("Executing {:?}", command);

        let lines = match command {
            Command::Request {
                process,
                size,
                strategy,
            } => {
                self.manager.allocate(&process, size, strategy)?;
                Vec::new()
            }
            Command::Release { process } => {
                self.manager.release(&process)?;
                Vec::new()
            }
            Command::Compact => {
                self.manager.compact();
                vec!["Memory compacted.".to_string()]
            }
            Command::Status => {
                let report = self.manager.report();
                if self.json_status {
                    vec![report.to_json()?]
                } else {
                    report.lines()
                }
            }
            Command::Exit => return Ok(Outcome::Exit(vec!["Exiting allocator.".to_string()])),
        };

        Ok(Outcome::Continue(lines))
    }

    /// Parse and run one line, turning any failure into an `Error:` line
    pub fn handle_line(&mut self, line: &str) -> Outcome {
        let result = Command::parse(line).and_then(|command| match command {
            Some(command) => self.execute(command),
            None => Ok(Outcome::Continue(Vec::new())),
        });

        result.unwrap_or_else(|err| self.reject(line, err))
    }

    fn reject(&self, line: &str, err: AllocError) -> Outcome {
        debug!(
            "Rejected {:?} (allocator outcome: {}): {}",
            line.trim(),
            err.is_allocator_outcome(),
            err
        );
        Outcome::Continue(vec![error_message(&err)])
    }

    /// Read commands until `X` or end of input
    ///
    /// When `prompt` is set it is written before every line, as an
    /// interactive session expects.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
        prompt: Option<&str>,
    ) -> Result<()> {
        let mut buf = Vec::new();

        loop {
            if let Some(prompt) = prompt {
                write!(output, "{}", prompt)?;
                output.flush()?;
            }

            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            // A line that is not UTF-8 is a bad command, not the end of the session
            let outcome = match std::str::from_utf8(&buf) {
                Ok(line) => self.handle_line(line),
                Err(_) => {
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    self.reject(&line, invalid("Input line is not valid UTF-8."))
                }
            };

            for text in outcome.lines() {
                writeln!(output, "{}", text)?;
            }
            if outcome.is_exit() {
                break;
            }
        }

        output.flush()?;
        Ok(())
    }
}
