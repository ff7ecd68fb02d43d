// Copyright (c) 2025 Sean McNamara <smcnam@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Interactive context generation.
//!
//! The session cycles `Idle -> AwaitingTask -> Generating -> Idle` and ends in
//! `Finished` on a quit token, end of input, or a shutdown request. A failed
//! generation is reported and the session carries on.

use anyhow::Result;
use chrono::{DateTime, Local};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::constants::QUIT_TOKENS;
use crate::logger::{log_error, log_message, log_warning, Logger};
use crate::output::{interactive_output_path, read_optional_input, write_context};
use crate::synthesizer::{ContextSynthesizer, GenerationRequest};

const TASK_PROMPT: &str = "Enter coding task description: ";
const EXAMPLES_PROMPT: &str = "Code examples file (optional, press Enter to skip): ";
const GUIDELINES_PROMPT: &str = "Guidelines file (optional, press Enter to skip): ";

/// Source of input lines. `Ok(None)` means the user is done (end of input
/// or an interrupt at the prompt).
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

pub struct RustylineSource {
    editor: DefaultEditor,
}

impl RustylineSource {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for RustylineSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingTask,
    Generating(GenerationRequest),
    Finished,
}

#[derive(Debug, Default)]
pub struct SessionSummary {
    pub written: Vec<PathBuf>,
    pub failures: usize,
}

pub fn is_quit_token(line: &str) -> bool {
    let line = line.trim();
    QUIT_TOKENS.iter().any(|token| line.eq_ignore_ascii_case(token))
}

pub struct InteractiveSession<'a, S: LineSource> {
    synthesizer: ContextSynthesizer<'a>,
    source: S,
    shutdown_flag: Arc<AtomicBool>,
    output_dir: PathBuf,
    started: DateTime<Local>,
    state: SessionState,
    accepted: usize,
}

impl<'a, S: LineSource> InteractiveSession<'a, S> {
    pub fn new(
        synthesizer: ContextSynthesizer<'a>,
        source: S,
        shutdown_flag: Arc<AtomicBool>,
        output_dir: &Path,
    ) -> Self {
        Self {
            synthesizer,
            source,
            shutdown_flag,
            output_dir: output_dir.to_path_buf(),
            started: Local::now(),
            state: SessionState::Idle,
            accepted: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn run(&mut self, logger: &mut Option<Logger>) -> Result<SessionSummary> {
        let mut summary = SessionSummary::default();

        loop {
            let state = std::mem::replace(&mut self.state, SessionState::Idle);
            self.state = match state {
                SessionState::Idle => {
                    if self.shutdown_flag.load(Ordering::SeqCst) {
                        SessionState::Finished
                    } else {
                        SessionState::AwaitingTask
                    }
                }
                SessionState::AwaitingTask => self.await_task(logger)?,
                SessionState::Generating(request) => {
                    self.generate(&request, &mut summary, logger);
                    SessionState::Idle
                }
                SessionState::Finished => {
                    self.state = SessionState::Finished;
                    break;
                }
            };
        }

        log_message(
            logger,
            &format!(
                "Interactive session finished: {} context file(s) written, {} failure(s)",
                summary.written.len(),
                summary.failures
            ),
        );
        Ok(summary)
    }

    fn await_task(&mut self, logger: &mut Option<Logger>) -> Result<SessionState> {
        let Some(line) = self.source.read_line(TASK_PROMPT)? else {
            return Ok(SessionState::Finished);
        };

        let task = line.trim();
        if is_quit_token(task) {
            return Ok(SessionState::Finished);
        }
        if task.is_empty() {
            log_warning(logger, "Task description cannot be empty");
            return Ok(SessionState::AwaitingTask);
        }
        let task = task.to_string();

        let Some(examples_path) = self.source.read_line(EXAMPLES_PROMPT)? else {
            return Ok(SessionState::Finished);
        };
        let Some(guidelines_path) = self.source.read_line(GUIDELINES_PROMPT)? else {
            return Ok(SessionState::Finished);
        };

        let code_examples = read_optional_input(optional_path(&examples_path).as_deref(), "code examples", logger);
        let guidelines = read_optional_input(optional_path(&guidelines_path).as_deref(), "guidelines", logger);

        // Ctrl+C may have arrived while blocked on a non-terminal stdin
        if self.shutdown_flag.load(Ordering::SeqCst) {
            return Ok(SessionState::Finished);
        }

        self.accepted += 1;
        Ok(SessionState::Generating(
            GenerationRequest::new(&task)
                .with_examples(code_examples)
                .with_guidelines(guidelines),
        ))
    }

    fn generate(
        &mut self,
        request: &GenerationRequest,
        summary: &mut SessionSummary,
        logger: &mut Option<Logger>,
    ) {
        log_message(logger, "Generating context...");

        let result = match self.synthesizer.generate(request) {
            Ok(result) => result,
            Err(e) => {
                log_error(logger, &format!("Context generation failed: {}", e));
                summary.failures += 1;
                return;
            }
        };

        let path = self
            .output_dir
            .join(interactive_output_path(&self.started, self.accepted));
        match write_context(&path, &result.markdown_context) {
            Ok(()) => {
                log_message(logger, &format!("Context saved to: {}", path.display()));
                println!("Next step: use it with Claude CLI: claude --file {}", path.display());
                println!("{}", "-".repeat(50));
                summary.written.push(path);
            }
            Err(e) => {
                log_error(logger, &format!("{:#}", e));
                summary.failures += 1;
            }
        }
    }
}

fn optional_path(line: &str) -> Option<PathBuf> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}
