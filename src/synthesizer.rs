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

//! Context generation: compose one prompt, make one backend call, return
//! the markdown.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::backend::GenerationBackend;
use crate::error::{BackendError, GenerationError};
use crate::prompts::compose_prompt;

static MARKDOWN_CONTEXT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*\[\[\s*##\s*markdown_context\s*##\s*\]\][ \t]*\r?$").unwrap()
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub task_description: String,
    pub code_examples: String,
    pub project_guidelines: String,
}

impl GenerationRequest {
    pub fn new(task_description: &str) -> Self {
        Self {
            task_description: task_description.to_string(),
            ..Self::default()
        }
    }

    pub fn with_examples(mut self, code_examples: String) -> Self {
        self.code_examples = code_examples;
        self
    }

    pub fn with_guidelines(mut self, project_guidelines: String) -> Self {
        self.project_guidelines = project_guidelines;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub markdown_context: String,
}

pub struct ContextSynthesizer<'a> {
    backend: Option<&'a dyn GenerationBackend>,
    reasoning: bool,
}

impl<'a> ContextSynthesizer<'a> {
    pub fn new(backend: Option<&'a dyn GenerationBackend>) -> Self {
        Self {
            backend,
            reasoning: false,
        }
    }

    /// Ask the backend to reason before answering; only the text after the
    /// output marker is returned.
    pub fn with_reasoning(mut self, reasoning: bool) -> Self {
        self.reasoning = reasoning;
        self
    }

    pub fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerationError> {
        let backend = self.backend.ok_or(GenerationError::NoActiveBackend)?;

        if request.task_description.trim().is_empty() {
            return Err(GenerationError::EmptyTask);
        }

        let prompt = compose_prompt(
            &request.task_description,
            &request.code_examples,
            &request.project_guidelines,
            self.reasoning,
        );

        let raw = backend.generate(&prompt)?;

        let markdown_context = if self.reasoning {
            extract_markdown_context(&raw).to_string()
        } else {
            raw
        };

        check_response(&markdown_context)?;
        Ok(GenerationResult { markdown_context })
    }
}

/// Text after the last output marker line, or all of `raw` when there is none
pub fn extract_markdown_context(raw: &str) -> &str {
    match MARKDOWN_CONTEXT_LINE.find_iter(raw).last() {
        Some(marker) => raw[marker.end()..].trim_start_matches(['\r', '\n']),
        None => raw,
    }
}

fn check_response(text: &str) -> Result<(), BackendError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(BackendError::EmptyResponse);
    }
    if trimmed.starts_with("Error:") {
        let first_line = trimmed.lines().next().unwrap_or(trimmed);
        return Err(BackendError::ErrorResponse(first_line.to_string()));
    }
    Ok(())
}
