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

//! Error kinds for backend activation and context generation.
//!
//! Activation and generation failures are expected operational conditions
//! that callers match on. Command plumbing (files, config) stays on
//! `anyhow`.

use thiserror::Error;

/// Failure to install a backend as the active generation target.
#[derive(Debug, Error)]
pub enum ActivationError {
    #[error("{var} environment variable is required for the remote backend")]
    MissingCredential { var: String },

    #[error("local model server is not reachable at {endpoint}. Start it with: ollama serve")]
    ServerUnreachable { endpoint: String },

    #[error("no suitable model is installed on the local model server at {endpoint}")]
    NoModelAvailable {
        endpoint: String,
        install_hints: Vec<String>,
    },

    #[error("failed to initialize HTTP client: {0}")]
    ClientSetup(#[from] BackendError),
}

/// Failure of a single generation call.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    #[error("backend returned an empty response")]
    EmptyResponse,

    #[error("backend returned an error response: {0}")]
    ErrorResponse(String),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("task description cannot be empty")]
    EmptyTask,

    #[error("no backend has been activated")]
    NoActiveBackend,

    #[error("generation failed: {0}")]
    Backend(#[from] BackendError),
}
