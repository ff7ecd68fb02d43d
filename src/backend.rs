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

use serde::de::DeserializeOwned;

use crate::error::BackendError;

/// Which generation provider a backend talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Local,
}

impl BackendKind {
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Remote => "remote",
            BackendKind::Local => "local",
        }
    }
}

/// Parameters of an activated backend. `endpoint` is set iff the kind is Local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub model_name: String,
    pub max_tokens: u32,
    pub endpoint: Option<String>,
}

impl BackendConfig {
    pub fn remote(model_name: &str, max_tokens: u32) -> Self {
        Self {
            kind: BackendKind::Remote,
            model_name: model_name.to_string(),
            max_tokens,
            endpoint: None,
        }
    }

    pub fn local(model_name: &str, max_tokens: u32, endpoint: &str) -> Self {
        Self {
            kind: BackendKind::Local,
            model_name: model_name.to_string(),
            max_tokens,
            endpoint: Some(endpoint.trim_end_matches('/').to_string()),
        }
    }

    pub fn describe(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{} model {} at {}", self.kind.name(), self.model_name, endpoint),
            None => format!("{} model {}", self.kind.name(), self.model_name),
        }
    }
}

/// The one capability every backend offers: turn a prompt into text.
///
/// A call is atomic. It returns the complete response or fails; there is no
/// streaming and no retry.
pub trait GenerationBackend {
    fn config(&self) -> &BackendConfig;

    fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Decode a JSON body, mapping non-success statuses and bad JSON to backend errors
pub(crate) fn parse_json_response<T: DeserializeOwned>(
    response: reqwest::blocking::Response,
) -> Result<T, BackendError> {
    let status = response.status();
    let body = response.text()?;

    if !status.is_success() {
        return Err(BackendError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| BackendError::MalformedBody(e.to_string()))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_config_carries_endpoint() {
        let config = BackendConfig::local("qwen3:8b", 2000, "http://localhost:11434/api/");
        assert_eq!(config.kind, BackendKind::Local);
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:11434/api"));
        assert_eq!(config.describe(), "local model qwen3:8b at http://localhost:11434/api");
    }

    #[test]
    fn test_remote_config_has_no_endpoint() {
        let config = BackendConfig::remote("claude-3-sonnet-20240229", 4000);
        assert_eq!(config.kind, BackendKind::Remote);
        assert!(config.endpoint.is_none());
        assert_eq!(config.describe(), "remote model claude-3-sonnet-20240229");
    }
}
