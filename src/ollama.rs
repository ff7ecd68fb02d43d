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

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::backend::{parse_json_response, BackendConfig, GenerationBackend};
use crate::constants::{DEFAULT_TEMPERATURE, HEALTH_CHECK_TIMEOUT, LOCAL_GENERATION_TIMEOUT};
use crate::error::BackendError;

/// Local model server request/response types
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

/// Blocking client for a local model server speaking the Ollama HTTP API
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    endpoint: String,
}

impl OllamaClient {
    pub fn new(endpoint: &str) -> Result<Self, BackendError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Succeeds when `GET <endpoint>/tags` answers with a success status
    pub fn health_check(&self) -> Result<(), BackendError> {
        let url = format!("{}/tags", self.endpoint);
        let response = self.client.get(&url).timeout(HEALTH_CHECK_TIMEOUT).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        Ok(())
    }

    /// Model names as reported by `GET <endpoint>/tags`, in server order
    pub fn list_models(&self) -> Result<Vec<String>, BackendError> {
        let url = format!("{}/tags", self.endpoint);
        let response = self.client.get(&url).timeout(HEALTH_CHECK_TIMEOUT).send()?;

        let tags: TagsResponse = parse_json_response(response)?;
        Ok(tags.models.into_iter().map(|model| model.name).collect())
    }

    pub fn generate(&self, model: &str, prompt: &str, max_tokens: u32) -> Result<String, BackendError> {
        let url = format!("{}/generate", self.endpoint);
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: max_tokens,
                temperature: DEFAULT_TEMPERATURE,
            },
        };

        let response = self
            .client
            .post(&url)
            .timeout(LOCAL_GENERATION_TIMEOUT)
            .json(&request)
            .send()?;

        let generated: GenerateResponse = parse_json_response(response)?;
        Ok(generated.response)
    }
}

/// Local backend: one blocking `POST /generate` per prompt
pub struct LocalBackend {
    config: BackendConfig,
    client: OllamaClient,
}

impl LocalBackend {
    pub fn new(config: BackendConfig, client: OllamaClient) -> Self {
        Self { config, client }
    }
}

impl GenerationBackend for LocalBackend {
    fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        self.client
            .generate(&self.config.model_name, prompt, self.config.max_tokens)
    }
}
