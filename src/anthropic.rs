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
use crate::constants::{ANTHROPIC_API_VERSION, REMOTE_GENERATION_TIMEOUT};
use crate::error::BackendError;

/// Messages API request/response types
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Remote backend: one Messages API call per prompt
pub struct RemoteBackend {
    config: BackendConfig,
    client: Client,
    api_key: String,
    base_url: String,
}

impl RemoteBackend {
    pub fn new(config: BackendConfig, api_key: String, base_url: &str) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(REMOTE_GENERATION_TIMEOUT).build()?;
        Ok(Self {
            config,
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl GenerationBackend for RemoteBackend {
    fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let request = MessagesRequest {
            model: &self.config.model_name,
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/v1/messages", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .json(&request)
            .send()?;

        let parsed: MessagesResponse = parse_json_response(response)?;

        // Only text blocks carry output; anything else (e.g. thinking) is skipped
        let text: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        Ok(text)
    }
}
