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

//! Local model server discovery and model selection.
//!
//! Every probe swallows network failures: an unreachable server reads as
//! "not reachable" and "nothing installed", never as an error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::{self, ModelInfo};
use crate::constants::CODING_KEYWORDS;
use crate::error::BackendError;
use crate::ollama::OllamaClient;

static CODING_MODEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<String> = CODING_KEYWORDS.iter().map(|k| regex::escape(k)).collect();
    Regex::new(&format!("(?i)(?:{})", alternatives.join("|"))).unwrap()
});

pub struct Prober {
    client: OllamaClient,
}

impl Prober {
    pub fn new(endpoint: &str) -> Result<Self, BackendError> {
        Ok(Self {
            client: OllamaClient::new(endpoint)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    pub fn client(&self) -> &OllamaClient {
        &self.client
    }

    pub fn is_server_reachable(&self) -> bool {
        self.client.health_check().is_ok()
    }

    /// Installed model names without duplicates, in the order the server
    /// lists them. Empty when the server cannot be queried.
    pub fn installed_models(&self) -> Vec<String> {
        let models = self.client.list_models().unwrap_or_default();
        let mut unique: Vec<String> = Vec::with_capacity(models.len());
        for model in models {
            if !unique.contains(&model) {
                unique.push(model);
            }
        }
        unique
    }

    pub fn select_best_model(&self) -> Option<String> {
        pick_best_model(catalog::all(), &self.installed_models())
    }
}

/// Choose a model from `installed`.
///
/// Catalog preference order wins; then the first installed name matching a
/// coding keyword; then whatever the server listed first. The last fallback
/// depends on server ordering and is not stable across servers.
pub fn pick_best_model(catalog: &[ModelInfo], installed: &[String]) -> Option<String> {
    if let Some(info) = catalog
        .iter()
        .find(|info| installed.iter().any(|name| name == info.identifier))
    {
        return Some(info.identifier.to_string());
    }

    if let Some(name) = installed.iter().find(|name| is_coding_model(name)) {
        return Some(name.clone());
    }

    installed.first().cloned()
}

pub fn is_coding_model(name: &str) -> bool {
    CODING_MODEL_PATTERN.is_match(name)
}
