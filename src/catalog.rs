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

//! Recommended local models for context synthesis, in preference order.

/// Static metadata for a recommended local model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub identifier: &'static str,
    pub description: &'static str,
    pub strengths: &'static [&'static str],
    pub approximate_size: &'static str,
}

impl ModelInfo {
    pub fn install_hint(&self) -> String {
        format!("ollama pull {}  # {}", self.identifier, self.description)
    }
}

pub const CATALOG: &[ModelInfo] = &[
    ModelInfo {
        identifier: "deepseek-coder:6.7b",
        description: "Best for code understanding and context generation",
        strengths: &["Code analysis", "Technical documentation", "Architecture understanding"],
        approximate_size: "3.8GB",
    },
    ModelInfo {
        identifier: "qwen3:8b",
        description: "Strong general reasoning and context synthesis",
        strengths: &["Multi-language support", "Context understanding", "Documentation"],
        approximate_size: "5.2GB",
    },
    ModelInfo {
        identifier: "llama3:8b-instruct-q4_0",
        description: "Excellent instruction following for structured output",
        strengths: &["Instruction following", "Structured output", "Context generation"],
        approximate_size: "4.7GB",
    },
    ModelInfo {
        identifier: "mistral-openorca:7b-q4_K_M",
        description: "Good balance of performance and resource usage",
        strengths: &["Reasoning", "Context understanding", "Markdown generation"],
        approximate_size: "4.4GB",
    },
    ModelInfo {
        identifier: "opencoder:8b",
        description: "Specialized for coding tasks and context",
        strengths: &["Code understanding", "API documentation", "Context synthesis"],
        approximate_size: "4.7GB",
    },
];

pub fn lookup(identifier: &str) -> Option<&'static ModelInfo> {
    CATALOG.iter().find(|info| info.identifier == identifier)
}

pub fn all() -> &'static [ModelInfo] {
    CATALOG
}

pub fn install_hints() -> Vec<String> {
    CATALOG.iter().map(ModelInfo::install_hint).collect()
}
