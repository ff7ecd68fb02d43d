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

use std::time::Duration;

pub const DEFAULT_LOCAL_ENDPOINT: &str = "http://localhost:11434/api";

pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Environment variable holding the remote provider credential
pub const ANTHROPIC_API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Environment variable overriding the remote provider base URL
pub const ANTHROPIC_BASE_URL_VAR: &str = "ANTHROPIC_BASE_URL";

pub const DEFAULT_REMOTE_MODEL: &str = "claude-3-sonnet-20240229";
pub const DEFAULT_LOCAL_MODEL: &str = "deepseek-coder:6.7b";
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_OUTPUT: &str = "claude.md";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);
pub const LOCAL_GENERATION_TIMEOUT: Duration = Duration::from_secs(120);
pub const REMOTE_GENERATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Substrings that mark an installed model as code-oriented when no catalog
/// entry is installed.
pub const CODING_KEYWORDS: &[&str] = &["coder", "code", "deepseek", "llama3", "qwen", "mistral"];

pub const QUIT_TOKENS: &[&str] = &["quit", "exit", ":q"];

pub const PREVIEW_CHARS: usize = 500;

pub const INTERACTIVE_OUTPUT_PREFIX: &str = "claude-context";

pub const CONFIG_DIR_NAME: &str = "ctxsynth";
pub const CONFIG_FILE_NAME: &str = "config.json";
