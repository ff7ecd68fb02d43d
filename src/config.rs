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

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_MAX_TOKENS, DEFAULT_OUTPUT, DEFAULT_REMOTE_MODEL,
};

pub const GENERAL_TEMPLATE: &str = "general";

/// Persisted configuration file structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Model used when none is given on the command line
    pub default_model: String,

    /// Upper bound on generated tokens
    pub max_tokens: u32,

    /// Output path for single-shot generation
    pub default_output: String,

    /// Named guideline texts
    pub templates: BTreeMap<String, String>,

    /// Local model server endpoint override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_endpoint: Option<String>,

    /// Session log file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let templates = [
            ("fastapi", "FastAPI project with Pydantic models"),
            ("django", "Django project with REST framework"),
            ("flask", "Flask web application"),
            (GENERAL_TEMPLATE, "General Python project"),
        ]
        .into_iter()
        .map(|(name, text)| (name.to_string(), text.to_string()))
        .collect();

        Self {
            default_model: DEFAULT_REMOTE_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            default_output: DEFAULT_OUTPUT.to_string(),
            templates,
            local_endpoint: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Per-user config location
    pub fn default_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load config from a file, or return default if file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if config.max_tokens == 0 {
            config.max_tokens = DEFAULT_MAX_TOKENS;
        }

        Ok(config)
    }

    /// Like `load`, but a broken file is reported and defaults are used
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {:#}. Using default configuration.", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Guideline text for `name`, falling back to the general template
    pub fn template(&self, name: &str) -> Option<&str> {
        self.templates
            .get(name)
            .or_else(|| self.templates.get(GENERAL_TEMPLATE))
            .map(String::as_str)
    }

    pub fn add_template(&mut self, name: &str, text: &str) {
        self.templates.insert(name.to_string(), text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let config = Config::load(&path).unwrap();
        assert_eq!(config.default_model, DEFAULT_REMOTE_MODEL);
        assert_eq!(config.max_tokens, 4000);
        assert_eq!(config.default_output, "claude.md");
        assert!(!config.templates[GENERAL_TEMPLATE].is_empty());
        assert!(!path.exists(), "defaults must not be written back implicitly");
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ctxsynth").join("config.json");

        let mut config = Config::default();
        config.default_model = "claude-3-opus-20240229".to_string();
        config.max_tokens = 8000;
        config.add_template("axum", "Axum service with tower middleware");
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw.get("local_endpoint").is_none());
        assert_eq!(raw["default_output"], "claude.md");
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"max_tokens": 0, "default_output": "ctx.md"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.default_output, "ctx.md");
        assert_eq!(config.default_model, DEFAULT_REMOTE_MODEL);
        assert!(config.templates.contains_key("fastapi"));
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(Config::load(&path).is_err());
        assert_eq!(Config::load_or_default(&path), Config::default());
    }

    #[test]
    fn test_unknown_template_falls_back_to_general() {
        let config = Config::default();
        assert_eq!(config.template("flask"), Some("Flask web application"));
        assert_eq!(config.template("rails"), Some("General Python project"));
    }
}
