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

mod anthropic;
mod backend;
mod catalog;
mod cli;
mod commands;
mod config;
mod configurator;
mod constants;
mod error;
mod interactive;
mod logger;
mod ollama;
mod output;
mod prober;
mod prompts;
mod synthesizer;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::backend::BackendKind;
use crate::cli::{BackendArgs, Cli, Commands, ConfigAction};
use crate::commands::{
    cmd_config_add_template, cmd_config_set_max_tokens, cmd_config_set_model,
    cmd_config_set_output, cmd_config_show, cmd_config_templates, cmd_generate, cmd_interactive,
    cmd_list_models, BackendSettings, GenerateOptions,
};
use crate::config::Config;
use crate::constants::{DEFAULT_LOCAL_ENDPOINT, DEFAULT_MAX_TOKENS, DEFAULT_OUTPUT};
use crate::logger::Logger;

/// Single-shot commands exit on Ctrl+C. The interactive session is asked to
/// stop after the current task instead; a second Ctrl+C exits.
fn install_interrupt_handler(graceful: bool, shutdown_flag: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        if graceful && !shutdown_flag.swap(true, Ordering::SeqCst) {
            println!("\nInterrupted. Finishing the current task (Ctrl+C again to exit now).");
            return;
        }
        println!("\nInterrupted. Exiting.");
        std::process::exit(130);
    })
    .context("Error setting Ctrl-C handler")
}

fn resolve_endpoint(cli_endpoint: Option<String>, config: &Config) -> String {
    cli_endpoint
        .or_else(|| config.local_endpoint.clone())
        .unwrap_or_else(|| DEFAULT_LOCAL_ENDPOINT.to_string())
}

/// Saved config, or defaults when there is no usable config location
fn load_config(config_path: &Result<PathBuf>) -> Config {
    match config_path {
        Ok(path) => Config::load_or_default(path),
        Err(e) => {
            eprintln!("Warning: {:#}. Using default configuration.", e);
            Config::default()
        }
    }
}

fn resolve_output(cli_output: Option<String>, config: &Config) -> PathBuf {
    let output = cli_output
        .or_else(|| Some(config.default_output.clone()).filter(|path| !path.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    PathBuf::from(output)
}

fn resolve_backend(args: BackendArgs, config: &Config) -> BackendSettings {
    let kind: BackendKind = args.backend.into();
    // The saved default model names a remote model; local picks its own.
    let model = match kind {
        BackendKind::Remote => args.model.or_else(|| Some(config.default_model.clone())),
        BackendKind::Local => args.model,
    };

    BackendSettings {
        kind,
        model,
        max_tokens: args
            .max_tokens
            .or(Some(config.max_tokens).filter(|&tokens| tokens > 0))
            .unwrap_or(DEFAULT_MAX_TOKENS),
        endpoint: resolve_endpoint(args.endpoint, config),
        reasoning: args.reasoning,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let shutdown_flag = Arc::new(AtomicBool::new(false));
    let graceful = matches!(cli.command, Commands::Interactive { .. });
    install_interrupt_handler(graceful, shutdown_flag.clone())?;

    let config_path = match cli.config.clone() {
        Some(path) => Ok(path),
        None => Config::default_path(),
    };

    // Config edits must not clobber a file we could not parse
    if let Commands::Config { action } = cli.command {
        return match action {
            ConfigAction::Show => {
                let path = config_path.as_ref().ok().map(PathBuf::as_path);
                cmd_config_show(&load_config(&config_path), path)
            }
            ConfigAction::Templates => cmd_config_templates(&load_config(&config_path)),
            ConfigAction::SetModel { model } => {
                let path = config_path?;
                cmd_config_set_model(Config::load(&path)?, &path, model)
            }
            ConfigAction::SetMaxTokens { max_tokens } => {
                let path = config_path?;
                cmd_config_set_max_tokens(Config::load(&path)?, &path, max_tokens)
            }
            ConfigAction::SetOutput { path: output } => {
                let path = config_path?;
                cmd_config_set_output(Config::load(&path)?, &path, output)
            }
            ConfigAction::AddTemplate { name, text } => {
                let path = config_path?;
                cmd_config_add_template(Config::load(&path)?, &path, name, text)
            }
        };
    }

    let config = load_config(&config_path);

    let log_path = cli
        .log_file
        .clone()
        .or_else(|| config.log_file.as_ref().map(PathBuf::from));
    let mut logger = Logger::open_optional(log_path.as_deref());
    if let (Some(log), Some(path)) = (logger.as_mut(), log_path.as_ref()) {
        println!("Logging to: {}", path.display());
        let _ = log.logln(&format!("Logging to: {}", path.display()));
    }

    match cli.command {
        Commands::Generate {
            task,
            examples,
            guidelines,
            template,
            output,
            preview,
            backend,
        } => {
            let template_text = template
                .as_deref()
                .and_then(|name| config.template(name))
                .map(str::to_string);
            let settings = resolve_backend(backend, &config);

            cmd_generate(
                GenerateOptions {
                    task,
                    examples,
                    guidelines,
                    template_text,
                    output: resolve_output(output, &config),
                    preview,
                },
                &settings,
                &mut logger,
            )
        }
        Commands::Interactive { backend } => {
            let settings = resolve_backend(backend, &config);
            cmd_interactive(&settings, shutdown_flag, &mut logger)
        }
        Commands::ListModels { endpoint } => {
            cmd_list_models(&resolve_endpoint(endpoint, &config), &mut logger)
        }
        Commands::Config { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::BackendChoice;

    fn args(backend: BackendChoice) -> BackendArgs {
        BackendArgs {
            backend,
            model: None,
            max_tokens: None,
            endpoint: None,
            reasoning: false,
        }
    }

    #[test]
    fn test_config_values_fill_unset_flags() {
        let mut config = Config::default();
        config.max_tokens = 2000;
        config.default_model = "claude-3-opus-20240229".to_string();
        config.local_endpoint = Some("http://gpu-box:11434/api".to_string());

        let remote = resolve_backend(args(BackendChoice::Remote), &config);
        assert_eq!(remote.kind, BackendKind::Remote);
        assert_eq!(remote.model.as_deref(), Some("claude-3-opus-20240229"));
        assert_eq!(remote.max_tokens, 2000);

        let local = resolve_backend(args(BackendChoice::Local), &config);
        assert!(local.model.is_none());
        assert_eq!(local.endpoint, "http://gpu-box:11434/api");
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config::default();
        let mut cli_args = args(BackendChoice::Local);
        cli_args.model = Some("qwen3:8b".to_string());
        cli_args.max_tokens = Some(1000);
        cli_args.endpoint = Some("http://other:11434/api".to_string());

        let settings = resolve_backend(cli_args, &config);
        assert_eq!(settings.model.as_deref(), Some("qwen3:8b"));
        assert_eq!(settings.max_tokens, 1000);
        assert_eq!(settings.endpoint, "http://other:11434/api");
        assert_eq!(resolve_endpoint(None, &config), DEFAULT_LOCAL_ENDPOINT);
    }

    #[test]
    fn test_flags_at_default_values_still_beat_config() {
        let mut config = Config::default();
        config.max_tokens = 2000;
        config.default_output = "ctx.md".to_string();

        let mut cli_args = args(BackendChoice::Local);
        cli_args.max_tokens = Some(DEFAULT_MAX_TOKENS);
        assert_eq!(resolve_backend(cli_args, &config).max_tokens, DEFAULT_MAX_TOKENS);

        assert_eq!(
            resolve_output(Some(DEFAULT_OUTPUT.to_string()), &config),
            PathBuf::from(DEFAULT_OUTPUT)
        );
        assert_eq!(resolve_output(None, &config), PathBuf::from("ctx.md"));
    }

    #[test]
    fn test_builtin_defaults_when_config_is_blank() {
        let mut config = Config::default();
        config.max_tokens = 0;
        config.default_output = String::new();

        assert_eq!(resolve_backend(args(BackendChoice::Local), &config).max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(resolve_output(None, &config), PathBuf::from(DEFAULT_OUTPUT));
    }

    #[test]
    fn test_unknown_config_location_uses_defaults() {
        let missing: Result<PathBuf> = Err(anyhow::anyhow!("Could not determine config directory"));
        assert_eq!(load_config(&missing), Config::default());
    }
}
