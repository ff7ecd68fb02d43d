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

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::backend::{BackendConfig, BackendKind};
use crate::catalog;
use crate::config::Config;
use crate::configurator::Configurator;
use crate::error::{ActivationError, GenerationError};
use crate::interactive::{InteractiveSession, RustylineSource};
use crate::logger::{log_error, log_message, Logger};
use crate::output::{preview, read_optional_input, write_context};
use crate::prober::{is_coding_model, pick_best_model, Prober};
use crate::synthesizer::{ContextSynthesizer, GenerationRequest};

/// Backend parameters after CLI and config have been merged
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub kind: BackendKind,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub endpoint: String,
    pub reasoning: bool,
}

pub struct GenerateOptions {
    pub task: String,
    pub examples: Option<PathBuf>,
    pub guidelines: Option<PathBuf>,
    /// Guideline text used when no guidelines file is given
    pub template_text: Option<String>,
    pub output: PathBuf,
    pub preview: bool,
}

fn activate_backend(settings: &BackendSettings, logger: &mut Option<Logger>) -> Result<Configurator> {
    let prober = Prober::new(&settings.endpoint)?;
    let mut configurator = Configurator::new(prober);

    log_message(logger, &format!("Activating {} backend...", settings.kind.name()));
    match configurator.activate(settings.kind, settings.model.as_deref(), settings.max_tokens) {
        Ok(config) => {
            print_activation_summary(&config, logger);
            Ok(configurator)
        }
        Err(ActivationError::NoModelAvailable {
            endpoint,
            install_hints,
        }) => {
            println!("Install one of the recommended models:");
            for hint in &install_hints {
                println!("  {}", hint);
            }
            Err(ActivationError::NoModelAvailable {
                endpoint,
                install_hints,
            }
            .into())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_activation_summary(config: &BackendConfig, logger: &mut Option<Logger>) {
    log_message(logger, &format!("Using {}", config.describe()));
    if let Some(info) = catalog::lookup(&config.model_name) {
        println!("  {}", info.description);
        println!("  Strengths: {}", info.strengths.join(", "));
    }
}

pub fn cmd_generate(
    options: GenerateOptions,
    settings: &BackendSettings,
    logger: &mut Option<Logger>,
) -> Result<()> {
    if options.task.trim().is_empty() {
        return Err(GenerationError::EmptyTask.into());
    }

    let configurator = activate_backend(settings, logger)?;

    let code_examples = read_optional_input(options.examples.as_deref(), "code examples", logger);
    let guidelines = match (&options.guidelines, &options.template_text) {
        (Some(path), _) => read_optional_input(Some(path.as_path()), "guidelines", logger),
        (None, Some(text)) => text.clone(),
        (None, None) => String::new(),
    };

    let request = GenerationRequest::new(&options.task)
        .with_examples(code_examples)
        .with_guidelines(guidelines);

    log_message(logger, "Generating context...");
    let result = ContextSynthesizer::new(configurator.active())
        .with_reasoning(settings.reasoning)
        .generate(&request)
        .context("Context generation failed")?;

    write_context(&options.output, &result.markdown_context)?;
    log_message(logger, &format!("Context saved to: {}", options.output.display()));

    if options.preview {
        println!("\nPreview:\n{}", "-".repeat(50));
        println!("{}", preview(&result.markdown_context));
    }

    Ok(())
}

pub fn cmd_interactive(
    settings: &BackendSettings,
    shutdown_flag: Arc<AtomicBool>,
    logger: &mut Option<Logger>,
) -> Result<()> {
    let configurator = activate_backend(settings, logger)?;

    println!("Interactive mode. Enter 'quit', 'exit' or ':q' to finish.");
    println!("{}", "-".repeat(50));

    let synthesizer =
        ContextSynthesizer::new(configurator.active()).with_reasoning(settings.reasoning);
    let source = RustylineSource::new().context("Failed to initialize line editor")?;
    let mut session = InteractiveSession::new(synthesizer, source, shutdown_flag, Path::new("."));

    session.run(logger)?;
    Ok(())
}

pub fn cmd_list_models(endpoint: &str, logger: &mut Option<Logger>) -> Result<()> {
    let prober = Prober::new(endpoint)?;

    let reachable = prober.is_server_reachable();
    let installed = if reachable {
        log_message(logger, &format!("Local model server running at {}", prober.endpoint()));
        prober.installed_models()
    } else {
        log_error(
            logger,
            &format!("Local model server is not reachable at {}", prober.endpoint()),
        );
        println!("Start it with: ollama serve");
        Vec::new()
    };

    println!("\nRecommended models:");
    for info in catalog::all() {
        let is_installed = installed.iter().any(|name| name == info.identifier);
        let status = if is_installed { "installed" } else { "not installed" };
        println!("\n  {} ({}, {})", info.identifier, info.approximate_size, status);
        println!("    {}", info.description);
        println!("    Strengths: {}", info.strengths.join(", "));
        if !is_installed {
            println!("    Install: {}", info.install_hint());
        }
    }

    let others: Vec<&String> = installed
        .iter()
        .filter(|name| catalog::lookup(name).is_none())
        .collect();
    if !others.is_empty() {
        println!("\nOther installed models:");
        for name in others {
            let tag = if is_coding_model(name) { " (coding)" } else { "" };
            println!("  {}{}", name, tag);
        }
    }

    if reachable {
        match pick_best_model(catalog::all(), &installed) {
            Some(best) => println!("\nBest available model: {}", best),
            None => println!("\nNo models installed. Install one with a command above."),
        }
    }

    Ok(())
}

pub fn cmd_config_show(config: &Config, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: unavailable (using defaults)"),
    }
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

pub fn cmd_config_set_model(mut config: Config, path: &Path, model: String) -> Result<()> {
    if model.trim().is_empty() {
        anyhow::bail!("Model name cannot be empty");
    }
    config.default_model = model;
    config.save(path)?;
    println!("Default model set to {}", config.default_model);
    Ok(())
}

pub fn cmd_config_set_max_tokens(mut config: Config, path: &Path, max_tokens: u32) -> Result<()> {
    config.max_tokens = max_tokens;
    config.save(path)?;
    println!("Default max tokens set to {}", max_tokens);
    Ok(())
}

pub fn cmd_config_set_output(mut config: Config, path: &Path, output: String) -> Result<()> {
    if output.trim().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }
    config.default_output = output;
    config.save(path)?;
    println!("Default output set to {}", config.default_output);
    Ok(())
}

pub fn cmd_config_add_template(mut config: Config, path: &Path, name: String, text: String) -> Result<()> {
    config.add_template(&name, &text);
    config.save(path)?;
    println!("Template '{}' saved", name);
    Ok(())
}

pub fn cmd_config_templates(config: &Config) -> Result<()> {
    for (name, text) in &config.templates {
        println!("{}: {}", name, text);
    }
    Ok(())
}
