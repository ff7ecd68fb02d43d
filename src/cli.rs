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

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::backend::BackendKind;

#[derive(Parser)]
#[command(name = "ctxsynth")]
#[command(about = "Generate claude.md context files for coding tasks using a remote or local LLM")]
#[command(version)]
pub struct Cli {
    /// Path to config file (defaults to ctxsynth/config.json in the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Append a timestamped session log to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum BackendChoice {
    /// Locally running model server
    Local,
    /// Hosted Anthropic API (needs ANTHROPIC_API_KEY)
    Remote,
}

impl From<BackendChoice> for BackendKind {
    fn from(choice: BackendChoice) -> Self {
        match choice {
            BackendChoice::Local => BackendKind::Local,
            BackendChoice::Remote => BackendKind::Remote,
        }
    }
}

/// Backend selection shared by the generating commands
#[derive(Args, Clone, Debug)]
pub struct BackendArgs {
    /// Which backend generates the context
    #[arg(long, value_enum, default_value_t = BackendChoice::Local)]
    pub backend: BackendChoice,

    /// Model name. The local backend picks the best installed model when omitted
    #[arg(long)]
    pub model: Option<String>,

    /// Maximum tokens to generate [default: saved max_tokens, else 4000]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_tokens: Option<u32>,

    /// Local model server API URL (e.g., http://localhost:11434/api)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Let the model reason before writing the context; only the context is kept
    #[arg(long)]
    pub reasoning: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a context file for a single task
    Generate {
        /// Description of the coding task
        #[arg(short, long)]
        task: String,

        /// File with code examples to include
        #[arg(short, long)]
        examples: Option<PathBuf>,

        /// File with project guidelines to include
        #[arg(short, long)]
        guidelines: Option<PathBuf>,

        /// Named guideline template to use when no guidelines file is given
        #[arg(long)]
        template: Option<String>,

        /// Output file [default: saved default_output, else claude.md]
        #[arg(short, long)]
        output: Option<String>,

        /// Print the beginning of the generated context
        #[arg(short, long)]
        preview: bool,

        #[command(flatten)]
        backend: BackendArgs,
    },

    /// Generate context files for tasks entered one after another
    Interactive {
        #[command(flatten)]
        backend: BackendArgs,
    },

    /// Show recommended local models and which are installed
    ListModels {
        /// Local model server API URL
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Inspect or change the saved configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Set the default remote model
    SetModel {
        model: String,
    },

    /// Set the default maximum tokens
    SetMaxTokens {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        max_tokens: u32,
    },

    /// Set the default output file for `generate`
    SetOutput {
        path: String,
    },

    /// Add or replace a guideline template
    AddTemplate {
        name: String,
        text: String,
    },

    /// List guideline templates
    Templates,
}
