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
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Append-only session log; every line is timestamped and flushed
pub struct Logger {
    writer: BufWriter<std::fs::File>,
}

impl Logger {
    pub fn new(log_path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

        Ok(Self {
            writer: BufWriter::with_capacity(8192, file),
        })
    }

    /// Open the log if a path is configured; a failure is reported and logging is skipped
    pub fn open_optional(log_path: Option<&Path>) -> Option<Self> {
        let path = log_path?;
        match Self::new(path) {
            Ok(log) => Some(log),
            Err(e) => {
                eprintln!("Warning: {:#}", e);
                eprintln!("Continuing without logging to file.");
                None
            }
        }
    }

    pub fn logln(&mut self, message: &str) -> Result<()> {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(self.writer, "[{}] {}", timestamp, message)?;
        self.writer.flush()?;
        Ok(())
    }
}

pub fn log_message(logger: &mut Option<Logger>, message: &str) {
    println!("{}", message);
    if let Some(log) = logger.as_mut() {
        let _ = log.logln(message);
    }
}

pub fn log_warning(logger: &mut Option<Logger>, message: &str) {
    eprintln!("Warning: {}", message);
    if let Some(log) = logger.as_mut() {
        let _ = log.logln(&format!("WARNING: {}", message));
    }
}

pub fn log_error(logger: &mut Option<Logger>, message: &str) {
    eprintln!("Error: {}", message);
    if let Some(log) = logger.as_mut() {
        let _ = log.logln(&format!("ERROR: {}", message));
    }
}
