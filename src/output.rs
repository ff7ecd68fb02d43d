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
use chrono::{DateTime, Local};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::constants::{INTERACTIVE_OUTPUT_PREFIX, PREVIEW_CHARS};
use crate::logger::{log_warning, Logger};

/// Read an optional input file. Unreadable files degrade to empty content
/// with a warning.
pub fn read_optional_input(path: Option<&Path>, label: &str, logger: &mut Option<Logger>) -> String {
    let Some(path) = path else {
        return String::new();
    };

    match fs::read_to_string(path) {
        Ok(content) => {
            if content.trim().is_empty() {
                log_warning(logger, &format!("No {} loaded: {} is empty", label, path.display()));
            }
            content
        }
        Err(e) => {
            log_warning(
                logger,
                &format!("No {} loaded: cannot read {}: {}", label, path.display(), e),
            );
            String::new()
        }
    }
}

/// Write `content` to `path` through a temp file in the same directory, so
/// the target is either absent or complete.
pub fn write_context(path: &Path, content: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;

    let mut temp = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
    temp.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    temp.persist(path)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;

    Ok(())
}

pub fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// File name for the `sequence`-th task of an interactive session
pub fn interactive_output_path(started: &DateTime<Local>, sequence: usize) -> PathBuf {
    PathBuf::from(format!(
        "{}-{}-{}.md",
        INTERACTIVE_OUTPUT_PREFIX,
        started.format("%Y%m%d-%H%M%S"),
        sequence
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_written_context_reads_back_identically() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("claude.md");
        let content = "# Project Context\n\nUnicode: héllo ✓\r\nTrailing spaces   \n";

        write_context(&path, content).unwrap();
        assert_eq!(fs::read(&path).unwrap(), content.as_bytes());

        write_context(&path, "# Replaced\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Replaced\n");

        let leftovers: Vec<_> = fs::read_dir(dir.path().join("nested")).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_missing_optional_input_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut logger = None;

        let missing = dir.path().join("nope.py");
        assert_eq!(read_optional_input(Some(&missing), "code examples", &mut logger), "");
        assert_eq!(read_optional_input(None, "code examples", &mut logger), "");

        let present = dir.path().join("auth.py");
        fs::write(&present, "def login(): ...\n").unwrap();
        assert_eq!(
            read_optional_input(Some(&present), "code examples", &mut logger),
            "def login(): ...\n"
        );
    }

    #[test]
    fn test_preview_truncates_long_content() {
        let short = "# Short";
        assert_eq!(preview(short), short);

        let long = "é".repeat(PREVIEW_CHARS + 10);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), PREVIEW_CHARS + 3);

        let exact = "x".repeat(PREVIEW_CHARS);
        assert_eq!(preview(&exact), exact);
    }

    #[test]
    fn test_interactive_names_are_timestamped_and_sequenced() {
        let started = Local.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            interactive_output_path(&started, 1),
            PathBuf::from("claude-context-20250309-140507-1.md")
        );
        assert_ne!(
            interactive_output_path(&started, 1),
            interactive_output_path(&started, 2)
        );
    }
}
