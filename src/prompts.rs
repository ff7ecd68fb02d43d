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

pub const CONTEXT_ROLE_PREAMBLE: &str =
    "You are a coding assistant that generates comprehensive context files for Claude AI.";

pub const CONTEXT_PROMPT_TEMPLATE: &str = r#"Generate a detailed markdown context file that will help Claude understand this coding task. Include:

1. # Project Context
   - Brief overview of the task
   - Technical requirements

2. # Code Examples Analysis
   - Analysis of existing patterns
   - Naming conventions
   - Architecture notes

3. # Implementation Guidelines
   - Step-by-step approach
   - Best practices
   - Error handling

4. # Expected Output
   - What the final code should accomplish
   - Success criteria

Format this as clean, structured markdown that Claude can use as context for the coding task."#;

/// Line separating the reasoning from the final document in reasoning mode
pub const MARKDOWN_CONTEXT_MARKER: &str = "[[ ## markdown_context ## ]]";

pub const REASONING_PREAMBLE: &str = r#"Before writing the context file, reason step by step about what context would help most for this task: which conventions the code examples reveal, which components are relevant, and which constraints the guidelines impose.
Write that reasoning first. Then write the line
[[ ## markdown_context ## ]]
on its own, followed only by the final markdown document. Nothing after the marker except the document."#;

pub fn compose_prompt(
    task_description: &str,
    code_examples: &str,
    project_guidelines: &str,
    reasoning: bool,
) -> String {
    let mut prompt = String::new();

    if reasoning {
        prompt.push_str(REASONING_PREAMBLE);
        prompt.push_str("\n\n");
    }

    prompt.push_str(CONTEXT_ROLE_PREAMBLE);
    prompt.push_str(&format!(
        "\n\nTask Description: {}\n\nCode Examples: {}\n\nProject Guidelines: {}\n\n",
        task_description, code_examples, project_guidelines
    ));
    prompt.push_str(CONTEXT_PROMPT_TEMPLATE);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_appear_in_fixed_order() {
        let prompt = compose_prompt("Add JWT auth", "fn login() {}", "Use Result everywhere", false);

        let task = prompt.find("Task Description: Add JWT auth").unwrap();
        let examples = prompt.find("Code Examples: fn login() {}").unwrap();
        let guidelines = prompt.find("Project Guidelines: Use Result everywhere").unwrap();
        let template = prompt.find("1. # Project Context").unwrap();

        assert!(task < examples);
        assert!(examples < guidelines);
        assert!(guidelines < template);
        for section in ["# Code Examples Analysis", "# Implementation Guidelines", "# Expected Output"] {
            assert!(prompt.contains(section), "missing {}", section);
        }
        assert!(!prompt.contains(MARKDOWN_CONTEXT_MARKER));
    }

    #[test]
    fn test_empty_inputs_are_kept_verbatim() {
        let prompt = compose_prompt("Add auth", "", "", false);
        assert!(prompt.contains("Code Examples: \n\nProject Guidelines: \n\n"));
    }

    #[test]
    fn test_reasoning_preamble_comes_first() {
        let prompt = compose_prompt("Add auth", "", "", true);
        assert!(prompt.starts_with(REASONING_PREAMBLE));
        assert!(prompt.find(MARKDOWN_CONTEXT_MARKER).unwrap() < prompt.find("Task Description").unwrap());
    }
}
