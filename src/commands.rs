//! Command file generation.
//!
//! Renders one markdown command file per preset from the built-in template.
//! The `generic` preset becomes `loop.md`; every other preset `<key>.md`.
//!
//! # Example
//!
//! ```rust,ignore
//! use claude_loop::commands::CommandBuilder;
//! use claude_loop::presets::PresetTable;
//!
//! let presets = PresetTable::load(None);
//! let written = CommandBuilder::new(&presets).build("commands")?;
//! println!("Generated {} command files", written.len());
//! ```

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{LoopError, Result};
use crate::presets::{Preset, PresetTable, GENERIC_PRESET};
use crate::state::DEFAULT_MODE;

const BUILTIN_TEMPLATE: &str = include_str!("../assets/template.md");

const BASE_INSTRUCTIONS: &str = "Execute the task from the prompt:
- When you complete something, look for the next thing to do
- Document findings and progress in the state file
- If the initial task is done, explore related improvements";

const SUGGESTIONS_PARAM: &str = "- **--suggestions <preset>**: Override suggestion preset";

const TASK_MODE_FIELDS: &str = "task_started_at: 1
issues_found: 0
issues_fixed: 0";

const BACKLOG_INIT: &str = "(Tasks discovered but not yet addressed)";

/// File name for a preset's command.
#[must_use]
pub fn command_filename(preset_key: &str) -> String {
    if preset_key == GENERIC_PRESET {
        "loop.md".to_string()
    } else {
        format!("{preset_key}.md")
    }
}

/// Human-readable preset name: `code-quality` → `Code Quality`.
#[must_use]
pub fn display_name(preset_key: &str) -> String {
    preset_key
        .replace('-', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Base instructions followed by the preset's guidance bullets.
#[must_use]
pub fn work_instructions(preset_key: &str, preset: &Preset) -> String {
    if preset.guidance.is_empty() {
        return BASE_INSTRUCTIONS.to_string();
    }

    let bullets: Vec<String> = preset.guidance.iter().map(|g| format!("- {g}")).collect();
    format!(
        "{BASE_INSTRUCTIONS}\n\n**{} guidance:**\n{}",
        display_name(preset_key),
        bullets.join("\n")
    )
}

/// Renders command files from a preset table.
#[derive(Debug, Clone)]
pub struct CommandBuilder<'a> {
    presets: &'a PresetTable,
    template: String,
}

impl<'a> CommandBuilder<'a> {
    /// Builder using the built-in template.
    #[must_use]
    pub fn new(presets: &'a PresetTable) -> Self {
        Self {
            presets,
            template: BUILTIN_TEMPLATE.to_string(),
        }
    }

    /// Use a custom template.
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Render the command file for one preset.
    #[must_use]
    pub fn render(&self, preset_key: &str, preset: &Preset) -> String {
        let description = preset
            .description
            .clone()
            .unwrap_or_else(|| format!("{preset_key} loop"));
        let suggestions_param = if preset_key == GENERIC_PRESET {
            SUGGESTIONS_PARAM
        } else {
            ""
        };

        let replacements = [
            ("{{PRESET_KEY}}", preset_key.to_string()),
            ("{{PRESET_NAME}}", display_name(preset_key)),
            ("{{DESCRIPTION}}", description),
            ("{{MODE}}", DEFAULT_MODE.to_string()),
            ("{{SUGGESTIONS_PARAM}}", suggestions_param.to_string()),
            ("{{TASK_MODE_FIELDS}}", TASK_MODE_FIELDS.to_string()),
            ("{{BACKLOG_INIT}}", BACKLOG_INIT.to_string()),
            ("{{WORK_INSTRUCTIONS}}", work_instructions(preset_key, preset)),
        ];

        replacements
            .iter()
            .fold(self.template.clone(), |content, (placeholder, value)| {
                content.replace(placeholder, value)
            })
    }

    /// Write one command file per preset into `output_dir`.
    ///
    /// Creates the directory if needed and returns the written paths in
    /// preset key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or a file cannot
    /// be written.
    pub fn build<P: AsRef<Path>>(&self, output_dir: P) -> Result<Vec<PathBuf>> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)?;

        let mut written = Vec::with_capacity(self.presets.len());
        for (key, preset) in self.presets.iter() {
            let path = output_dir.join(command_filename(key));
            std::fs::write(&path, self.render(key, preset)).map_err(|e| {
                LoopError::CommandWrite {
                    path: path.clone(),
                    message: e.to_string(),
                }
            })?;
            debug!("Generated {}", path.display());
            written.push(path);
        }

        Ok(written)
    }
}
