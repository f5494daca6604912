//! Loop presets.
//!
//! A preset is a named bundle of suggestion lists for one flavor of loop
//! (UI polish, documentation, review, ...). The binary ships a built-in
//! table; an optional user file replaces built-in entries key by key.
//!
//! # Example
//!
//! ```
//! use claude_loop::presets::PresetTable;
//!
//! let table = PresetTable::builtin();
//! assert!(table.contains("generic"));
//! assert!(!table.get("ui").unwrap().exploitation.is_empty());
//! ```

pub mod rotation;

pub use rotation::{select, SuggestionResult, SuggestionRotator, BUILTIN_SUGGESTIONS};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::Result;

/// Key of the catch-all preset.
pub const GENERIC_PRESET: &str = "generic";

const BUILTIN_PRESETS: &str = include_str!("../../assets/presets.toml");

/// One named suggestion bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub description: Option<String>,
    /// General ideas for what to look at next.
    pub suggestions: Vec<String>,
    /// Rotating "keep going" prompts, preferred over `suggestions`.
    pub exploitation: Vec<String>,
    /// Preset-specific work-instruction bullets for generated commands.
    pub guidance: Vec<String>,
}

impl Preset {
    /// List used for rotation: `exploitation`, else `suggestions`, else none.
    #[must_use]
    pub fn rotation_list(&self) -> Option<&[String]> {
        if !self.exploitation.is_empty() {
            Some(&self.exploitation)
        } else if !self.suggestions.is_empty() {
            Some(&self.suggestions)
        } else {
            None
        }
    }
}

/// Presets by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetTable {
    presets: BTreeMap<String, Preset>,
}

impl PresetTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The table shipped with the binary.
    #[must_use]
    pub fn builtin() -> Self {
        match Self::from_toml_str(BUILTIN_PRESETS) {
            Ok(table) => table,
            Err(e) => {
                warn!("Built-in presets failed to parse: {}", e);
                Self::new()
            }
        }
    }

    /// Parse a preset table from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or a preset has the
    /// wrong shape.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let presets: BTreeMap<String, Preset> = toml::from_str(content)?;
        Ok(Self { presets })
    }

    /// Parse a preset file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Built-in presets overlaid with the user file at `user_path`.
    ///
    /// A missing user file is normal. An unreadable or malformed one is
    /// logged and ignored.
    #[must_use]
    pub fn load(user_path: Option<&Path>) -> Self {
        let mut table = Self::builtin();

        let Some(path) = user_path else {
            return table;
        };
        if !path.exists() {
            debug!("No user presets at {}", path.display());
            return table;
        }

        match Self::from_file(path) {
            Ok(user) => {
                debug!(
                    "Loaded {} user presets from {}",
                    user.len(),
                    path.display()
                );
                table.merge(user);
            }
            Err(e) => warn!("Ignoring user presets at {}: {}", path.display(), e),
        }

        table
    }

    /// Overlay `other`; its entries replace same-named entries wholesale.
    pub fn merge(&mut self, other: PresetTable) {
        self.presets.extend(other.presets);
    }

    /// Insert or replace one preset.
    pub fn insert(&mut self, key: impl Into<String>, preset: Preset) {
        self.presets.insert(key.into(), preset);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Preset> {
        self.presets.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.presets.contains_key(key)
    }

    /// Presets in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Preset)> {
        self.presets.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
