use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::processor::object_parser::OBJLIST_OFFSET;

/// Decoder settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeConfig {
    /// Byte offset of the coordinate table inside `objlist`.
    pub objlist_offset: usize,
    /// Draw animated tiles with their first animation frame.
    pub apply_animation: bool,
    /// Decode region blocks on the rayon pool.
    pub parallel: bool,
    /// Directory holding `objblk??` and `objlist`, relative to the game dir.
    pub savegame_dir: String,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            objlist_offset: OBJLIST_OFFSET,
            apply_animation: true,
            parallel: true,
            savegame_dir: "savegame".to_string(),
        }
    }
}

impl DecodeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).with_context(|| "Parsing decoder config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Reading {}", path.display()))?;
        Self::from_json(&json)
    }
}
