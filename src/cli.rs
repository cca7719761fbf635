use clap::Parser;
use std::path::PathBuf;

use crate::config::DecodeConfig;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Game directory holding `chunks`, `map`, `tileflag`, ...
    pub input: PathBuf,
    /// Output directory
    pub output: PathBuf,
    /// JSON decoder config
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Keep animated tiles as stored instead of their first frame
    #[arg(long)]
    pub no_animate: bool,
    /// Decode region blocks one after another
    #[arg(long)]
    pub sequential: bool,
    /// Offset of the coordinate table inside `objlist`
    #[arg(long, value_parser = parse_offset)]
    pub objlist_offset: Option<usize>,
}

impl Cli {
    /// Flags given on the command line win over the config file.
    pub fn apply(&self, mut config: DecodeConfig) -> DecodeConfig {
        if self.no_animate {
            config.apply_animation = false;
        }
        if self.sequential {
            config.parallel = false;
        }
        if let Some(offset) = self.objlist_offset {
            config.objlist_offset = offset;
        }
        config
    }
}

/// Accepts decimal or `0x`-prefixed hex.
fn parse_offset(s: &str) -> Result<usize, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid offset `{s}`: {e}"))
}
