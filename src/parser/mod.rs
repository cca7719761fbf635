use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::DecodeConfig;
use crate::error::{DecodeError, Result};
use crate::model::{DUNGEON_LEVELS, RawGameFiles, Resource, SUPERCHUNK_GRID};

pub const CHUNKS: &str = "chunks";
pub const MAP: &str = "map";
pub const TILEFLAG: &str = "tileflag";
pub const BASETILE: &str = "basetile";
pub const ANIMDATA: &str = "animdata";
pub const OBJLIST: &str = "objlist";

/// Region block of world superchunk (`col`, `row`), e.g. `objblkca`.
pub fn world_block_name(col: usize, row: usize) -> String {
    format!("objblk{}{}", letter(col), letter(row))
}

/// Region block of dungeon `level` (0-based), e.g. `objblkai`.
pub fn dungeon_block_name(level: usize) -> String {
    format!("objblk{}i", letter(level))
}

fn letter(n: usize) -> char {
    char::from(b'a' + n as u8)
}

/// Read every file the decoder needs from a game directory.
///
/// Names are matched case-insensitively, since the DOS release ships them
/// in upper case. Any missing file is fatal.
pub fn load(game_dir: &Path, config: &DecodeConfig) -> Result<RawGameFiles> {
    log::info!("Loading game files from {}", game_dir.display());

    let savegame = find_entry(game_dir, &config.savegame_dir)?;

    let mut world_blocks = Vec::with_capacity(SUPERCHUNK_GRID * SUPERCHUNK_GRID);
    for row in 0..SUPERCHUNK_GRID {
        for col in 0..SUPERCHUNK_GRID {
            world_blocks.push(read_resource(&savegame, &world_block_name(col, row))?);
        }
    }
    let dungeon_blocks = (0..DUNGEON_LEVELS)
        .map(|level| read_resource(&savegame, &dungeon_block_name(level)))
        .collect::<Result<Vec<_>>>()?;

    let raw = RawGameFiles {
        chunks: read_resource(game_dir, CHUNKS)?,
        map: read_resource(game_dir, MAP)?,
        tileflag: read_resource(game_dir, TILEFLAG)?,
        basetile: read_resource(game_dir, BASETILE)?,
        animdata: read_resource(game_dir, ANIMDATA)?,
        world_blocks,
        dungeon_blocks,
        objlist: read_resource(&savegame, OBJLIST)?,
    };
    log::info!(
        "Loaded {} region blocks, {} dungeon blocks",
        raw.world_blocks.len(),
        raw.dungeon_blocks.len()
    );
    Ok(raw)
}

pub fn read_resource(dir: &Path, name: &str) -> Result<Resource> {
    let path = find_entry(dir, name)?;
    let bytes = fs::read(&path).map_err(|source| io_error(&path, source))?;
    log::debug!("{}: {} bytes", path.display(), bytes.len());
    Ok(Resource::new(name, bytes))
}

/// Locate `name` inside `dir`, ignoring ASCII case.
pub fn find_entry(dir: &Path, name: &str) -> Result<PathBuf> {
    let direct = dir.join(name);
    if direct.exists() {
        return Ok(direct);
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(DecodeError::MissingResource { path: direct });
        }
        Err(e) => return Err(io_error(dir, e)),
    };
    for entry in entries {
        let entry = entry.map_err(|e| io_error(dir, e))?;
        if entry.file_name().to_string_lossy().eq_ignore_ascii_case(name) {
            return Ok(entry.path());
        }
    }
    Err(DecodeError::MissingResource { path: direct })
}

fn io_error(path: &Path, source: std::io::Error) -> DecodeError {
    if source.kind() == ErrorKind::NotFound {
        DecodeError::MissingResource {
            path: path.to_path_buf(),
        }
    } else {
        DecodeError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
