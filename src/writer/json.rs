//! Dump the decoded world as one JSON document.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::model::{ChunkIndex, DecodedWorld, Grid, ObjectStack, TileId};
use crate::processor::chunk_parser::Chunk;

#[derive(Serialize)]
struct WorldJson<'a> {
    map: Vec<&'a [ChunkIndex]>,
    dungeons: Vec<Vec<&'a [ChunkIndex]>>,
    chunks: Vec<&'a Chunk>,
    objects: ObjectsJson,
}

#[derive(Serialize)]
struct ObjectsJson {
    world: Vec<CellJson>,
    dungeons: Vec<Vec<CellJson>>,
}

#[derive(Serialize, Debug, PartialEq)]
struct CellJson {
    x: u16,
    y: u16,
    /// Front (drawn on top) first.
    tiles: Vec<TileId>,
}

fn grid_rows(grid: &Grid) -> Vec<&[ChunkIndex]> {
    grid.rows().collect()
}

fn cells(stack: &ObjectStack) -> Vec<CellJson> {
    stack
        .iter()
        .map(|(at, tiles)| CellJson {
            x: at.x(),
            y: at.y(),
            tiles: tiles.iter().copied().collect(),
        })
        .collect()
}

pub fn to_writer<W: Write>(world: &DecodedWorld, out: W) -> io::Result<()> {
    let doc = WorldJson {
        map: grid_rows(&world.world),
        dungeons: world.dungeons.iter().map(grid_rows).collect(),
        chunks: world.chunks.iter().collect(),
        objects: ObjectsJson {
            world: cells(world.objects.world()),
            dungeons: world.objects.levels()[1..].iter().map(cells).collect(),
        },
    };
    serde_json::to_writer(out, &doc).map_err(io::Error::other)
}

pub fn emit(world: &DecodedWorld, out_dir: &Path) -> io::Result<()> {
    let path = out_dir.join("world.json");
    let mut out = BufWriter::new(File::create(&path)?);
    to_writer(world, &mut out)?;
    out.flush()?;
    log::info!("Wrote {}", path.display());
    Ok(())
}
