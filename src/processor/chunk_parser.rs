//! Parser for the `chunks` file: 1024 blocks of 8×8 one-byte tile ids.

use crate::error::Result;
use crate::model::{CHUNK_COUNT, CHUNK_DIM, Resource};
use crate::processor::cursor::ByteCursor;

/// `chunk[row][col]` is a terrain tile id.
pub type Chunk = [[u8; CHUNK_DIM]; CHUNK_DIM];

/// Bytes taken by one chunk on disk.
pub const CHUNK_BYTES: usize = CHUNK_DIM * CHUNK_DIM;

/// The 1024 reusable terrain blocks; index = position in the file.
#[derive(Debug, Clone)]
pub struct ChunkTable {
    chunks: Vec<Chunk>,
}

impl ChunkTable {
    pub fn parse(resource: &Resource) -> Result<Self> {
        Self::from_bytes(&resource.name, &resource.bytes)
    }

    /// Decode exactly 1024 chunks; trailing bytes are ignored.
    pub fn from_bytes(name: &str, data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(name, data);
        cursor.section("chunk");

        let mut chunks = Vec::with_capacity(CHUNK_COUNT);
        for _ in 0..CHUNK_COUNT {
            let mut chunk = [[0u8; CHUNK_DIM]; CHUNK_DIM];
            for row in chunk.iter_mut() {
                *row = cursor.read_array()?;
            }
            chunks.push(chunk);
        }

        log::info!("{name}: decoded {} chunks", chunks.len());
        Ok(Self { chunks })
    }

    pub fn get(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    pub fn tile_at(&self, index: usize, row: usize, col: usize) -> Option<u8> {
        self.get(index)?.get(row)?.get(col).copied()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }
}
