//! Packed chunk-index rows shared by the world map and the dungeons.
//!
//! Every row stores its chunk indices as 12-bit values, two per 3-byte
//! group, with the nibbles permuted:
//!
//! ```text
//!   bytes   a        b               c
//!           lo(i1)   hi(i2)|hi(i1)   mid/top(i2)
//!
//!   i1 = 256 * (b & 0x0f) + a
//!   i2 =  16 * c + (b >> 4)
//! ```

use crate::error::Result;
use crate::model::ChunkIndex;
use crate::processor::cursor::ByteCursor;

/// Bytes taken by one packed pair.
pub const GROUP_LEN: usize = 3;

/// Bytes needed for a packed row of `width` indices.
pub const fn row_len(width: usize) -> usize {
    width / 2 * GROUP_LEN
}

/// Unpack one 3-byte group into `[i1, i2]`.
#[inline]
pub fn decode_pair([a, b, c]: [u8; 3]) -> [ChunkIndex; 2] {
    let a = ChunkIndex::from(a);
    let b = ChunkIndex::from(b);
    let c = ChunkIndex::from(c);
    [256 * (b % 16) + a, 16 * c + b / 16]
}

/// Inverse of [`decode_pair`]. Only the low 12 bits of each index are kept.
#[inline]
pub fn encode_pair(i1: ChunkIndex, i2: ChunkIndex) -> [u8; 3] {
    [
        (i1 & 0xff) as u8,
        (((i1 >> 8) & 0x0f) | ((i2 & 0x0f) << 4)) as u8,
        ((i2 >> 4) & 0xff) as u8,
    ]
}

/// Decode one packed row of `width` chunk indices. `width` must be even.
pub fn read_row(cursor: &mut ByteCursor<'_>, width: usize) -> Result<Vec<ChunkIndex>> {
    debug_assert!(width % 2 == 0, "packed rows hold index pairs");
    // read the whole row first so a short row fails before anything is decoded
    let bytes = cursor.read_bytes(row_len(width))?;

    let mut row = Vec::with_capacity(width);
    for group in bytes.chunks_exact(GROUP_LEN) {
        row.extend(decode_pair([group[0], group[1], group[2]]));
    }
    Ok(row)
}

/// Decode `height` consecutive packed rows of `width` indices.
pub fn read_rows(
    cursor: &mut ByteCursor<'_>,
    width: usize,
    height: usize,
) -> Result<Vec<Vec<ChunkIndex>>> {
    (0..height).map(|_| read_row(cursor, width)).collect()
}
