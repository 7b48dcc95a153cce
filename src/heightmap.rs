use crate::error::EngineError;
use crate::vector::GridPos;

/// A read-only square grid of terrain heights, padded by one extra row and column so every
/// `(map_size x map_size)` patch grid has a well-defined corner sample at its far edge.
#[derive(Debug, Clone)]
pub struct Heightmap {
    side: u32,
    samples: Vec<u8>,
}

impl Heightmap {
    /// Loads `map_size x map_size` raw 8-bit grayscale samples from `path` and pads one extra
    /// row/column by clamping to the nearest real edge sample.
    pub fn load(path: impl AsRef<std::path::Path>, map_size: u32) -> Result<Self, EngineError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, map_size)
    }

    /// Builds a heightmap from raw, row-major `map_size x map_size` bytes already in memory.
    /// Used by hosts that load the file themselves and by tests that synthesize terrain.
    pub fn from_bytes(bytes: &[u8], map_size: u32) -> Result<Self, EngineError> {
        let expected = (map_size as usize) * (map_size as usize);
        if bytes.len() < expected {
            return Err(EngineError::HeightmapLoadFailed(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!(
                    "expected at least {expected} bytes for a {map_size}x{map_size} heightmap, got {}",
                    bytes.len()
                ),
            )));
        }

        let side = map_size + 1;
        let mut samples = vec![0u8; (side as usize) * (side as usize)];
        for y in 0..map_size {
            for x in 0..map_size {
                samples[(y * side + x) as usize] = bytes[(y * map_size + x) as usize];
            }
        }
        // Pad the extra row/column by clamping to the last real row/column.
        for y in 0..map_size {
            let edge = samples[(y * side + (map_size - 1)) as usize];
            samples[(y * side + map_size) as usize] = edge;
        }
        for x in 0..=map_size {
            let src_y = map_size - 1;
            let edge = samples[(src_y * side + x.min(map_size - 1)) as usize];
            samples[(map_size * side + x) as usize] = edge;
        }
        Ok(Self { side, samples })
    }

    /// A heightmap of uniform height, useful for flat-terrain tests.
    pub fn flat(map_size: u32, height: u8) -> Self {
        let side = map_size + 1;
        Self {
            side,
            samples: vec![height; (side as usize) * (side as usize)],
        }
    }

    /// Height at a grid position. Positions are expected to be within `[0, map_size]` inclusive
    /// (the padded edge); out-of-range reads are clamped rather than panicking, since ROAM's
    /// corner arithmetic can legitimately probe the padded edge.
    pub fn sample(&self, pos: GridPos) -> u8 {
        let x = pos.x.min(self.side - 1);
        let y = pos.y.min(self.side - 1);
        self.samples[(y * self.side + x) as usize]
    }

    /// Side length of the unpadded map (`map_size`).
    pub fn map_size(&self) -> u32 {
        self.side - 1
    }
}
