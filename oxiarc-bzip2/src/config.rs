//! Compression/decompression configuration types.

/// Compression level (1-9), selecting the block size (`level * 100_000`
/// bytes) and carrying the BWT sorter's work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLevel {
    level: u8,
    work_factor: u8,
}

impl CompressionLevel {
    /// Create a new compression level (clamped to `1..=9`) with the default
    /// work factor (`30`).
    pub fn new(level: u8) -> Self {
        Self {
            level: level.clamp(1, 9),
            work_factor: 30,
        }
    }

    /// Set the BWT sorter's work factor (clamped to `1..=250`); higher
    /// values let the main sort try harder before falling back. `0` means
    /// "use the default" (`30`), per spec, rather than clamping to `1`.
    pub fn with_work_factor(mut self, work_factor: u8) -> Self {
        self.work_factor = if work_factor == 0 {
            30
        } else {
            work_factor.clamp(1, 250)
        };
        self
    }

    /// Block size in bytes for this level.
    pub fn block_size(&self) -> usize {
        self.level as usize * 100_000
    }

    /// The level value, `1..=9`.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// The BWT sorter work factor.
    pub fn work_factor(&self) -> u8 {
        self.work_factor
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::new(9)
    }
}

/// Decoder-side configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecompressConfig {
    /// Use the reduced-memory ("small") decode path instead of the fast
    /// path. Both produce identical output; `small` only trades decode
    /// speed for peak memory.
    pub small: bool,
}

impl DecompressConfig {
    /// Config for the fast (default) decode path.
    pub fn fast() -> Self {
        Self { small: false }
    }

    /// Config for the reduced-memory decode path.
    pub fn small() -> Self {
        Self { small: true }
    }
}
