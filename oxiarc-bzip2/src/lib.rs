//! BZip2 compression/decompression for OxiArc.
//!
//! This crate provides a pure Rust implementation of the BZIP2 format: a
//! pipeline of RLE1, a Burrows-Wheeler block sort, Move-to-Front, RLE2 and
//! multi-table Huffman coding, wrapped in a resumable streaming encoder and
//! decoder.
//!
//! BZip2 uses a pipeline of transformations:
//! 1. Run-Length Encoding (RLE1) - collapse runs of 4+ identical bytes
//! 2. Burrows-Wheeler Transform (BWT) - block sorting for better compression
//! 3. Move-to-Front Transform (MTF) - locality transformation
//! 4. Zero-Run Length Encoding (RLE2) - special encoding for MTF zero ranks
//! 5. Huffman Coding - final entropy coding, across 2-6 rotating tables

#![warn(missing_docs)]
#![warn(clippy::all)]

mod bitstream;
/// Burrows-Wheeler Transform implementation.
pub mod bwt;
pub mod config;
mod crc;
mod decode;
mod encode;
pub mod error;
mod huffman;
mod mtf;
mod rand;
mod rle;
mod selector;

pub use config::{CompressionLevel, DecompressConfig};
pub use decode::{BzDecoder, decompress};
pub use encode::{BzEncoder, compress};
pub use error::{Action, BzError, Result, ResultCode};

/// BZip2 magic bytes ("BZ").
pub const BZIP2_MAGIC: [u8; 2] = [0x42, 0x5A];

/// Block header magic bytes (0x314159265359).
pub const BLOCK_MAGIC: [u8; 6] = [0x31, 0x41, 0x59, 0x26, 0x53, 0x59];

/// End of stream magic bytes (0x177245385090).
pub const EOS_MAGIC: [u8; 6] = [0x17, 0x72, 0x45, 0x38, 0x50, 0x90];

/// Maximum block size (900k).
pub const MAX_BLOCK_SIZE: usize = 900_000;
