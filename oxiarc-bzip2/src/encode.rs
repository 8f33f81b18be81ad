//! Streaming BZIP2 encoder.
//!
//! The encoder's only resumable state is "how much of the current block's
//! buffer is filled and how much compressed output is still waiting to be
//! drained"; RLE1 already tolerates arbitrary chunk boundaries
//! (`Rle1Encoder`), and block compression itself (BWT, MTF, Huffman table
//! selection, bit packing) is never split across a suspension point - it
//! only ever runs once a block's buffer is full or a flush/finish has been
//! requested with no more input available.

use oxiarc_core::traits::{CompressStatus, Compressor, FlushMode};

use crate::bitstream::BitWriter;
use crate::config::CompressionLevel;
use crate::crc::{self, Crc32};
use crate::error::{Action, BzError, Result};
use crate::huffman;
use crate::rle::{self, Rle1Encoder};
use crate::selector;
use crate::{BLOCK_MAGIC, BZIP2_MAGIC, EOS_MAGIC};
use crate::{bwt, mtf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    Running,
    Finishing,
    Done,
}

/// Per-block data prepared ahead of the bit-level write.
struct PreparedBlock {
    crc: u32,
    orig_ptr: u32,
    used: [bool; 256],
    #[allow(dead_code)]
    alpha_size: usize,
    symbols: Vec<u16>,
    tables: Vec<Vec<u8>>,
    codes: Vec<Vec<u32>>,
    selectors: Vec<u8>,
    selector_ranks: Vec<u8>,
}

/// Encode, via BWT + MTF + RLE2 + multi-table Huffman selection, a block
/// whose bytes have already been through RLE1 (`rle1_bytes`), given the
/// CRC of the original (pre-RLE1) bytes.
fn prepare_from_rle1(rle1_bytes: &[u8], block_crc: u32, work_factor: u8) -> PreparedBlock {
    let bwt_result = bwt::block_sort(rle1_bytes, work_factor);
    let last_col = bwt::last_column(rle1_bytes, &bwt_result.ptr);

    let mut used = [false; 256];
    for &b in &last_col {
        used[b as usize] = true;
    }
    let alphabet: Vec<u8> = (0u8..=255).filter(|&b| used[b as usize]).collect();
    let n_in_use = alphabet.len();

    let ranks = mtf::transform(&last_col, &alphabet);
    let mut symbols = rle::mtf_ranks_to_symbols(&ranks);
    symbols.push((n_in_use + 1) as u16);
    let alpha_size = n_in_use + 2;

    let selection = selector::select_groups(&symbols, alpha_size, 17);
    let codes = selection
        .tables
        .iter()
        .map(|lens| huffman::assign_codes(lens))
        .collect();
    let selector_ranks =
        selector::mtf_encode_selectors(&selection.selectors, selection.tables.len());

    PreparedBlock {
        crc: block_crc,
        orig_ptr: bwt_result.orig_ptr,
        used,
        alpha_size,
        symbols,
        tables: selection.tables,
        codes,
        selectors: selection.selectors,
        selector_ranks,
    }
}

/// Write a prepared block's wire-format fields (everything after the
/// per-stream header) into `writer`.
fn write_block(writer: &mut BitWriter, block: &PreparedBlock) {
    for &b in &BLOCK_MAGIC {
        writer.write_byte(b);
    }
    writer.write_u32(block.crc);
    writer.write_bit(0); // randomised: this encoder never sets it.
    writer.write_bits(24, block.orig_ptr);

    let mut in_use16 = 0u16;
    for i in 0..16 {
        if (0..16).any(|j| block.used[i * 16 + j]) {
            in_use16 |= 1 << (15 - i);
        }
    }
    writer.write_bits(16, u32::from(in_use16));
    for i in 0..16 {
        if (in_use16 >> (15 - i)) & 1 == 1 {
            let mut group_map = 0u16;
            for j in 0..16 {
                if block.used[i * 16 + j] {
                    group_map |= 1 << (15 - j);
                }
            }
            writer.write_bits(16, u32::from(group_map));
        }
    }

    writer.write_bits(3, block.tables.len() as u32);
    writer.write_bits(15, block.selector_ranks.len() as u32);
    for &rank in &block.selector_ranks {
        for _ in 0..rank {
            writer.write_bit(1);
        }
        writer.write_bit(0);
    }

    for lens in &block.tables {
        let mut cur = i32::from(lens[0]);
        writer.write_bits(5, cur as u32);
        for &len in lens {
            let target = i32::from(len);
            while cur < target {
                writer.write_bit(1);
                writer.write_bit(0);
                cur += 1;
            }
            while cur > target {
                writer.write_bit(1);
                writer.write_bit(1);
                cur -= 1;
            }
            writer.write_bit(0);
        }
    }

    for (g, chunk) in block.symbols.chunks(selector::GROUP_SIZE).enumerate() {
        let t = block.selectors[g] as usize;
        let lens = &block.tables[t];
        let codes = &block.codes[t];
        for &sym in chunk {
            let len = lens[sym as usize];
            let code = codes[sym as usize];
            writer.write_bits(u32::from(len), code);
        }
    }
}

fn copy_into(output: &mut &mut [u8], src: &[u8]) -> usize {
    let n = output.len().min(src.len());
    output[..n].copy_from_slice(&src[..n]);
    let taken = std::mem::take(output);
    let (_, rest) = taken.split_at_mut(n);
    *output = rest;
    n
}

/// A streaming BZIP2 encoder implementing the [`Compressor`] trait.
pub struct BzEncoder {
    level: CompressionLevel,
    mode: Mode,
    rle1: Rle1Encoder,
    block: Vec<u8>,
    block_max: usize,
    block_crc: Crc32,
    combined_crc: u32,
    writer: BitWriter,
    header_written: bool,
    stream_ended: bool,
    pending_out: Vec<u8>,
    out_pos: usize,
}

impl BzEncoder {
    /// Create a new encoder at the given compression level.
    pub fn new(level: CompressionLevel) -> Self {
        let block_max = level.block_size().saturating_sub(19);
        Self {
            level,
            mode: Mode::Idle,
            rle1: Rle1Encoder::new(),
            block: Vec::new(),
            block_max,
            block_crc: Crc32::new(),
            combined_crc: 0,
            writer: BitWriter::new(),
            header_written: false,
            stream_ended: false,
            pending_out: Vec::new(),
            out_pos: 0,
        }
    }

    fn ensure_header(&mut self) {
        if !self.header_written {
            self.writer.write_byte(BZIP2_MAGIC[0]);
            self.writer.write_byte(BZIP2_MAGIC[1]);
            self.writer.write_byte(b'h');
            self.writer.write_byte(b'0' + self.level.level());
            self.header_written = true;
        }
    }

    fn emit_block(&mut self) {
        self.ensure_header();
        let rle1_bytes = std::mem::take(&mut self.block);
        let block_crc = self.block_crc.finalize();
        self.block_crc = Crc32::new();
        self.combined_crc = crc::combine(self.combined_crc, block_crc);

        let prepared = prepare_from_rle1(&rle1_bytes, block_crc, self.level.work_factor());
        write_block(&mut self.writer, &prepared);
        self.pending_out.extend(self.writer.take_bytes());
    }

    fn emit_eos(&mut self) {
        self.ensure_header();
        for &b in &EOS_MAGIC {
            self.writer.write_byte(b);
        }
        self.writer.write_u32(self.combined_crc);
        self.pending_out.extend(self.writer.pad_and_take());
        self.stream_ended = true;
    }

    /// Advance the encoder with `action`, consuming from `input` and writing
    /// to `output`, both of which shrink to reflect progress.
    pub fn compress_chunk(
        &mut self,
        input: &mut &[u8],
        output: &mut &mut [u8],
        action: Action,
    ) -> Result<CompressStatus> {
        if self.mode == Mode::Done {
            return Err(BzError::sequence("compress called after stream end"));
        }
        if self.mode == Mode::Finishing && action != Action::Finish {
            return Err(BzError::sequence(
                "only Finish is accepted once finishing has begun",
            ));
        }
        if self.mode == Mode::Idle {
            self.mode = Mode::Running;
        }
        let flush_requested = action == Action::Flush;
        if action == Action::Finish {
            self.mode = Mode::Finishing;
        }

        loop {
            if self.out_pos < self.pending_out.len() {
                let n = copy_into(output, &self.pending_out[self.out_pos..]);
                self.out_pos += n;
                if self.out_pos == self.pending_out.len() {
                    self.pending_out.clear();
                    self.out_pos = 0;
                    if self.stream_ended {
                        self.mode = Mode::Done;
                        return Ok(CompressStatus::Done);
                    }
                } else {
                    return Ok(CompressStatus::NeedsOutput);
                }
                continue;
            }

            while !input.is_empty() && self.block.len() < self.block_max {
                let byte = input[0];
                *input = &input[1..];
                self.rle1.push(byte, &mut self.block, &mut self.block_crc);
            }

            if self.block.len() >= self.block_max {
                self.emit_block();
                continue;
            }

            if !input.is_empty() {
                continue;
            }

            match self.mode {
                Mode::Finishing => {
                    self.rle1.flush(&mut self.block);
                    if !self.block.is_empty() {
                        self.emit_block();
                    }
                    self.emit_eos();
                    continue;
                }
                Mode::Running if flush_requested => {
                    self.rle1.flush(&mut self.block);
                    if !self.block.is_empty() {
                        self.emit_block();
                        continue;
                    }
                    return Ok(CompressStatus::NeedsInput);
                }
                _ => return Ok(CompressStatus::NeedsInput),
            }
        }
    }

    /// True once the stream trailer has been fully emitted.
    pub fn is_finished(&self) -> bool {
        self.mode == Mode::Done
    }
}

impl Compressor for BzEncoder {
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> oxiarc_core::error::Result<(usize, usize, CompressStatus)> {
        let action = match flush {
            FlushMode::None => Action::Run,
            FlushMode::Sync | FlushMode::Full => Action::Flush,
            FlushMode::Finish => Action::Finish,
        };
        let mut in_cursor = input;
        let mut out_cursor = output;
        let out_len = out_cursor.len();
        let status = self
            .compress_chunk(&mut in_cursor, &mut out_cursor, action)
            .map_err(oxiarc_core::error::OxiArcError::from)?;
        let consumed = input.len() - in_cursor.len();
        let produced = out_len - out_cursor.len();
        Ok((consumed, produced, status))
    }

    fn reset(&mut self) {
        *self = BzEncoder::new(self.level);
    }

    fn is_finished(&self) -> bool {
        BzEncoder::is_finished(self)
    }
}

/// Compress `data` in one call at the given level.
pub fn compress(data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    let mut encoder = BzEncoder::new(level);
    let mut input = data;
    let mut out = Vec::new();
    let mut buf = vec![0u8; 65536];

    loop {
        let mut cursor: &mut [u8] = &mut buf;
        let status = encoder.compress_chunk(&mut input, &mut cursor, Action::Finish)?;
        let produced = buf.len() - cursor.len();
        out.extend_from_slice(&buf[..produced]);
        if status == CompressStatus::Done {
            break;
        }
    }
    Ok(out)
}
