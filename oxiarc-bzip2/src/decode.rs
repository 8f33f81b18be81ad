//! Streaming, resumable BZIP2 decoder.
//!
//! Decoding is a bit-level parse, so the decoder has to be resumable at
//! essentially any bit boundary if it is handed input one byte at a time.
//! [`crate::bitstream::BitReader`] already absorbs "resume mid-field": every
//! fixed-width read either succeeds or fails having buffered whatever
//! partial bits it saw, so re-issuing the *same* read on the next call picks
//! up exactly where it left off. That leaves this module only needing to
//! track *which* field comes next (`Step`) plus the handful of scratch
//! values a partially-read field or partially-built table needs to carry
//! across a suspension.
//!
//! A block's plaintext is only ever exposed to the caller once it is fully
//! decoded and its CRC has been checked: the symbol stream is accumulated
//! into `mtf_symbols` and nothing is appended to `output` until EOB.

use oxiarc_core::traits::{DecompressStatus, Decompressor};

use crate::bitstream::BitReader;
use crate::config::DecompressConfig;
use crate::crc::{self, Crc32};
use crate::error::{BzError, Result};
use crate::huffman::{DecodeSuspend, DecodeTable};
use crate::rand::RandMask;
use crate::{bwt, mtf, rle, selector};
use crate::{BLOCK_MAGIC, BZIP2_MAGIC, EOS_MAGIC};

fn magic_to_u64(bytes: &[u8; 6]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    MagicB,
    MagicZ,
    MagicH,
    MagicLevel,
    BlockOrEosHi,
    BlockOrEosLo,
    EosCrc,
    StreamDone,

    BlockCrc,
    Randomised,
    OrigPtr,
    InUse16,
    InUseGroups,
    NGroups,
    NSelectors,
    Selectors,
    TableStartLen,
    TableDeltaSignal,
    TableDeltaDirection,
    SymbolFresh,
    SymbolExtend,
}

/// A streaming BZIP2 decoder implementing the [`Decompressor`] trait.
pub struct BzDecoder {
    config: DecompressConfig,
    bits: BitReader,
    step: Step,
    level: u8,
    combined_crc: u32,
    finished: bool,

    output: Vec<u8>,
    output_pos: usize,

    magic_hi: u32,

    block_crc_expected: u32,
    randomised: bool,
    orig_ptr: u32,
    in_use16: u16,
    in_use: [bool; 256],
    in_use_group_idx: usize,
    n_in_use: usize,
    alpha_size: usize,
    eob: u16,

    n_groups: usize,
    n_selectors: usize,
    selector_ranks: Vec<u8>,
    selector_unary_run: usize,
    selectors: Vec<u8>,

    tables_lens: Vec<Vec<u8>>,
    cur_table: usize,
    cur_sym: usize,
    cur_len: i32,

    decode_tables: Vec<DecodeTable>,
    cur_table_idx: usize,
    group_no: usize,
    group_pos: usize,
    zn: u32,
    zvec: i32,

    mtf_symbols: Vec<u16>,
}

enum Adv {
    Progress,
    NeedInput,
}

impl BzDecoder {
    /// Create a new decoder with the given configuration.
    pub fn new(config: DecompressConfig) -> Self {
        Self {
            config,
            bits: BitReader::new(),
            step: Step::MagicB,
            level: 0,
            combined_crc: 0,
            finished: false,
            output: Vec::new(),
            output_pos: 0,
            magic_hi: 0,
            block_crc_expected: 0,
            randomised: false,
            orig_ptr: 0,
            in_use16: 0,
            in_use: [false; 256],
            in_use_group_idx: 0,
            n_in_use: 0,
            alpha_size: 0,
            eob: 0,
            n_groups: 0,
            n_selectors: 0,
            selector_ranks: Vec::new(),
            selector_unary_run: 0,
            selectors: Vec::new(),
            tables_lens: Vec::new(),
            cur_table: 0,
            cur_sym: 0,
            cur_len: 0,
            decode_tables: Vec::new(),
            cur_table_idx: 0,
            group_no: 0,
            group_pos: 0,
            zn: 0,
            zvec: 0,
            mtf_symbols: Vec::new(),
        }
    }

    fn reset_block_scratch(&mut self) {
        self.in_use16 = 0;
        self.in_use = [false; 256];
        self.in_use_group_idx = 0;
        self.n_in_use = 0;
        self.alpha_size = 0;
        self.eob = 0;
        self.selector_ranks.clear();
        self.selector_unary_run = 0;
        self.selectors.clear();
        self.tables_lens.clear();
        self.decode_tables.clear();
        self.mtf_symbols.clear();
        self.randomised = false;
        self.cur_table = 0;
        self.group_no = 0;
        self.group_pos = 0;
    }

    fn finish_block(&mut self) -> Result<()> {
        let ranks = rle::symbols_to_mtf_ranks(&self.mtf_symbols);
        let block_max = self.level as usize * 100_000;
        if ranks.len() > block_max {
            return Err(BzError::data("block exceeds the maximum size for this level"));
        }
        let alphabet: Vec<u8> = (0u8..=255).filter(|&b| self.in_use[b as usize]).collect();
        let mut bwt_data = mtf::inverse_transform(&ranks, &alphabet);

        if self.randomised {
            let mut mask = RandMask::new();
            for b in bwt_data.iter_mut() {
                *b ^= mask.next_mask();
            }
        }

        if bwt_data.is_empty() || self.orig_ptr as usize >= bwt_data.len() {
            return Err(BzError::data("origPtr out of range"));
        }
        let rle1_bytes = bwt::inverse_bwt(&bwt_data, self.orig_ptr);
        let data = rle::rle1_decode(&rle1_bytes);

        let mut crc = Crc32::new();
        crc.update_slice(&data);
        let computed = crc.finalize();
        if computed != self.block_crc_expected {
            return Err(BzError::data("block CRC mismatch"));
        }
        self.combined_crc = crc::combine(self.combined_crc, computed);
        self.output.extend_from_slice(&data);
        Ok(())
    }

    fn handle_decoded_symbol(&mut self, sym: u16) -> Result<()> {
        if sym == self.eob {
            self.finish_block()?;
            self.reset_block_scratch();
            self.step = Step::BlockOrEosHi;
        } else {
            self.mtf_symbols.push(sym);
            self.group_pos -= 1;
        }
        Ok(())
    }

    fn advance(&mut self, cursor: &mut &[u8]) -> Result<Adv> {
        match self.step {
            Step::MagicB => {
                let Some(b) = self.bits.read_byte(cursor) else {
                    return Ok(Adv::NeedInput);
                };
                if b != BZIP2_MAGIC[0] {
                    return Err(BzError::data_magic("expected 'B'"));
                }
                self.step = Step::MagicZ;
            }
            Step::MagicZ => {
                let Some(b) = self.bits.read_byte(cursor) else {
                    return Ok(Adv::NeedInput);
                };
                if b != BZIP2_MAGIC[1] {
                    return Err(BzError::data_magic("expected 'Z'"));
                }
                self.step = Step::MagicH;
            }
            Step::MagicH => {
                let Some(b) = self.bits.read_byte(cursor) else {
                    return Ok(Adv::NeedInput);
                };
                if b == b'0' {
                    return Err(BzError::data_magic(
                        "deprecated BZ0 (Bzip1) streams are not supported",
                    ));
                }
                if b != b'h' {
                    return Err(BzError::data_magic("expected 'h' version marker"));
                }
                self.step = Step::MagicLevel;
            }
            Step::MagicLevel => {
                let Some(b) = self.bits.read_byte(cursor) else {
                    return Ok(Adv::NeedInput);
                };
                if !(b'1'..=b'9').contains(&b) {
                    return Err(BzError::data_magic("block size digit out of range"));
                }
                self.level = b - b'0';
                self.step = Step::BlockOrEosHi;
            }
            Step::BlockOrEosHi => {
                let Some(v) = self.bits.read_bits(cursor, 24) else {
                    return Ok(Adv::NeedInput);
                };
                self.magic_hi = v;
                self.step = Step::BlockOrEosLo;
            }
            Step::BlockOrEosLo => {
                let Some(v) = self.bits.read_bits(cursor, 24) else {
                    return Ok(Adv::NeedInput);
                };
                let magic = (u64::from(self.magic_hi) << 24) | u64::from(v);
                if magic == magic_to_u64(&BLOCK_MAGIC) {
                    self.step = Step::BlockCrc;
                } else if magic == magic_to_u64(&EOS_MAGIC) {
                    self.step = Step::EosCrc;
                } else {
                    return Err(BzError::data("bad block/EOS magic"));
                }
            }
            Step::EosCrc => {
                let Some(v) = self.bits.read_bits(cursor, 32) else {
                    return Ok(Adv::NeedInput);
                };
                if v != self.combined_crc {
                    return Err(BzError::data("combined CRC mismatch"));
                }
                self.finished = true;
                self.step = Step::StreamDone;
            }
            Step::StreamDone => {
                return Ok(Adv::NeedInput);
            }
            Step::BlockCrc => {
                let Some(v) = self.bits.read_bits(cursor, 32) else {
                    return Ok(Adv::NeedInput);
                };
                self.block_crc_expected = v;
                self.step = Step::Randomised;
            }
            Step::Randomised => {
                let Some(v) = self.bits.read_bit(cursor) else {
                    return Ok(Adv::NeedInput);
                };
                self.randomised = v == 1;
                self.step = Step::OrigPtr;
            }
            Step::OrigPtr => {
                let Some(v) = self.bits.read_bits(cursor, 24) else {
                    return Ok(Adv::NeedInput);
                };
                self.orig_ptr = v;
                self.step = Step::InUse16;
            }
            Step::InUse16 => {
                let Some(v) = self.bits.read_bits(cursor, 16) else {
                    return Ok(Adv::NeedInput);
                };
                self.in_use16 = v as u16;
                self.in_use_group_idx = 0;
                self.step = Step::InUseGroups;
            }
            Step::InUseGroups => {
                if self.in_use_group_idx == 16 {
                    self.n_in_use = self.in_use.iter().filter(|&&u| u).count();
                    if self.n_in_use == 0 {
                        return Err(BzError::data("in-use map selects no symbols"));
                    }
                    self.alpha_size = self.n_in_use + 2;
                    self.eob = (self.n_in_use + 1) as u16;
                    self.step = Step::NGroups;
                    return Ok(Adv::Progress);
                }
                let i = self.in_use_group_idx;
                if (self.in_use16 >> (15 - i)) & 1 == 0 {
                    self.in_use_group_idx += 1;
                    return Ok(Adv::Progress);
                }
                let Some(v) = self.bits.read_bits(cursor, 16) else {
                    return Ok(Adv::NeedInput);
                };
                for j in 0..16 {
                    if (v >> (15 - j)) & 1 == 1 {
                        self.in_use[i * 16 + j] = true;
                    }
                }
                self.in_use_group_idx += 1;
            }
            Step::NGroups => {
                let Some(v) = self.bits.read_bits(cursor, 3) else {
                    return Ok(Adv::NeedInput);
                };
                if !(2..=6).contains(&v) {
                    return Err(BzError::data("nGroups out of range"));
                }
                self.n_groups = v as usize;
                self.step = Step::NSelectors;
            }
            Step::NSelectors => {
                let Some(v) = self.bits.read_bits(cursor, 15) else {
                    return Ok(Adv::NeedInput);
                };
                if v == 0 {
                    return Err(BzError::data("nSelectors must be at least 1"));
                }
                self.n_selectors = v as usize;
                self.selector_ranks.clear();
                self.selector_unary_run = 0;
                self.step = Step::Selectors;
            }
            Step::Selectors => {
                if self.selector_ranks.len() == self.n_selectors {
                    self.selectors =
                        selector::mtf_decode_selectors(&self.selector_ranks, self.n_groups);
                    self.tables_lens = vec![Vec::with_capacity(self.alpha_size); self.n_groups];
                    self.cur_table = 0;
                    self.step = Step::TableStartLen;
                    return Ok(Adv::Progress);
                }
                let Some(bit) = self.bits.read_bit(cursor) else {
                    return Ok(Adv::NeedInput);
                };
                if bit == 1 {
                    self.selector_unary_run += 1;
                    if self.selector_unary_run >= self.n_groups {
                        return Err(BzError::data("selector unary code out of range"));
                    }
                } else {
                    self.selector_ranks.push(self.selector_unary_run as u8);
                    self.selector_unary_run = 0;
                }
            }
            Step::TableStartLen => {
                if self.cur_table == self.n_groups {
                    self.decode_tables = self
                        .tables_lens
                        .iter()
                        .map(|lens| {
                            let min_len = *lens.iter().min().unwrap() as u32;
                            let max_len = *lens.iter().max().unwrap() as u32;
                            DecodeTable::build(lens, min_len, max_len)
                        })
                        .collect();
                    self.mtf_symbols.clear();
                    self.group_no = 0;
                    self.group_pos = 0;
                    self.step = Step::SymbolFresh;
                    return Ok(Adv::Progress);
                }
                let Some(v) = self.bits.read_bits(cursor, 5) else {
                    return Ok(Adv::NeedInput);
                };
                self.cur_len = v as i32;
                if !(1..=20).contains(&self.cur_len) {
                    return Err(BzError::data("huffman start length out of range"));
                }
                self.cur_sym = 0;
                self.step = Step::TableDeltaSignal;
            }
            Step::TableDeltaSignal => {
                if self.cur_sym == self.alpha_size {
                    self.cur_table += 1;
                    self.step = Step::TableStartLen;
                    return Ok(Adv::Progress);
                }
                let Some(bit) = self.bits.read_bit(cursor) else {
                    return Ok(Adv::NeedInput);
                };
                if bit == 0 {
                    self.tables_lens[self.cur_table].push(self.cur_len as u8);
                    self.cur_sym += 1;
                } else {
                    self.step = Step::TableDeltaDirection;
                }
            }
            Step::TableDeltaDirection => {
                let Some(bit) = self.bits.read_bit(cursor) else {
                    return Ok(Adv::NeedInput);
                };
                if bit == 0 {
                    self.cur_len += 1;
                } else {
                    self.cur_len -= 1;
                }
                if !(1..=20).contains(&self.cur_len) {
                    return Err(BzError::data("huffman length delta out of range"));
                }
                self.step = Step::TableDeltaSignal;
            }
            Step::SymbolFresh => {
                if self.group_pos == 0 {
                    if self.group_no >= self.selectors.len() {
                        return Err(BzError::data("ran out of selectors mid-block"));
                    }
                    self.cur_table_idx = self.selectors[self.group_no] as usize;
                    self.group_no += 1;
                    self.group_pos = selector::GROUP_SIZE;
                }
                let min_len = self.decode_tables[self.cur_table_idx].min_len;
                let Some(v) = self.bits.read_bits(cursor, min_len) else {
                    return Ok(Adv::NeedInput);
                };
                let result = {
                    let table = &self.decode_tables[self.cur_table_idx];
                    let bits = &mut self.bits;
                    table.extend(min_len, v as i32, || bits.read_bit(cursor))
                };
                match result {
                    Ok((sym, _, _)) => {
                        self.step = Step::SymbolFresh;
                        self.handle_decoded_symbol(sym)?;
                    }
                    Err(DecodeSuspend::NeedInput { zn, zvec }) => {
                        self.zn = zn;
                        self.zvec = zvec;
                        self.step = Step::SymbolExtend;
                    }
                    Err(DecodeSuspend::Invalid) => {
                        return Err(BzError::data("invalid huffman code"));
                    }
                }
            }
            Step::SymbolExtend => {
                let (zn0, zvec0) = (self.zn, self.zvec);
                let result = {
                    let table = &self.decode_tables[self.cur_table_idx];
                    let bits = &mut self.bits;
                    table.extend(zn0, zvec0, || bits.read_bit(cursor))
                };
                match result {
                    Ok((sym, _, _)) => {
                        self.step = Step::SymbolFresh;
                        self.handle_decoded_symbol(sym)?;
                    }
                    Err(DecodeSuspend::NeedInput { zn, zvec }) => {
                        self.zn = zn;
                        self.zvec = zvec;
                        return Ok(Adv::NeedInput);
                    }
                    Err(DecodeSuspend::Invalid) => {
                        return Err(BzError::data("invalid huffman code"));
                    }
                }
            }
        }
        Ok(Adv::Progress)
    }

    /// Advance the decoder, consuming from `input` and writing decoded bytes
    /// to `output`.
    pub fn decompress_chunk(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)> {
        let mut cursor: &[u8] = input;
        let mut produced = 0usize;

        loop {
            if self.output_pos < self.output.len() {
                let available = &self.output[self.output_pos..];
                let n = available.len().min(output.len() - produced);
                output[produced..produced + n].copy_from_slice(&available[..n]);
                self.output_pos += n;
                produced += n;
                if self.output_pos == self.output.len() {
                    self.output.clear();
                    self.output_pos = 0;
                } else {
                    let consumed = input.len() - cursor.len();
                    return Ok((consumed, produced, DecompressStatus::NeedsOutput));
                }
            }

            if self.finished {
                let consumed = input.len() - cursor.len();
                return Ok((consumed, produced, DecompressStatus::Done));
            }

            if produced == output.len() {
                let consumed = input.len() - cursor.len();
                return Ok((consumed, produced, DecompressStatus::NeedsOutput));
            }

            match self.advance(&mut cursor)? {
                Adv::Progress => continue,
                Adv::NeedInput => {
                    let consumed = input.len() - cursor.len();
                    return Ok((consumed, produced, DecompressStatus::NeedsInput));
                }
            }
        }
    }

    /// True once the stream's combined CRC has been verified and all
    /// decoded bytes have been drained.
    pub fn is_finished(&self) -> bool {
        self.finished && self.output.is_empty()
    }
}

impl Decompressor for BzDecoder {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> oxiarc_core::error::Result<(usize, usize, DecompressStatus)> {
        self.decompress_chunk(input, output)
            .map_err(oxiarc_core::error::OxiArcError::from)
    }

    fn reset(&mut self) {
        *self = BzDecoder::new(self.config);
    }

    fn is_finished(&self) -> bool {
        BzDecoder::is_finished(self)
    }
}

/// Decompress a complete buffer in one call.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = BzDecoder::new(DecompressConfig::fast());
    let mut result = Vec::new();
    let mut in_pos = 0;
    let mut buf = vec![0u8; 65536];

    loop {
        let (consumed, produced, status) = decoder.decompress_chunk(&data[in_pos..], &mut buf)?;
        in_pos += consumed;
        result.extend_from_slice(&buf[..produced]);
        match status {
            DecompressStatus::Done => break,
            DecompressStatus::NeedsInput if in_pos >= data.len() && produced == 0 => {
                return Err(BzError::UnexpectedEof { expected: 1 });
            }
            _ => {}
        }
    }
    Ok(result)
}
