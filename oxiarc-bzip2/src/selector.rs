//! Multi-table Huffman group selection.
//!
//! BZIP2 splits the MTF+RLE2 symbol stream into fixed groups of 50 symbols
//! and lets each group pick whichever of 2-6 Huffman tables fits it best.
//! `choose_num_groups` picks the table count from the stream length;
//! `select_groups` runs the reference encoder's iterative refinement: start
//! from an even partition of the alphabet's cumulative frequency, then for
//! four rounds assign each group to its cheapest table and rebuild every
//! table's code lengths from the symbols that chose it.

use crate::huffman::build_code_lengths;

/// Symbols per selector group.
pub const GROUP_SIZE: usize = 50;

/// Refinement passes the reference encoder runs (`BZ_N_ITERS`).
const N_ITERS: usize = 4;

/// Choose the number of Huffman tables for a block with `n_mtf` MTF+RLE2
/// symbols (excluding EOB).
pub fn choose_num_groups(n_mtf: usize) -> usize {
    match n_mtf {
        0..200 => 2,
        200..600 => 3,
        600..1200 => 4,
        1200..2400 => 5,
        _ => 6,
    }
}

/// Result of group selection: one code-length table per group, and the
/// per-group table index (`selectors[g]` is an index into `tables`).
pub struct SelectionResult {
    /// Code lengths for each table, `tables[t][sym]`.
    pub tables: Vec<Vec<u8>>,
    /// Chosen table index for each consecutive 50-symbol group.
    pub selectors: Vec<u8>,
}

/// Run iterative group selection over `symbols` (MTF+RLE2 output including
/// the trailing EOB symbol) against an alphabet of size `alpha_size`.
pub fn select_groups(symbols: &[u16], alpha_size: usize, max_len: u32) -> SelectionResult {
    let n_groups = choose_num_groups(symbols.len());
    let n_selectors = symbols.len().div_ceil(GROUP_SIZE).max(1);

    let mut tables = initial_partition(symbols, alpha_size, n_groups, max_len);
    let mut selectors = vec![0u8; n_selectors];

    for iter in 0..N_ITERS {
        let mut rfreq = vec![vec![0u32; alpha_size]; n_groups];
        let mut total_cost = vec![0i64; n_groups];

        for (g, chunk) in symbols.chunks(GROUP_SIZE).enumerate() {
            for cost in total_cost.iter_mut() {
                *cost = 0;
            }
            for &sym in chunk {
                for (t, lens) in tables.iter().enumerate() {
                    total_cost[t] += i64::from(lens[sym as usize]);
                }
            }
            let best = total_cost
                .iter()
                .enumerate()
                .min_by_key(|&(_, &c)| c)
                .map(|(t, _)| t)
                .unwrap_or(0);
            selectors[g] = best as u8;
            for &sym in chunk {
                rfreq[best][sym as usize] += 1;
            }
        }

        if iter + 1 < N_ITERS {
            for (t, freqs) in rfreq.iter().enumerate() {
                tables[t] = build_code_lengths(freqs, max_len);
            }
        }
    }

    SelectionResult { tables, selectors }
}

/// Partition the alphabet's cumulative frequency into `n_groups` roughly
/// equal shares and seed each table's starting code lengths from the
/// symbols assigned to its share (mirrors the reference encoder's initial
/// `nPart`-based partition before any refinement iteration runs).
fn initial_partition(
    symbols: &[u16],
    alpha_size: usize,
    n_groups: usize,
    max_len: u32,
) -> Vec<Vec<u8>> {
    let mut freq = vec![0u32; alpha_size];
    for &sym in symbols {
        freq[sym as usize] += 1;
    }
    let total: u64 = freq.iter().map(|&f| u64::from(f)).sum();

    let mut tables = Vec::with_capacity(n_groups);
    let mut remaining_groups = n_groups as u64;
    let mut remaining_total = total;
    let mut lo = 0usize;

    for _ in 0..n_groups {
        if remaining_groups == 0 {
            tables.push(vec![1u8; alpha_size]);
            continue;
        }
        let target = remaining_total / remaining_groups;
        let mut acc = 0u64;
        let mut hi = lo;
        while hi < alpha_size && acc < target {
            acc += u64::from(freq[hi]);
            hi += 1;
        }
        if hi == lo && hi < alpha_size {
            hi += 1;
        }
        let mut part_freq = vec![0u32; alpha_size];
        for (i, f) in part_freq.iter_mut().enumerate().take(hi).skip(lo) {
            *f = freq[i].max(1);
        }
        for f in part_freq.iter_mut().take(lo) {
            *f = 1;
        }
        for f in part_freq.iter_mut().skip(hi) {
            *f = 1;
        }
        tables.push(build_code_lengths(&part_freq, max_len));

        remaining_total = remaining_total.saturating_sub(acc);
        remaining_groups -= 1;
        lo = hi;
    }

    tables
}

/// MTF-encode a sequence of table indices (the selector stream), in place,
/// replacing each value with its move-to-front rank within `0..n_tables`.
pub fn mtf_encode_selectors(selectors: &[u8], n_tables: usize) -> Vec<u8> {
    let mut pos: Vec<u8> = (0..n_tables as u8).collect();
    let mut out = Vec::with_capacity(selectors.len());
    for &sel in selectors {
        let idx = pos.iter().position(|&p| p == sel).expect("valid table index");
        out.push(idx as u8);
        if idx > 0 {
            pos[..=idx].rotate_right(1);
        }
    }
    out
}

/// Invert [`mtf_encode_selectors`].
pub fn mtf_decode_selectors(ranks: &[u8], n_tables: usize) -> Vec<u8> {
    let mut pos: Vec<u8> = (0..n_tables as u8).collect();
    let mut out = Vec::with_capacity(ranks.len());
    for &rank in ranks {
        let idx = rank as usize;
        let sel = pos[idx];
        out.push(sel);
        if idx > 0 {
            pos[..=idx].rotate_right(1);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_count_matches_thresholds() {
        assert_eq!(choose_num_groups(0), 2);
        assert_eq!(choose_num_groups(199), 2);
        assert_eq!(choose_num_groups(200), 3);
        assert_eq!(choose_num_groups(599), 3);
        assert_eq!(choose_num_groups(600), 4);
        assert_eq!(choose_num_groups(1199), 4);
        assert_eq!(choose_num_groups(1200), 5);
        assert_eq!(choose_num_groups(2399), 5);
        assert_eq!(choose_num_groups(2400), 6);
    }

    #[test]
    fn selector_mtf_roundtrips() {
        let selectors = vec![2u8, 2, 0, 1, 1, 3, 0];
        let ranks = mtf_encode_selectors(&selectors, 4);
        let back = mtf_decode_selectors(&ranks, 4);
        assert_eq!(back, selectors);
    }

    #[test]
    fn select_groups_produces_one_selector_per_group_of_50() {
        let symbols: Vec<u16> = (0..237u32).map(|i| (i % 5) as u16).collect();
        let result = select_groups(&symbols, 7, 17);
        assert_eq!(result.selectors.len(), symbols.len().div_ceil(50));
        assert!(result.tables.len() >= 2 && result.tables.len() <= 6);
        for sel in &result.selectors {
            assert!((*sel as usize) < result.tables.len());
        }
    }

    #[test]
    fn every_table_assigns_a_length_to_every_symbol() {
        let symbols: Vec<u16> = vec![0, 1, 2, 3, 4, 0, 1, 2, 3, 4].repeat(30);
        let result = select_groups(&symbols, 7, 17);
        for table in &result.tables {
            assert_eq!(table.len(), 7);
            assert!(table.iter().all(|&l| l >= 1 && u32::from(l) <= 17));
        }
    }
}
