//! Burrows-Wheeler block sort.
//!
//! `block_sort` computes the BWT permutation of a block treated as a set of
//! `n` cyclic rotations. Two paths are used, chosen by size and by whether
//! the faster path stays inside its work budget:
//!
//! - **Main sort**: a two-byte radix bucketing followed by a budgeted
//!   comparison sort within each bucket (comparisons already agree on the
//!   bucketing bytes, so comparison starts at offset 2). Every byte compared
//!   inside a bucket decrements a shared work budget; if the budget is
//!   exhausted the whole block sort is abandoned.
//! - **Fallback sort**: a plain, unbudgeted comparison sort over full cyclic
//!   rotations, used directly for small blocks (`< 10000` bytes) and as the
//!   deterministic path the main sort falls back to when its budget runs
//!   out. `sort_unstable_by`'s introsort-style pivoting bounds this to
//!   `O(n log n)` comparisons even on adversarial input, which is what the
//!   work budget exists to guarantee for the main sort's naive quicksort
//!   partitioning.

use std::cmp::Ordering;

/// Result of a block sort: the BWT permutation and the index of the
/// original (unrotated) string within it.
pub struct BwtResult {
    /// `ptr[i]` is the starting index of the `i`-th rotation in sorted
    /// order.
    pub ptr: Vec<u32>,
    /// The index `i` such that `ptr[i] == 0`.
    pub orig_ptr: u32,
}

/// Threshold below which the main sort is skipped entirely in favor of the
/// fallback sort (mirrors the reference implementation's small-block path).
const SMALL_BLOCK_THRESHOLD: usize = 10_000;

/// Sort the cyclic rotations of `block`, choosing the main sort or falling
/// back as its work budget demands.
pub fn block_sort(block: &[u8], work_factor: u8) -> BwtResult {
    let n = block.len();
    if n == 0 {
        return BwtResult {
            ptr: Vec::new(),
            orig_ptr: 0,
        };
    }

    let ptr = if n < SMALL_BLOCK_THRESHOLD {
        fallback_sort(block)
    } else {
        main_sort(block, work_factor).unwrap_or_else(|| fallback_sort(block))
    };

    let orig_ptr = ptr
        .iter()
        .position(|&p| p == 0)
        .expect("exactly one rotation starts at index 0") as u32;

    BwtResult { ptr, orig_ptr }
}

fn main_sort(block: &[u8], work_factor: u8) -> Option<Vec<u32>> {
    let n = block.len();
    let work_factor = work_factor.clamp(1, 100) as i64;
    let mut budget: i64 = (n as i64) * ((work_factor - 1) / 3);

    let mut buckets: Vec<Vec<u32>> = vec![Vec::new(); 65536];
    for i in 0..n {
        let b0 = block[i] as usize;
        let b1 = block[(i + 1) % n] as usize;
        buckets[(b0 << 8) | b1].push(i as u32);
    }

    let mut aborted = false;
    for bucket in &mut buckets {
        if bucket.len() > 1 {
            bucket.sort_unstable_by(|&a, &b| {
                if aborted {
                    return Ordering::Equal;
                }
                let ord = cmp_rotations_from(block, a, b, 2, &mut budget);
                if budget < 0 {
                    aborted = true;
                }
                ord
            });
            if aborted {
                break;
            }
        }
    }

    if aborted {
        return None;
    }

    let mut ptr = Vec::with_capacity(n);
    for bucket in buckets {
        ptr.extend(bucket);
    }
    Some(ptr)
}

fn fallback_sort(block: &[u8]) -> Vec<u32> {
    let n = block.len();
    let mut idx: Vec<u32> = (0..n as u32).collect();
    let mut unused_budget = i64::MAX / 2;
    idx.sort_unstable_by(|&a, &b| cmp_rotations_from(block, a, b, 0, &mut unused_budget));
    idx
}

/// Compare the cyclic rotations of `block` starting at `i` and `j`,
/// skipping the first `offset` bytes (already known equal by the caller),
/// decrementing `budget` once per byte examined. Once `budget` goes
/// negative the comparison short-circuits to `Equal`; callers must check
/// `budget` afterwards rather than trusting the ordering in that case.
fn cmp_rotations_from(block: &[u8], i: u32, j: u32, offset: usize, budget: &mut i64) -> Ordering {
    let n = block.len();
    for k in offset..n {
        *budget -= 1;
        if *budget < 0 {
            return Ordering::Equal;
        }
        let a = block[(i as usize + k) % n];
        let b = block[(j as usize + k) % n];
        if a != b {
            return a.cmp(&b);
        }
    }
    i.cmp(&j)
}

/// The BWT last column: `L[i] = block[(ptr[i] + n - 1) % n]`, the byte that
/// cyclically precedes the start of the `i`-th sorted rotation.
pub fn last_column(block: &[u8], ptr: &[u32]) -> Vec<u8> {
    let n = block.len();
    ptr.iter()
        .map(|&p| block[(p as usize + n - 1) % n])
        .collect()
}

/// Invert the BWT from its last column and `orig_ptr`, via the standard
/// cumulative-count link-chase used by the decoder's fast mode (see
/// `decode.rs`): `next[cftab[L[i]]++] = i`, then walk
/// `t = next[orig_ptr]; emit L[t]; t = next[t]` for `n` steps.
pub fn inverse_bwt(last_column: &[u8], orig_ptr: u32) -> Vec<u8> {
    let n = last_column.len();
    if n == 0 {
        return Vec::new();
    }
    let mut counts = [0u32; 256];
    for &b in last_column {
        counts[b as usize] += 1;
    }
    let mut cftab = [0u32; 257];
    for i in 0..256 {
        cftab[i + 1] = cftab[i] + counts[i];
    }
    let mut next = vec![0u32; n];
    for (i, &b) in last_column.iter().enumerate() {
        let c = b as usize;
        next[cftab[c] as usize] = i as u32;
        cftab[c] += 1;
    }
    let mut out = Vec::with_capacity(n);
    let mut t = next[orig_ptr as usize];
    for _ in 0..n {
        out.push(last_column[t as usize]);
        t = next[t as usize];
    }
    out
}
