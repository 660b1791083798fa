//! Deterministic random number generation for offer decisions.
//!
//! RULE: The policy engine never calls a platform RNG.
//! Every draw (discount magnitude, service pick, decision id) flows
//! through an OfferRng owned by the caller, so a fixed seed reproduces
//! a decision exactly.
//!
//! Long-running callers derive one stream per request from a master
//! seed (master_seed XOR request_index * golden ratio). This means:
//!   - Requests never share generator state.
//!   - Replaying request N only needs the master seed and N.

use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct OfferRng {
    inner: Pcg64Mcg,
}

impl OfferRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Derive the stream for one request from the master seed and a
    /// stable request index.
    pub fn for_request(master_seed: u64, request_index: u64) -> Self {
        let derived_seed = master_seed ^ (request_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self::new(derived_seed)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.gen_range(0..n)
    }

    /// Roll an integer in [lo, hi], both ends inclusive.
    pub fn range_inclusive(&mut self, lo: u32, hi: u32) -> u32 {
        assert!(lo <= hi, "empty range [{lo}, {hi}]");
        self.inner.gen_range(lo..=hi)
    }

    /// Pick `k` distinct indices from `0..n` (partial Fisher-Yates).
    /// Returns fewer than `k` when `n < k`.
    pub fn sample_indices(&mut self, n: usize, k: usize) -> Vec<usize> {
        let mut pool: Vec<usize> = (0..n).collect();
        let take = k.min(n);
        for i in 0..take {
            let j = i + self.next_u64_below((n - i) as u64) as usize;
            pool.swap(i, j);
        }
        pool.truncate(take);
        pool
    }

    /// 16 random bytes, used for decision ids.
    pub fn next_bytes_16(&mut self) -> [u8; 16] {
        let mut buf = [0u8; 16];
        self.inner.fill_bytes(&mut buf);
        buf
    }
}
