// sparkscan - core/sample.rs
//
// Fixed-capacity uniform sampling over a stream of unknown length
// (reservoir sampling, Algorithm R). Single writer, no shared state.
//
// After N observations (N >= K), every observation has been retained with
// probability exactly K/N, independent of arrival order.

use crate::core::model::{SampledLine, Severity};
use crate::util::constants;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Reservoir sampler over level-bearing log lines.
///
/// The randomness source is injectable via the seed so tests (and the
/// `--seed` CLI flag) can assert exact sample membership; without a seed
/// the generator is drawn from OS entropy.
#[derive(Debug)]
pub struct ReservoirSampler {
    capacity: usize,
    seen: u64,
    entries: Vec<SampledLine>,
    rng: StdRng,
}

impl ReservoirSampler {
    pub fn new(capacity: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            capacity,
            seen: 0,
            entries: Vec::with_capacity(capacity),
            rng,
        }
    }

    /// Offers one line to the reservoir.
    ///
    /// The first K offers are appended; the i-th offer thereafter replaces
    /// a uniformly-random slot with probability K/i.
    pub fn observe(&mut self, text: &str, severity: Severity) {
        self.seen += 1;

        if self.entries.len() < self.capacity {
            self.entries.push(SampledLine {
                text: clip_line(text),
                severity,
            });
        } else if self.capacity > 0 {
            // j is uniform over [0, seen); the slot indices [0, K) together
            // have probability K/seen, and each slot is equally likely.
            let j = self.rng.gen_range(0..self.seen);
            if (j as usize) < self.capacity {
                self.entries[j as usize] = SampledLine {
                    text: clip_line(text),
                    severity,
                };
            }
        }
    }

    /// Total observations offered so far.
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// Current reservoir contents, in reservoir order (not input order).
    pub fn snapshot(&self) -> &[SampledLine] {
        &self.entries
    }

    /// Consumes the sampler, yielding the final sample.
    pub fn into_sample(self) -> Vec<SampledLine> {
        self.entries
    }
}

/// Caps a sampled line at `MAX_SAMPLED_LINE_BYTES`, respecting UTF-8
/// boundaries, so one pathological line cannot grow the reservoir
/// without bound.
fn clip_line(text: &str) -> String {
    let max = constants::MAX_SAMPLED_LINE_BYTES;
    if text.len() <= max {
        return text.to_string();
    }
    let cut = (0..=max)
        .rev()
        .find(|i| text.is_char_boundary(*i))
        .unwrap_or(0);
    let mut clipped = text[..cut].to_string();
    clipped.push_str("... [truncated]");
    clipped
}
