// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! The default `RandomProvider`: a splitmix64 generator. One instance per
//! thread/trajectory, seeded explicitly so a run can be reproduced.

use crate::RandomProvider;

pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        SplitMix64 { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }
}

impl RandomProvider for SplitMix64 {
    fn uniform_below(&mut self, bound: usize) -> usize {
        assert!(bound > 0, "uniform_below requires a positive bound");
        (self.next_u64() % bound as u64) as usize
    }

    fn uniform_unit(&mut self) -> f64 {
        // Top 53 bits give a value uniform in [0, 1) at f64 precision.
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_splitmix64 {
    use super::*;

    #[test]
    fn same_seed_reproduces_the_same_sequence() {
        let mut a = SplitMix64::new(42);
        let mut b = SplitMix64::new(42);
        for _ in 0..100 {
            assert_eq!(a.uniform_below(1000), b.uniform_below(1000));
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SplitMix64::new(1);
        let mut b = SplitMix64::new(2);
        let seq_a: Vec<usize> = (0..20).map(|_| a.uniform_below(1_000_000)).collect();
        let seq_b: Vec<usize> = (0..20).map(|_| b.uniform_below(1_000_000)).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn uniform_unit_stays_within_zero_one() {
        let mut r = SplitMix64::new(7);
        for _ in 0..10_000 {
            let x = r.uniform_unit();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn sample_without_replacement_has_no_duplicates_and_respects_bounds() {
        let mut r = SplitMix64::new(3);
        let sample = r.sample_without_replacement(10, 4);
        assert_eq!(4, sample.len());
        let mut sorted = sample.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(4, sorted.len());
        assert!(sample.iter().all(|&i| i < 10));
    }

    #[test]
    fn poisson_of_zero_rate_is_always_zero() {
        let mut r = SplitMix64::new(11);
        for _ in 0..50 {
            assert_eq!(0, r.poisson(0.0));
        }
    }
}
