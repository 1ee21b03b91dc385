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

//! The random-number facility collaborator (out of scope per the core spec:
//! the core only needs this interface, a production embedder is free to
//! supply a richer generator). One per thread/trajectory; not required to be
//! shared across threads.

/// Uniform integers, Poisson sampling (for multi-mutation move sizes),
/// Bernoulli/Metropolis acceptance, and sampling without replacement.
pub trait RandomProvider {
    /// A uniform integer in `[0, bound)`. `bound` is always `> 0`.
    fn uniform_below(&mut self, bound: usize) -> usize;

    /// A uniform real in `[0, 1)`.
    fn uniform_unit(&mut self) -> f64;

    /// A Poisson-distributed sample with the given rate `lambda >= 0`.
    fn poisson(&mut self, lambda: f64) -> usize {
        // Knuth's algorithm: product of uniforms until it drops below e^-lambda.
        let l = (-lambda).exp();
        let mut k = 0usize;
        let mut p = 1.0;
        loop {
            p *= self.uniform_unit();
            if p <= l {
                return k;
            }
            k += 1;
        }
    }

    /// Accept with probability `p` (`p` is clamped to `[0, 1]`).
    fn bernoulli(&mut self, p: f64) -> bool {
        self.uniform_unit() < p.clamp(0.0, 1.0)
    }

    /// `count` distinct indices drawn uniformly without replacement from
    /// `[0, bound)`. `count <= bound` is required by callers.
    fn sample_without_replacement(&mut self, bound: usize, count: usize) -> Vec<usize> {
        // Partial Fisher-Yates: shuffle only as many positions as we need.
        let mut pool: Vec<usize> = (0..bound).collect();
        let take = count.min(bound);
        for i in 0..take {
            let j = i + self.uniform_below(bound - i);
            pool.swap(i, j);
        }
        pool.truncate(take);
        pool
    }
}
