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

//! This module defines the trait that every non-pairwise cost-function
//! plug-in (§4.2) must implement, plus the scratch-space handle passed
//! through one trajectory's worth of delta calls.

use std::any::Any;

use crate::Candidate;

/// Thread-local, per-trajectory scratch space a cost function may use to
/// avoid recomputation across consecutive `delta` calls (e.g. the island-size
/// buffer of `GraphIslandCount`). Boxed as `Any` so the problem store can hold
/// a heterogeneous collection of scratch spaces without generic parameters
/// leaking into `PairwiseProblem`.
pub trait Scratch: Any + Send {
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A non-pairwise cost-function plug-in attached to a `PairwiseProblem`.
///
/// Implementors receive the list of absolute variable-node indices at
/// `finalize` time and must translate any absolute-node-indexed state they
/// were configured with into variable-index-indexed state before `absolute`
/// or `delta` is ever called.
pub trait CostFunction: Send + Sync {
    /// The per-instance multiplier applied to `raw(sol)` before it is summed
    /// into the problem's total score.
    fn weight(&self) -> f64;

    /// Called exactly once, after the owning problem's own finalize pass,
    /// with the absolute node index of every variable node in variable-index
    /// order (`absolute_variable_nodes[v]` is the absolute index of variable
    /// `v`).
    fn finalize(&mut self, absolute_variable_nodes: &[usize]);

    /// `weight() * raw(sol)`, computed from scratch.
    fn absolute(&self, sol: &Candidate) -> f64;

    /// `weight() * (raw(new) - raw(old))`. A plug-in that cannot do better is
    /// allowed to return `absolute(new) - absolute(old)`.
    fn delta(&self, old: &Candidate, new: &Candidate, scratch: Option<&mut dyn Scratch>) -> f64;

    /// Optional factory for a fresh scratch space; `None` if this cost
    /// function does not use one.
    fn make_scratch(&self) -> Option<Box<dyn Scratch>> {
        None
    }
}
