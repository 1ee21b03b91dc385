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

//! The plugin registry collaborator (out of scope per the core spec): look up
//! a problem-container constructor by category ("problem" or "solver") and
//! name (§4.7).

use crate::{CfnResult, PairwiseProblem};

/// Returns a freshly constructed, empty `PairwiseProblem` for a given
/// problem-class name, or the first problem class compatible with a given
/// solver-class name.
pub trait PluginRegistry: Send + Sync {
    /// Instantiates the problem class registered under `name`.
    fn problem_by_name(&self, name: &str) -> CfnResult<PairwiseProblem>;

    /// Instantiates the first problem class registered as compatible with the
    /// solver class `solver_name`.
    fn problem_for_solver(&self, solver_name: &str) -> CfnResult<PairwiseProblem>;
}
