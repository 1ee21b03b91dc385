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

//! Concrete implementations of every abstraction-level trait, plus the
//! pairwise problem store, solution pool, and solvers built on top of them.

mod pairwise_problem;
mod solution;
mod cost_functions;
mod greedy;
mod monte_carlo;
mod annealing_schedules;
pub mod rng_default;
pub mod thread_pool_default;
pub mod tracer_default;
pub mod registry_default;
mod fileio;

pub use pairwise_problem::*;
pub use solution::*;
pub use cost_functions::*;
pub use greedy::*;
pub use monte_carlo::*;
pub use annealing_schedules::*;
pub use rng_default::*;
pub use thread_pool_default::*;
pub use tracer_default::*;
pub use registry_default::*;
pub use fileio::*;
