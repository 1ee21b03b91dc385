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

//! # cfn-solve
//! `cfn-solve` is a cost-function-network optimization engine. A problem is
//! described as a set of discrete variable nodes, each with a fixed number of
//! choices, plus a pairwise-decomposable penalty model (one-body and
//! two-body terms) and, optionally, non-pairwise cost-function plug-ins.
//! Solving means finding a choice assignment that minimizes the total
//! penalty.
//!
//! ## Components
//! - [`PairwiseProblem`] is the problem store: it accumulates one- and
//!   two-body penalties keyed by absolute node id, folds away nodes that have
//!   only one possible choice at [`PairwiseProblem::finalize`], and after that
//!   exposes `absolute`/`delta` scoring over a dense `[0, n_variables)`
//!   variable-index space.
//! - [`CostFunction`] is the trait every non-pairwise penalty term
//!   implements; four ready-made ones ship in this crate (squared sum of
//!   choice penalties, tabulated integer-penalty-sum function, squared count
//!   of unsatisfied features, and weighted graph island count).
//! - [`run_greedy`] performs Jacobi-style greedy descent from one or many
//!   starting vectors.
//! - [`run_monte_carlo`] runs simulated-annealing trajectories with
//!   configurable acceptance, storage, and optional greedy refinement.
//! - [`SolutionSet`] is the bounded, deduplicated pool both solvers merge
//!   their results into.
//! - The `implementation::fileio` module reads ASCII and packed-binary
//!   problem files and writes solutions back out.
//!
//! ## Side benefit
//! As a side benefit of being built this way, both solvers exploit all of
//! your hardware to search in parallel: every trajectory or descent runs as
//! an independent unit of work on a [`ThreadPool`], and only the final
//! solution-set merge takes a lock.
//!
//! ## Quick Example
//! The following builds the tiny three-node problem used throughout this
//! crate's tests (two multi-choice nodes interacting through a two-body
//! term) and finds its minimum with the greedy solver.
//!
//! ```
//! use std::sync::Arc;
//! use cfn_solve::*;
//!
//! let mut problem = PairwiseProblem::new();
//! // Node 0 and node 2 each have 3 choices; their one-body penalties.
//! for (node, values) in [(0usize, [10.0, 20.0, 30.0]), (2, [5.0, 15.0, 25.0])] {
//!     for (choice, &value) in values.iter().enumerate() {
//!         problem.set_onebody(node, choice, value).unwrap();
//!     }
//! }
//! // A two-body interaction between them.
//! for c0 in 0..3 {
//!     for c2 in 0..3 {
//!         problem.set_twobody(0, 2, c0, c2, (c0 as f64 - c2 as f64).abs()).unwrap();
//!     }
//! }
//! problem.finalize().unwrap();
//!
//! let problem = Arc::new(problem);
//! let pool = ScopedThreadPool::new(1);
//! let config = GreedyConfig::builder().build().unwrap();
//! let starting_vectors = vec![vec![0, 0]];
//! let solutions = run_greedy(&problem, starting_vectors, &pool, &config).unwrap();
//!
//! let best = solutions.into_sorted_vec().remove(0);
//! assert_eq!(15.0, best.score);
//! ```

mod common;
mod abstraction;
mod implementation;

pub use common::*;
pub use abstraction::*;
pub use implementation::*;