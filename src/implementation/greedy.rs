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

//! Component D: Jacobi-style greedy descent, usable as a standalone
//! optimizer over many starting vectors or as the refinement pass the
//! Monte-Carlo solver calls on its own stored solutions (§4.4).

use std::sync::Arc;

use derive_builder::Builder;
use parking_lot::Mutex;

use crate::{Candidate, CfnError, CfnResult, PairwiseProblem, Solution, SolutionSet, ThreadPool, Variable};

#[derive(Builder, Clone, Debug)]
#[builder(pattern = "owned")]
pub struct GreedyConfig {
    /// Worker count handed to the thread pool; `0` defers to the pool's own default.
    #[builder(default = "0")]
    pub threads: usize,
    /// Size of the per-problem `SolutionSet`.
    #[builder(default = "1")]
    pub solutions_per_problem: usize,
}

impl GreedyConfig {
    pub fn builder() -> GreedyConfigBuilder {
        GreedyConfigBuilder::default()
    }
}

/// One Jacobi-style descent trajectory: repeatedly commit the single best
/// single-site change until no single-site change improves the score.
/// Terminates because `cur_score` strictly decreases on every sweep and the
/// state space is finite.
fn descend_one(problem: &PairwiseProblem, start: &Candidate) -> CfnResult<(Candidate, f64)> {
    let mut cur = start.clone();
    let mut cur_score = problem.absolute(&cur)?;
    let mut scratch = problem.make_scratch();

    loop {
        let mut best: Option<(usize, usize, f64)> = None;
        for v in 0..problem.n_variables() {
            let k = problem.n_choices_of(Variable(v));
            for c in 0..k {
                if c == cur[v] {
                    continue;
                }
                let mut trial = cur.clone();
                trial[v] = c;
                let score = cur_score + problem.delta(&cur, &trial, &mut scratch)?;
                let improves = score < cur_score;
                let better_than_best = best.map_or(true, |(_, _, bs)| score < bs);
                if improves && better_than_best {
                    best = Some((v, c, score));
                }
            }
        }
        match best {
            Some((v, c, score)) => {
                cur[v] = c;
                cur_score = score;
            }
            None => break,
        }
    }
    Ok((cur, cur_score))
}

/// Re-descends from a previously stored solution's own choices, keeping its
/// `times_seen` as the refined candidate's seen count (the multiplier
/// *replaces* rather than adds to the original count; see the project's
/// design notes on greedy refinement).
pub fn refine_one(problem: &PairwiseProblem, solution: &Solution) -> CfnResult<Solution> {
    let (choices, score) = descend_one(problem, &solution.choices)?;
    Ok(Solution {
        choices,
        score,
        times_seen: solution.times_seen,
    })
}

/// Runs one descent trajectory per starting vector, in parallel over the
/// given thread pool, merging every result into a single `SolutionSet` of
/// size `config.solutions_per_problem`.
pub fn run_greedy<P: ThreadPool>(
    problem: &Arc<PairwiseProblem>,
    starting_vectors: Vec<Candidate>,
    pool: &P,
    config: &GreedyConfig,
) -> CfnResult<SolutionSet> {
    for sv in &starting_vectors {
        if sv.len() != problem.n_variables() {
            return Err(CfnError::ShapeMismatch(format!(
                "starting vector has length {} but problem has {} variable nodes",
                sv.len(),
                problem.n_variables()
            )));
        }
    }

    let solutions = Arc::new(Mutex::new(SolutionSet::new(config.solutions_per_problem)));
    let jobs: Vec<Box<dyn FnOnce() -> CfnResult<()> + Send>> = starting_vectors
        .into_iter()
        .map(|start| {
            let problem = Arc::clone(problem);
            let solutions = Arc::clone(&solutions);
            let job: Box<dyn FnOnce() -> CfnResult<()> + Send> = Box::new(move || {
                let (choices, score) = descend_one(&problem, &start)?;
                solutions.lock().merge_one(choices, score);
                Ok(())
            });
            job
        })
        .collect();

    for result in pool.run_all(jobs) {
        result?;
    }

    Ok(Arc::try_unwrap(solutions).map(|m| m.into_inner()).unwrap_or_else(|arc| arc.lock().clone()))
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_greedy {
    use super::*;
    use crate::implementation::thread_pool_default::ScopedThreadPool;

    fn canonical_3_node() -> Arc<PairwiseProblem> {
        let mut p = PairwiseProblem::new();
        p.set_onebody(0, 0, 25.0).unwrap();
        p.set_onebody(0, 1, 32.0).unwrap();
        p.set_onebody(1, 0, 15.0).unwrap();
        p.set_onebody(1, 1, 43.0).unwrap();
        p.set_onebody(2, 0, 14.0).unwrap();
        p.set_onebody(2, 1, 5.0).unwrap();
        let tb01 = [[5.0, 3.0, 9.0], [4.0, 1.0, 2.0], [1.0, 3.0, 1.0]];
        let tb02 = [[5.0, 3.0, 9.0], [4.0, 1.0, 2.0], [1.0, 0.0, 3.0]];
        let tb12 = [[7.0, 1.0, 4.0], [6.0, 4.0, 8.0], [2.0, 0.0, 3.0]];
        for ca in 0..3 {
            for cb in 0..3 {
                p.set_twobody(0, 1, ca, cb, tb01[ca][cb]).unwrap();
                p.set_twobody(0, 2, ca, cb, tb02[ca][cb]).unwrap();
                p.set_twobody(1, 2, ca, cb, tb12[ca][cb]).unwrap();
            }
        }
        p.finalize().unwrap();
        Arc::new(p)
    }

    #[test]
    fn converges_to_the_global_optimum_from_zero() {
        let p = canonical_3_node();
        let (sol, score) = descend_one(&p, &vec![0, 0, 0]).unwrap();
        assert_eq!(vec![2, 2, 1], sol);
        assert_eq!(6.0, score);
    }

    #[test]
    fn terminates_from_every_starting_point_within_the_state_space() {
        let p = canonical_3_node();
        for a in 0..3 {
            for b in 0..3 {
                for c in 0..3 {
                    let (_, score) = descend_one(&p, &vec![a, b, c]).unwrap();
                    assert!(score <= p.absolute(&vec![a, b, c]).unwrap());
                }
            }
        }
    }

    #[test]
    fn run_greedy_merges_every_trajectory_into_one_solution_set() {
        let p = canonical_3_node();
        let pool = ScopedThreadPool::new(2);
        let config = GreedyConfig::builder().solutions_per_problem(1).build().unwrap();
        let starts = vec![vec![0, 0, 0], vec![1, 1, 1], vec![2, 2, 2]];
        let solutions = run_greedy(&p, starts, &pool, &config).unwrap();
        let kept = solutions.into_sorted_vec();
        assert_eq!(1, kept.len());
        assert_eq!(6.0, kept[0].score);
    }

    #[test]
    fn rejects_a_starting_vector_with_the_wrong_shape() {
        let p = canonical_3_node();
        let pool = ScopedThreadPool::new(1);
        let config = GreedyConfig::builder().build().unwrap();
        let err = run_greedy(&p, vec![vec![0, 0]], &pool, &config).unwrap_err();
        assert!(matches!(err, CfnError::ShapeMismatch(_)));
    }

    #[test]
    fn refine_one_keeps_the_original_times_seen() {
        let p = canonical_3_node();
        let original = Solution {
            choices: vec![0, 0, 0],
            score: p.absolute(&vec![0, 0, 0]).unwrap(),
            times_seen: 9,
        };
        let refined = refine_one(&p, &original).unwrap();
        assert_eq!(vec![2, 2, 1], refined.choices);
        assert_eq!(9, refined.times_seen);
    }
}
